#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::domain::models::Message;
use crate::domain::models::MessageKind;

#[derive(PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    window_max_width: usize,
}

pub struct BubbleConfig {
    pub bubble_padding: usize,
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

fn repeat_from_subtractions(text: &str, subtractions: Vec<usize>) -> String {
    let count = subtractions
        .into_iter()
        .map(|e| return e as i64)
        .reduce(|a, b| {
            return a - b;
        })
        .unwrap_or(0);

    if count <= 0 {
        return "".to_string();
    }

    return [text].repeat(count as usize).join("");
}

fn char_len(text: &str) -> usize {
    return text.chars().count();
}

/// Splits words longer than the bubble into bubble-sized pieces so long URLs
/// still wrap.
fn split_long_word(word: &str, max_line_length: usize) -> Vec<String> {
    if char_len(word) <= max_line_length || max_line_length == 0 {
        return vec![word.to_string()];
    }

    let chars = word.chars().collect::<Vec<char>>();
    return chars
        .chunks(max_line_length)
        .map(|chunk| return chunk.iter().collect::<String>())
        .collect();
}

fn wrap_line(line: &str, max_line_length: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut word_set: Vec<String> = vec![];
    let mut line_char_count = 0;

    for word in line.split(' ') {
        for piece in split_long_word(word, max_line_length) {
            let piece_len = char_len(&piece);
            if !word_set.is_empty() && piece_len + line_char_count > max_line_length {
                lines.push(word_set.join(" "));
                word_set = vec![];
                line_char_count = 0;
            }

            line_char_count += piece_len + 1;
            word_set.push(piece);
        }
    }

    lines.push(word_set.join(" ").trim_end().to_string());
    return lines;
}

impl<'a> Bubble<'_> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        window_max_width: usize,
    ) -> Bubble {
        return Bubble {
            alignment,
            message,
            window_max_width,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            // Unicode character border + padding.
            bubble_padding: 8,
            // left border + left padding + (text, not counted) + right padding + right border +
            // one spare column against the window edge.
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    pub fn as_lines(&self) -> Vec<Line<'a>> {
        let max_line_length = self.get_max_line_length();
        let text = self.message.display_text();

        let lines = text
            .lines()
            .flat_map(|line| return wrap_line(line, max_line_length))
            .map(|line| return self.text_to_line(line, max_line_length))
            .collect::<Vec<Line>>();

        return self.wrap_lines_in_buddle(lines, max_line_length);
    }

    fn text_to_line(&self, text: String, max_line_length: usize) -> Line<'a> {
        let line_str_len = char_len(&text);
        let fill = repeat_from_subtractions(" ", vec![max_line_length, line_str_len]);
        let formatted_line_length =
            line_str_len + fill.len() + Bubble::style_config().bubble_padding;

        let mut wrapped_spans = vec![self.highlight_span("│ ".to_string())];
        wrapped_spans.push(self.text_span(text));
        wrapped_spans.push(self.highlight_span(format!("{fill} │")));

        let outer_bubble_padding =
            repeat_from_subtractions(" ", vec![self.window_max_width, formatted_line_length]);

        if self.alignment == BubbleAlignment::Left {
            wrapped_spans.push(Span::from(outer_bubble_padding));
            return Line::from(wrapped_spans);
        }

        let mut line_spans = vec![Span::from(outer_bubble_padding)];
        line_spans.extend(wrapped_spans);

        return Line::from(line_spans);
    }

    fn get_max_line_length(&self) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        // Border elements + minimum bubble padding.
        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;
        let available = self.window_max_width.saturating_sub(line_border_width);

        let mut max_line_length = self
            .message
            .display_text()
            .lines()
            .map(|line| {
                return char_len(line);
            })
            .max()
            .unwrap_or(0);

        if max_line_length > available {
            max_line_length = available;
        }

        let label_len = char_len(&self.message.label());
        if max_line_length < label_len {
            max_line_length = label_len;
        }

        return max_line_length;
    }

    fn wrap_lines_in_buddle(&self, lines: Vec<Line<'a>>, max_line_length: usize) -> Vec<Line<'a>> {
        // Add 2 for the vertical bars.
        let label = self.message.label();
        let top_fill = ["─"]
            .repeat(max_line_length + 2 - char_len(&label))
            .join("");
        let top_bar = format!("╭{label}{top_fill}╮");
        let bottom_bar = format!("╰{}╯", ["─"].repeat(max_line_length + 2).join(""));
        let bar_bubble_padding = repeat_from_subtractions(
            " ",
            vec![
                self.window_max_width,
                max_line_length,
                Bubble::style_config().bubble_padding,
            ],
        );

        if self.alignment == BubbleAlignment::Left {
            let mut res = vec![self.highlight_line(format!("{top_bar}{bar_bubble_padding}"))];
            res.extend(lines);
            res.push(self.highlight_line(format!("{bottom_bar}{bar_bubble_padding}")));
            return res;
        }

        let mut res = vec![self.highlight_line(format!("{bar_bubble_padding}{top_bar}"))];
        res.extend(lines);
        res.push(self.highlight_line(format!("{bar_bubble_padding}{bottom_bar}")));
        return res;
    }

    fn text_span(&self, text: String) -> Span<'a> {
        if self.message.kind() == MessageKind::Error {
            return self.highlight_span(text);
        }

        return Span::from(text);
    }

    fn highlight_span(&self, text: String) -> Span<'a> {
        match self.message.kind() {
            MessageKind::Error => {
                return Span::styled(
                    text,
                    Style {
                        fg: Some(Color::Red),
                        ..Style::default()
                    },
                );
            }
            MessageKind::Bot => {
                return Span::styled(
                    text,
                    Style {
                        fg: Some(Color::Rgb(64, 160, 255)), // Blue
                        ..Style::default()
                    },
                );
            }
            MessageKind::User => return Span::from(text),
        }
    }

    fn highlight_line(&self, text: String) -> Line<'a> {
        return Line::from(self.highlight_span(text));
    }
}
