use std::collections::HashMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Message;
use crate::domain::models::MessageKind;

#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

/// Rendered bubbles keyed by message id. Messages never change once
/// appended, so an entry stays valid until the width changes or the
/// transcript is cleared. Ids increase with creation time, so sorted keys are
/// render order.
pub struct BubbleList<'a> {
    cache: HashMap<i64, Vec<Line<'a>>>,
    line_width: usize,
    lines_len: usize,
}

impl<'a> Default for BubbleList<'a> {
    fn default() -> BubbleList<'a> {
        return BubbleList {
            cache: HashMap::new(),
            line_width: 0,
            lines_len: 0,
        };
    }
}

impl<'a> BubbleList<'a> {
    pub fn set_messages(&mut self, messages: &[Message], line_width: usize) {
        if self.line_width != line_width || self.cache.len() > messages.len() {
            self.cache.clear();
            self.line_width = line_width;
        }

        self.lines_len = messages
            .iter()
            .map(|message| {
                if let Some(lines) = self.cache.get(&message.id()) {
                    return lines.len();
                }

                let mut align = BubbleAlignment::Left;
                if message.kind() == MessageKind::User {
                    align = BubbleAlignment::Right;
                }

                let bubble_lines = Bubble::new(message, align, line_width).as_lines();
                let bubble_line_len = bubble_lines.len();
                self.cache.insert(message.id(), bubble_lines);

                return bubble_line_len;
            })
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        let mut ids: Vec<i64> = self.cache.keys().cloned().collect();
        ids.sort();
        let lines: Vec<Line<'a>> = ids
            .iter()
            .filter_map(|id| return self.cache.get(id))
            .flat_map(|lines| return lines.to_owned())
            .collect();

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
