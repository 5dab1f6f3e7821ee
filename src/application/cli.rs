#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::BackendBox;
use crate::domain::models::ChatPrompt;
use crate::domain::models::IngestRequest;
use crate::domain::models::Message;
use crate::domain::services::wants_sources;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

/// Directory the debug log is written to when `RUST_LOG` contains `zark`.
pub fn debug_log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("ZARK_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("zark");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn backend_from(matches: &ArgMatches, subcmd_matches: &ArgMatches) -> Result<BackendBox> {
    Config::load(vec![matches, subcmd_matches]).await?;
    return BackendManager::get();
}

async fn ask(backend: BackendBox, matches: &ArgMatches) -> Result<()> {
    let query = matches
        .get_one::<String>("query")
        .map(|e| return e.trim().to_string())
        .unwrap_or_default();
    if query.is_empty() {
        bail!("You need to ask Zark something.");
    }

    let show_sources = wants_sources(&query);
    let reply = backend
        .chat(ChatPrompt {
            query,
            conversation_id: matches.get_one::<String>("conversation-id").cloned(),
            show_sources,
        })
        .await?;

    let mut sources = vec![];
    if show_sources {
        sources = reply.sources;
    }

    println!("{}", Message::bot(&reply.response, sources).display_text());
    println!(
        "\n{} {}",
        Paint::new("Conversation:").bold(),
        reply.conversation_id
    );

    return Ok(());
}

async fn ingest(backend: BackendBox, matches: &ArgMatches) -> Result<()> {
    let url = matches
        .get_one::<String>("url")
        .map(|e| return e.trim().to_string())
        .unwrap_or_default();
    if url.is_empty() {
        bail!("An URL is required to ingest.");
    }

    let receipt = backend.ingest(IngestRequest::new(&url)).await?;
    println!("{}", receipt.message);
    if let Some(total) = receipt.total_entries {
        println!("The knowledge base now holds {total} entries.");
    }

    return Ok(());
}

async fn knowledge(backend: BackendBox, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", _)) => {
            let overview = backend.knowledge().await?;
            if overview.knowledge.is_empty() {
                println!("The knowledge base is empty. Ingest a URL to get started!");
                return Ok(());
            }

            println!(
                "{}",
                Paint::new(format!(
                    "Most recent entries ({} of {} total):",
                    overview
                        .recent_count
                        .unwrap_or(overview.knowledge.len() as u64),
                    overview.total
                ))
                .bold()
            );
            for entry in overview.knowledge.iter() {
                println!("{}", entry.format());
                if !entry.summary.is_empty() {
                    println!("  {}", entry.summary);
                }
            }
        }
        Some(("clear", clear_matches)) => {
            if !clear_matches.get_flag("yes") {
                let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Delete every entry in the Zark knowledge base?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("Nothing was deleted.");
                    return Ok(());
                }
            }

            let receipt = backend.clear_knowledge().await?;
            println!("{}", receipt.message);
        }
        _ => {
            let overview = backend.knowledge().await?;
            println!("{} entries in the knowledge base.", overview.total);
        }
    }

    return Ok(());
}

fn positional_arg(name: &'static str, help: &'static str) -> Arg {
    return Arg::new(name).help(help).num_args(1).required(true);
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Asks Zark a single question and prints the answer.")
        .arg(positional_arg("query", "What to ask. Mention sources or links to get them listed."))
        .arg(
            Arg::new("conversation-id")
                .long("conversation-id")
                .help("Continue an existing conversation.")
                .num_args(1),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    let mut cmd = Command::new("debug");
    cmd = cmd.about("Debug helpers for Zark")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Zark with environment variable RUST_LOG=zark")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );

    return cmd;
}

fn subcommand_knowledge() -> Command {
    return Command::new("knowledge")
        .about("Shows how many entries the knowledge base holds.")
        .subcommand(Command::new("list").about("Lists the most recently ingested entries."))
        .subcommand(
            Command::new("clear")
                .about("Deletes every entry in the knowledge base.")
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt.")
                        .action(ArgAction::SetTrue),
                ),
        );
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:")
                || line.starts_with("HOTKEYS:")
                || line.starts_with("SOURCES:")
            {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("zark")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start a new chat session."))
        .subcommand(subcommand_ask())
        .subcommand(
            Command::new("ingest")
                .about("Crawls a URL, two levels deep, into the knowledge base.")
                .arg(positional_arg("url", "Page to ingest.")),
        )
        .subcommand(Command::new("health").about("Checks the health of the Zark API."))
        .subcommand(Command::new("status").about("Shows the operating mode of the Zark API."))
        .subcommand(subcommand_knowledge())
        .subcommand(
            Command::new("capabilities").about("Prints what the Zark API can do and how to use it."),
        )
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .short('u')
                .long(ConfigKey::ApiURL.to_string())
                .env("ZARK_API_URL")
                .num_args(1)
                .help(format!(
                    "URL of the Zark API. [default: {}]",
                    Config::default(ConfigKey::ApiURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("ZARK_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .long(ConfigKey::Username.to_string())
                .env("ZARK_USERNAME")
                .num_args(1)
                .help(format!(
                    "Your user name displayed in all chat bubbles. [default: {}]",
                    Config::default(ConfigKey::Username)
                ))
                .global(true),
        );
}

/// Runs one-shot subcommands. Returns true when the chat UI should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = debug_log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
        }
        Some(("ask", subcmd_matches)) => {
            let backend = backend_from(&matches, subcmd_matches).await?;
            ask(backend, subcmd_matches).await?;
            return Ok(false);
        }
        Some(("ingest", subcmd_matches)) => {
            let backend = backend_from(&matches, subcmd_matches).await?;
            ingest(backend, subcmd_matches).await?;
            return Ok(false);
        }
        Some(("health", subcmd_matches)) => {
            let backend = backend_from(&matches, subcmd_matches).await?;
            let report = backend.health_check().await?;
            println!("{}", report.summary());
            return Ok(false);
        }
        Some(("status", subcmd_matches)) => {
            let backend = backend_from(&matches, subcmd_matches).await?;
            let status = backend.status().await?;
            match status.message {
                Some(message) => println!("{}: {message}", status.status),
                None => println!("{}", status.status),
            }
            return Ok(false);
        }
        Some(("knowledge", subcmd_matches)) => {
            let backend = backend_from(&matches, subcmd_matches).await?;
            knowledge(backend, subcmd_matches).await?;
            return Ok(false);
        }
        Some(("capabilities", subcmd_matches)) => {
            let backend = backend_from(&matches, subcmd_matches).await?;
            let document = backend.help().await?;
            println!("{}", document.as_lines().join("\n"));
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        _ => {
            Config::load(vec![&matches]).await?;
        }
    }

    return Ok(true);
}
