mod action;
mod api_error;
mod backend;
mod event;
mod help;
mod knowledge;
mod message;
mod notice;
mod slash_commands;
mod textarea;

pub use action::*;
pub use api_error::*;
pub use backend::*;
pub use event::*;
pub use help::*;
pub use knowledge::*;
pub use message::*;
pub use notice::*;
pub use slash_commands::*;
pub use textarea::*;
