mod action;
mod author;
mod backend;
mod context;
mod event;
mod loading;
mod message;
mod query_type;
mod slash_commands;
mod textarea;

pub use action::*;
pub use author::*;
pub use backend::*;
pub use context::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use query_type::*;
pub use slash_commands::*;
pub use textarea::*;
