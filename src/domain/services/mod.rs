pub mod actions;
mod app_state;
mod bubble;
mod bubble_list;
pub mod clipboard;
mod code_blocks;
mod context_panel;
pub mod events;
mod markup;
mod scroll;
mod syntaxes;
mod themes;
mod timer;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use code_blocks::*;
pub use context_panel::*;
pub use markup::*;
pub use scroll::*;
pub use syntaxes::*;
pub use themes::*;
pub use timer::*;
