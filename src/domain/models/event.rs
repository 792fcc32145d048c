use tui_textarea::Input;

use super::BackendResponse;
use super::ContextFile;
use super::Message;

pub enum Event {
    /// A request failed. Carries the request id and the error to show.
    BackendFailed(u64, Message),
    BackendPromptResponse(BackendResponse),
    BackendTimeout(),
    CodeBlockCopied(usize, Result<(), String>),
    ContextFailed(String),
    ContextFileLoaded(ContextFile),
    ContextFilesListed(Vec<String>),
    CopyLabelExpired(usize),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLO(),
    KeyboardCTRLT(),
    KeyboardCTRLY(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardPaste(String),
    UIResize(),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
