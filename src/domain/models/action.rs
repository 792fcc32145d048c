use super::BackendPrompt;

pub enum Action {
    BackendAbort(),
    BackendRequest(BackendPrompt),
    ContextList(),
    ContextLoad(String),
    /// Block number as shown in the chat, and the code to copy.
    CopyCodeBlock(usize, String),
}
