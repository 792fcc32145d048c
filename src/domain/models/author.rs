#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Author {
    #[strum(serialize = "You")]
    User,
    #[strum(serialize = "Bot")]
    Bot,
    /// Local notices such as help output and connection warnings.
    #[strum(serialize = "Chatbot")]
    System,
}
