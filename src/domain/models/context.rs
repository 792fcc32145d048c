use anyhow::Result;
use async_trait::async_trait;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextFile {
    pub name: String,
    pub content: String,
}

impl ContextFile {
    pub fn new(name: &str, content: &str) -> ContextFile {
        return ContextFile {
            name: name.to_string(),
            content: content.to_string(),
        };
    }

    /// Preview shown in the Context Provider panel, the file name followed by
    /// its content.
    pub fn preview(&self) -> String {
        return format!("{}:\n{}", self.name, self.content);
    }
}

#[async_trait]
pub trait ContextSource {
    /// File names available to attach, sorted.
    async fn list(&self) -> Result<Vec<String>>;

    async fn read(&self, name: &str) -> Result<ContextFile>;
}

pub type ContextSourceBox = Box<dyn ContextSource + Send + Sync>;
