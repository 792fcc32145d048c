#[cfg(test)]
#[path = "local_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::fs;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ContextFile;
use crate::domain::models::ContextSource;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const TEXT_EXTENSIONS: [&str; 24] = [
    "c", "cfg", "cpp", "css", "csv", "go", "h", "html", "ini", "java", "js", "json", "log", "md",
    "py", "rb", "rs", "sh", "sql", "toml", "ts", "txt", "xml", "yaml",
];

fn is_supported(name: &str) -> bool {
    let extension = path::Path::new(name)
        .extension()
        .map(|e| return e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    return extension == "yml" || TEXT_EXTENSIONS.contains(&extension.as_str());
}

/// Context files from a single directory on disk. Subdirectories and hidden
/// files are not listed.
pub struct LocalFiles {
    root: path::PathBuf,
}

impl Default for LocalFiles {
    fn default() -> LocalFiles {
        return LocalFiles::new(&Config::get(ConfigKey::ContextDir));
    }
}

impl LocalFiles {
    pub fn new(root: &str) -> LocalFiles {
        return LocalFiles {
            root: path::PathBuf::from(root),
        };
    }
}

#[async_trait]
impl ContextSource for LocalFiles {
    #[allow(clippy::implicit_return)]
    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut files = vec![];

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !is_supported(&name) {
                continue;
            }

            files.push(name);
        }

        files.sort();
        return Ok(files);
    }

    #[allow(clippy::implicit_return)]
    async fn read(&self, name: &str) -> Result<ContextFile> {
        let is_plain_name = path::Path::new(name)
            .file_name()
            .map(|e| return e == name)
            .unwrap_or(false);
        if !is_plain_name || name.starts_with('.') {
            bail!(format!("{name} is not a file in the context directory"));
        }

        if !is_supported(name) {
            bail!("Unsupported file type");
        }

        let file_path = self.root.join(name);
        let metadata = fs::metadata(&file_path).await?;
        if !metadata.is_file() {
            bail!(format!("{name} is not a file in the context directory"));
        }
        if metadata.len() > MAX_FILE_SIZE {
            bail!("File too large (max 10MB)");
        }

        let bytes = fs::read(&file_path).await?;
        let content = String::from_utf8_lossy(&bytes);
        tracing::debug!(name, size = bytes.len(), "Read context file");

        return Ok(ContextFile::new(name, &content));
    }
}
