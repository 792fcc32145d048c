#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;
use crate::domain::models::QueryType;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Backend,
    BackendHealthCheckTimeout,
    BackendTimeout,
    #[strum(serialize = "backend-url")]
    BackendURL,
    ConfigFile,
    ContextDir,
    MockDelay,
    QueryType,
    Theme,
    ThemeFile,
    #[strum(serialize = "user-id")]
    UserID,
}

impl ConfigKey {
    /// Keys holding a duration in milliseconds.
    pub fn is_millis(&self) -> bool {
        return matches!(
            self,
            ConfigKey::BackendHealthCheckTimeout | ConfigKey::BackendTimeout | ConfigKey::MockDelay
        );
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    /// Reads a millisecond value, falling back to the default when the stored
    /// value isn't a number.
    pub fn get_millis(key: ConfigKey) -> u64 {
        if let Ok(val) = Config::get(key).parse::<u64>() {
            return val;
        }

        tracing::warn!(key = %key, "Invalid millisecond value, using default");
        return Config::default(key).parse::<u64>().unwrap_or_default();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        if key == ConfigKey::UserID {
            let mut user = env::var("USER").unwrap_or_else(|_| return "".to_string());
            if user.is_empty() {
                user = "local-user".to_string();
            }

            return user;
        }

        let default_backend = BackendName::Http.to_string();
        let default_query_type = QueryType::default().to_string();
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("chatbot/config.toml")
            .to_string_lossy()
            .to_string();

        let res = match key {
            ConfigKey::Backend => &default_backend,
            ConfigKey::BackendHealthCheckTimeout => "1000",
            ConfigKey::BackendTimeout => "30000",
            ConfigKey::BackendURL => "http://localhost:8000",
            ConfigKey::ContextDir => ".",
            ConfigKey::MockDelay => "1500",
            ConfigKey::QueryType => &default_query_type,
            ConfigKey::Theme => "base16-ocean.dark",
            ConfigKey::ThemeFile => "",

            // Special
            ConfigKey::ConfigFile => &config_path,
            ConfigKey::UserID => "",
        };

        return res.to_string();
    }

    fn load_file(cmd: &Command, toml_str: &str) -> Result<()> {
        let doc = toml_str.parse::<toml_edit::Document>()?;

        for key in ConfigKey::iter() {
            let Some(val) = doc.get(&key.to_string()) else {
                continue;
            };

            // Use clap value parsers to do validation.
            let possible_values = cmd
                .get_arguments()
                .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                .map(|arg| {
                    return arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<String>>();
                })
                .unwrap_or_default();

            if let Some(val_int) = val.as_integer() {
                if key.is_millis() && val_int < 0 {
                    bail!(format!(
                        "config.toml has an invalid value for key '{key}': {val_int}\nValue must be a positive number of milliseconds."
                    ));
                }
                Config::set(key, &val_int.to_string());
            } else if let Some(val_str) = val.as_str() {
                if val_str.is_empty() {
                    continue;
                }
                if !possible_values.is_empty() && !possible_values.contains(&val_str.to_string())
                {
                    bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                }
                if key.is_millis() && val_str.parse::<u64>().is_err() {
                    bail!(format!(
                        "config.toml has an invalid value for key '{key}': {val_str}\nValue must be a positive number of milliseconds."
                    ));
                }
                Config::set(key, val_str);
            }
        }

        return Ok(());
    }

    /// Defaults, then the config file, then flags and environment variables.
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            Config::load_file(&cmd, &toml_str)?;
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        for key in ConfigKey::iter().filter(|e| return e.is_millis()) {
            if Config::get(key).parse::<u64>().is_err() {
                bail!(format!(
                    "Invalid value for '{key}': {}\nValue must be a positive number of milliseconds.",
                    Config::get(key)
                ));
            }
        }

        tracing::debug!(
            user_id = %Config::get(ConfigKey::UserID),
            backend = %Config::get(ConfigKey::Backend),
            backend_url = %Config::get(ConfigKey::BackendURL),
            context_dir = %Config::get(ConfigKey::ContextDir),
            query_type = %Config::get(ConfigKey::QueryType),
            theme = %Config::get(ConfigKey::Theme),
            theme_file = %Config::get(ConfigKey::ThemeFile),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::UserID {
                    return Some(
                        "# User ID sent with every message. Defaults to your system user name.\n# user-id = \"\""
                            .to_string(),
                    );
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|e| return e.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let possible_values = arg
                    .get_possible_values()
                    .iter()
                    .map(|e| return e.get_name().to_string())
                    .collect::<Vec<String>>();
                // Long lists such as themes are better found through `debug themes`.
                if !possible_values.is_empty() && possible_values.len() <= 10 {
                    description = format!(
                        "{description} [possible values: {}]",
                        possible_values.join(", ")
                    );
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
