#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing_appender::non_blocking::WorkerGuard;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::services::actions::help_text;
use crate::domain::services::Syntaxes;
use crate::domain::services::Themes;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("CHATBOT_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("chatbot");
}

/// Debug logs are only written when `RUST_LOG` mentions chatbot. Nothing is
/// created on disk otherwise.
pub fn setup_logging(rust_log: &str, dir: &path::Path) -> Result<Option<WorkerGuard>> {
    if !rust_log.contains("chatbot") {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("debug.log"))?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(writer)
        .try_init()
        .map_err(|err| return anyhow!(err))?;

    return Ok(Some(guard));
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
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
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
    return Command::new("debug")
        .about("Debug helpers for Chatbot")
        .hide(true)
        .subcommand(
            Command::new("syntaxes").about("List all supported code highlighting languages.")
        )
        .subcommand(
            Command::new("resolve-syntax")
                .about("Resolves a code fence language to a given highlighting syntax")
                .arg(
                    clap::Arg::new("entry")
                        .short('s')
                        .long("entry")
                        .help("Entry to resolve")
                        .required(true),
                )
        )
        .subcommand(
            Command::new("themes").about("List all supported code highlighting themes.")
        )
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Chatbot with environment variable RUST_LOG=chatbot")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Start a new chat. This is the default when no command is given.");
}

fn arg_config(key: ConfigKey, help: String) -> Arg {
    let env_name = format!("CHATBOT_{}", key.to_string().replace('-', "_").to_uppercase());
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env_name)
        .num_args(1)
        .help(help)
        .global(true);
}

fn with_default(help: &str, key: ConfigKey) -> String {
    return format!("{help} [default: {}]", Config::default(key));
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
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
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("chatbot")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            arg_config(
                ConfigKey::Backend,
                with_default("The chat backend to connect to.", ConfigKey::Backend),
            )
            .short('b')
            .value_parser(PossibleValuesParser::new(BackendName::VARIANTS)),
        )
        .arg(arg_config(
            ConfigKey::BackendHealthCheckTimeout,
            with_default(
                "Time to wait in milliseconds before timing out when doing a healthcheck for a backend.",
                ConfigKey::BackendHealthCheckTimeout,
            ),
        ))
        .arg(arg_config(
            ConfigKey::BackendTimeout,
            with_default(
                "Time to wait in milliseconds for a reply before giving up on it.",
                ConfigKey::BackendTimeout,
            ),
        ))
        .arg(arg_config(
            ConfigKey::BackendURL,
            with_default("Chat service API URL when using the http backend.", ConfigKey::BackendURL),
        ))
        .arg(
            arg_config(
                ConfigKey::ConfigFile,
                with_default("Path to configuration file", ConfigKey::ConfigFile),
            )
            .short('c'),
        )
        .arg(arg_config(
            ConfigKey::ContextDir,
            with_default(
                "Directory listed by the Context Provider panel.",
                ConfigKey::ContextDir,
            ),
        ))
        .arg(arg_config(
            ConfigKey::MockDelay,
            with_default(
                "Time in milliseconds the mock backend waits before replying.",
                ConfigKey::MockDelay,
            ),
        ))
        .arg(
            arg_config(
                ConfigKey::QueryType,
                with_default(
                    "The initial query type sent with each message. Presets are qa, technical, code and report, any other value is passed through.",
                    ConfigKey::QueryType,
                ),
            )
            .short('q'),
        )
        .arg(
            arg_config(
                ConfigKey::Theme,
                with_default("Sets code syntax highlighting theme.", ConfigKey::Theme),
            )
            .short('t')
            .value_parser(PossibleValuesParser::new(Themes::list())),
        )
        .arg(arg_config(
            ConfigKey::ThemeFile,
            "Absolute path to a TextMate tmTheme to use for code syntax highlighting.".to_string(),
        ))
        .arg(arg_config(
            ConfigKey::UserID,
            "User ID sent with every message. Defaults to your system user name.".to_string(),
        ));
}

/// Returns false when the command ran to completion and the chat shouldn't
/// start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("syntaxes", _)) => {
                    println!("{}", Syntaxes::list().join("\n"));
                }
                Some(("resolve-syntax", rs_matches)) => {
                    if let Some(entry) = rs_matches.get_one::<String>("entry") {
                        println!("{}", Syntaxes::get(entry).name);
                    }
                }
                Some(("themes", _)) => {
                    println!("{}", Themes::list().join("\n"));
                }
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
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
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
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
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
