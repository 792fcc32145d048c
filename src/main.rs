#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::anyhow;
use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::BackendName;
use domain::models::Event;
use domain::services::clipboard::ClipboardService;
use infrastructure::backends::BackendManager;
use infrastructure::context::local::LocalFiles;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Chatbot has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_GIT_DESCRIBE"),
            err
        ))
    );

    if env::var("RUST_BACKTRACE").is_err() {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
        eprintln!(
            "\nDebug logs can be enabled with RUST_LOG=chatbot and are written to {}",
            cli::log_dir().join("debug.log").to_string_lossy()
        );
    } else {
        eprintln!("\n{:?}", err);
    }

    process::exit(1);
}

async fn run() -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let backend_name = Config::get(ConfigKey::Backend);
    let backend = BackendManager::get(
        BackendName::parse(&backend_name)
            .ok_or_else(|| return anyhow!("Unknown backend {backend_name}"))?,
    )?;

    let mut background_futures = task::JoinSet::new();
    let worker_tx = event_tx.clone();
    background_futures.spawn(async move {
        return ActionsService::start(
            backend,
            Box::<LocalFiles>::default(),
            worker_tx,
            &mut action_rx,
        )
        .await;
    });
    background_futures.spawn(async move {
        return ClipboardService::start().await;
    });

    let ui_future = ui::start(action_tx, event_tx, event_rx);

    return tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui_future => res,
    );
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| return "".to_string());
    let _log_guard = match cli::setup_logging(&rust_log, &cli::log_dir()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Debug logging is disabled: {err}");
            None
        }
    };

    match cli::parse().await {
        Ok(true) => (),
        Ok(false) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    }

    if let Err(err) = run().await {
        ui::destruct_terminal_for_panic();
        handle_error(err);
    }

    process::exit(0);
}
