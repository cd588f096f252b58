//! `newswatch`: polls a news page and posts new articles to a Telegram chat.
//!
//! Exit codes: 0 after an interrupt, 1 when the chat cannot be reached at
//! startup or the watcher cannot be set up.

mod config;
mod logging;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use newswatch_core::ExitStatus;
use newswatch_engine::WatchEngine;
use newswatch_logging::{watch_error, watch_info, watch_warn};
use tokio_util::sync::CancellationToken;

use crate::config::{WatchConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

fn main() -> ExitCode {
    let config_path = env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = config::load(&config_path, |key| env::var(key).ok());

    let level = loaded.config.log.level_filter().unwrap_or(log::LevelFilter::Info);
    logging::initialize(level, loaded.config.log.file.as_deref());
    for warning in &loaded.warnings {
        watch_warn!("{}", warning);
    }

    match run(loaded.config) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            watch_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: WatchConfig) -> anyhow::Result<ExitStatus> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let engine = WatchEngine::from_settings(config.watch_settings())
            .context("failed to set up watcher")?;

        let cancel = CancellationToken::new();
        tokio::spawn(listen_for_interrupt(cancel.clone()));

        watch_info!(
            "Watching {} every {}s",
            config.source.url,
            config.schedule.poll_interval_secs
        );
        Ok(engine.run(cancel).await)
    })
}

/// Cancels `cancel` on Ctrl-C; the engine stops at its next wait.
async fn listen_for_interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            watch_info!("Interrupt received; finishing current cycle");
            cancel.cancel();
        }
        Err(err) => watch_warn!("Could not listen for interrupts: {}", err),
    }
}
