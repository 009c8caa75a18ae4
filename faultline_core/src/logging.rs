//! # Logging Initialization
//!
//! Centralized, `Once`-guarded setup of the `tracing` subscriber. Verbosity
//! comes from `RUST_LOG` when set, otherwise from the level passed by the
//! caller (with `faultline_core` bumped to `debug`).
//!
//! By default logs go to a daily rolling file in the project cache directory
//! so long-running chaos experiments keep their history; pass
//! `log_to_file = false` (or lose the cache directory, e.g. in a sandbox) to
//! get stderr output with ANSI colors instead.

use anyhow::Result;
use directories::ProjectDirs;
use std::{io::stderr, sync::Once};
use tracing_subscriber::{EnvFilter, fmt::layer, prelude::*};

static INIT: Once = Once::new();

pub fn init_test_logging() {
    let _ = init_logging("trace", false);
}

/// Initializes the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init_logging(log_level: &str, log_to_file: bool) -> Result<()> {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},faultline_core=debug")));

        let file_dir = if log_to_file {
            ProjectDirs::from("io", "Faultline", "faultline")
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        } else {
            None
        };

        if let Some(log_dir) = file_dir {
            let file_appender = tracing_appender::rolling::daily(&log_dir, "faultline.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer().with_writer(non_blocking).with_ansi(false))
                .init();
            // Leaked so logs keep flushing until process exit.
            Box::leak(Box::new(guard));
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer().with_writer(stderr).with_ansi(true))
                .init();
        }
    });

    Ok(())
}
