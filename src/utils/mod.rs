pub mod build_info;

use std::{env, path::PathBuf, sync::Once};

use dirs::home_dir;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIR_NAME: &str = ".wallet_core";
const HOME_ENV: &str = "WALLET_CORE_HOME";

/// Initializes the global tracing subscriber with sensible defaults.
///
/// `RUST_LOG` directives are honored; `wallet_core=info` is always added.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "wallet_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // Another subscriber may already be installed by the embedding application.
        let _ = fmt().with_env_filter(filter).try_init();
    });
}

/// Returns the application data directory, defaulting to `~/.wallet_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
