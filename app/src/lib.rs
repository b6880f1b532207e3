//! Keygate server library

use keygate_api::AppState;
use keygate_core::AppConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the JSON config file
pub const CONFIG_ENV: &str = "KEYGATE_CONFIG";

/// Default log directives: debug for every workspace crate, info elsewhere
pub const LOG_DIRECTIVES: &[&str] = &[
    "keygate=debug",
    "checkout=debug",
    "event_page=debug",
    "info",
];

/// `RUST_LOG` filter extended with [`LOG_DIRECTIVES`]
pub fn env_filter() -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Load the config named by `KEYGATE_CONFIG`, or the defaults when unset
pub fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) if !path.is_empty() => {
            tracing::info!("Loading config from {}", path);
            Ok(AppConfig::load(&path)?)
        }
        _ => Ok(AppConfig::default()),
    }
}

/// Run the API server until it stops or ctrl-c is received
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(env_filter()?).init();

    tracing::info!("Starting Keygate");

    let config = load_config()?;
    tracing::info!(
        "Network {} on port {}",
        config.network.network.as_str(),
        config.api_port
    );
    let state = AppState::with_config(config);

    tokio::select! {
        result = keygate_api::start_server(state) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }
    Ok(())
}
