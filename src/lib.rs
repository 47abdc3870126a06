pub mod config;
pub mod models;
pub mod pipeline;
pub mod intelligence; // Reference ranges and test descriptions
pub mod chat;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, writing to stderr so stdout
/// stays reserved for command output. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
