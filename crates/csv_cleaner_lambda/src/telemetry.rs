use tracing_subscriber::EnvFilter;

/// Installs JSON-formatted logging for the Lambda runtime. `RUST_LOG`
/// overrides the default `info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_current_span(false)
        .init();
}
