use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so menus on stdout stay
/// readable; an unparsable directive falls back to `warn`.
pub fn init(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|err| {
        eprintln!("ignoring log level '{}': {}", directive, err);
        EnvFilter::new("warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
