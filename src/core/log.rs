use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` overrides the verbose flag.
///
/// Logs go to stderr so tables and exported data on stdout stay clean.
pub fn init_logging(verbose: bool) {
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "startdash=debug")
    } else {
        (LevelFilter::OFF, "off")
    };
    let app_filter = Targets::new()
        .with_target("startdash", level_filter)
        .with_default(LevelFilter::WARN);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let layer = fmt::layer()
        .pretty()
        .without_time()
        .with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(layer)
        .with(app_filter)
        .with(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging already initialized");
    }
}
