use tracing_subscriber::fmt::time::uptime;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Output is the
/// compact formatter with time since startup, so requests can be followed
/// across actors:
///
/// ```bash
/// RUST_LOG=debug cargo run                              # everything
/// RUST_LOG=storefront::clients=debug,info cargo run     # client calls only
/// ```
///
/// Calling it again is a no-op, which keeps tests free to call it.
pub fn setup_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(uptime())
        .compact()
        .try_init();
}
