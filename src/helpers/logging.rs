use std::io;

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins; otherwise `warn`, or
/// `debug` for this crate when `verbose` is set.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,cloud_image_platforms=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (eg. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
