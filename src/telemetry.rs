//! Logging setup

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Returns false when a subscriber
/// was already installed (tests, embedding apps).
pub fn init_tracing(default_filter: &str) -> bool {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(default_filter))
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .finish()
    .try_init()
    .is_ok()
}
