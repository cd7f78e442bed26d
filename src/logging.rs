use std::sync::Once;

use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::formatter::TickFormatter;

static SUBSCRIBER_INIT: Once = Once::new();

/// Installs the global subscriber. Safe to call more than once; only the first call does anything.
///
/// `RUST_LOG` overrides the default filter of `warn` everywhere and `info` for this crate.
pub fn setup_logging() {
    SUBSCRIBER_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{name}=info", name = env!("CARGO_CRATE_NAME"))));

        let result = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().event_format(TickFormatter))
            .with(ErrorLayer::default())
            .try_init();

        if let Err(e) = result {
            eprintln!("Logging already initialized elsewhere: {e}");
        }
    });
}
