use std::sync::OnceLock;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_DIRECTIVES: &str = "warn,saint_engine=info";

static SUBSCRIBER: OnceLock<bool> = OnceLock::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES))
}

/// Installs the engine's fmt subscriber once per process and reports whether
/// it is the one receiving events. A host that set its own global subscriber
/// first keeps it, and this returns `false`.
pub fn init_app() -> bool {
    *SUBSCRIBER.get_or_init(|| {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_target(true)
            .try_init();
        match installed {
            Ok(()) => {
                info!(directives = DEFAULT_LOG_DIRECTIVES, "engine subscriber installed");
                true
            }
            Err(e) => {
                debug!("keeping host subscriber: {}", e);
                false
            }
        }
    })
}
