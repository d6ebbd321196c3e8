//! Tracing setup

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

/// Controls the level of the installed subscriber after startup
pub struct LogHandle {
    reload: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

impl LogHandle {
    /// Switch to `level` unless `RUST_LOG` chose the filter
    pub fn set_level(&self, level: &str) {
        if self.from_env {
            return;
        }
        if let Some(reload) = &self.reload {
            if let Err(e) = reload.reload(level_filter(level)) {
                tracing::warn!(error = %e, "Failed to change log level");
            }
        }
    }
}

/// `level` as a filter, falling back to `info` when it does not parse
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `initial_level` when set. Calling this twice is
/// harmless; the second call leaves the first subscriber in place and
/// returns a handle that changes nothing.
pub fn init(initial_level: &str) -> LogHandle {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, reload) = reload::Layer::new(env_filter.unwrap_or_else(|| level_filter(initial_level)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .is_ok();

    LogHandle {
        reload: installed.then_some(reload),
        from_env,
    }
}
