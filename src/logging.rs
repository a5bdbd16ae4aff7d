//! Logger installation for hosts that have no Rust logger of their own.

use std::sync::Once;

/// Environment variable holding the `env_logger` filter.
pub const LOG_ENV: &str = "DNI_LOG";

static INIT: Once = Once::new();

/// Install `env_logger`, filtered by `DNI_LOG` (default `warn`).
///
/// Only the first call has an effect. If the host already installed a `log`
/// backend, that one is kept.
pub fn init() {
    INIT.call_once(|| {
        let env = env_logger::Env::new().filter_or(LOG_ENV, "warn");
        if env_logger::Builder::from_env(env).try_init().is_ok() {
            log::debug!("dawn-native-interop {} logging initialized", env!("CARGO_PKG_VERSION"));
        }
    });
}

/// Route this library's diagnostics to stderr.
///
/// The level is read from `DNI_LOG` (e.g. `debug`, `dawn_native_interop=trace`).
/// Safe to call more than once.
#[unsafe(export_name = "dniInitLogging")]
pub extern "C" fn dni_init_logging() {
    init();
}
