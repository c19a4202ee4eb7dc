//! Tracing initialization.
//!
//! One subscriber for the whole process, configured from `RUST_LOG` with a
//! sensible default. The binary calls [`init_tracing`] exactly once at
//! startup; tests rely on the default no-subscriber behavior.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info` for kana crates and
/// `warn` elsewhere. `json` switches the output format for log collectors.
///
/// Safe to call once; a second call is a no-op (the global default can only
/// be set once and the error is ignored).
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,kana=info,kana_store=info,kana_server=info,kana_sync=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
