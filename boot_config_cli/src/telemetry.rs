//! Diagnostic logging for the front end.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set. Otherwise only warnings and errors are shown,
/// unless `verbose` raises the composition crates to `debug`. Installing
/// twice is a no-op.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "info,boot_config=debug,boot_config_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
