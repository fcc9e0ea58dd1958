use env_logger::{Builder, Env};
use log::SetLoggerError;

/// Initialize logging to stderr so stdout stays a clean data stream.
///
/// `RUST_LOG` wins over the verbosity flag when set.
pub fn init_logging(verbose: u8) -> Result<(), SetLoggerError> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(verbose >= 2)
        .try_init()?;

    log::debug!("logging initialized at level {}", default_level);
    Ok(())
}
