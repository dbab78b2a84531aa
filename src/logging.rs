use flexi_logger::{
    detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};
use log::debug;
use once_cell::sync::OnceCell;

use crate::config::LoggingConfig;
use crate::error::{Result, ShopError};

// The handle must outlive every log call, so it lives for the whole process
static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

const LOG_BASENAME: &str = "shopfront";
const ROTATE_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;

/// Start the process logger. `RUST_LOG`, when set, overrides the configured levels.
///
/// Calling this more than once is a no-op.
pub fn init(logging: &LoggingConfig) -> Result<()> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let logger = Logger::try_with_env_or_str(logging.log_spec())
        .map_err(|e| ShopError::Config(format!("Invalid log specification: {}", e)))?;

    let logger = match &logging.log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename(LOG_BASENAME))
            .rotate(
                Criterion::Size(ROTATE_BYTES),
                Naming::Timestamps,
                Cleanup::KeepLogFiles(KEEP_LOG_FILES),
            )
            .duplicate_to_stderr(Duplicate::Warn),
        None => logger.log_to_stderr(),
    };

    let handle = logger
        .format(detailed_format)
        .start()
        .map_err(|e| ShopError::Config(format!("Failed to start logger: {}", e)))?;

    // A concurrent init may have won the race; its handle is just as good
    let _ = LOGGER.set(handle);

    debug!("Logging initialized with spec '{}'", logging.log_spec());

    Ok(())
}
