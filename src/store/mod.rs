//! Zone file persistence: reading, atomic commit, and backups.
pub mod backup;
pub mod reader;
pub mod writer;

pub use backup::snapshot;
pub use reader::{read_file, read_zone};
pub use writer::write_zone;

use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::exec::CommandRunner;

/// Permission problems become `PermissionDenied` so callers can retry
/// through the elevation command.
pub(crate) fn fs_error(context: String, e: std::io::Error) -> ZoneError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        ZoneError::PermissionDenied(format!("{context}: {e}"))
    } else {
        ZoneError::io(context, e)
    }
}

/// Run `argv` behind the elevation command; a non-zero exit is an I/O failure.
pub(crate) async fn run_elevated(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    argv: &[&str],
) -> Result<(), ZoneError> {
    let out = runner.run(&config.elevated(argv)).await?;
    if !out.success() {
        return Err(ZoneError::io(
            format!("`{}` failed", argv.join(" ")),
            std::io::Error::other(out.diagnostic()),
        ));
    }
    Ok(())
}
