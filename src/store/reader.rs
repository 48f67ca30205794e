use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::exec::CommandRunner;

/// Load the zone text, retrying through the elevation command when the
/// current user may not read the file.
pub async fn read_zone(config: &ZoneConfig, runner: &dyn CommandRunner) -> Result<String, ZoneError> {
    read_file(config, runner, &config.zone_file).await
}

/// Same as [`read_zone`] for any file the zone tooling manages, e.g. a backup.
pub async fn read_file(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    path: &Path,
) -> Result<String, ZoneError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ZoneError::ZoneFileNotFound),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "direct read denied, trying elevated read");
            read_elevated(config, runner, path).await
        }
        Err(e) => Err(ZoneError::io(format!("failed to read {}", path.display()), e)),
    }
}

/// `cat` the file through the elevation command. A missing file is told apart
/// from a refusal by the command's diagnostic.
pub(crate) async fn read_elevated(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    path: &Path,
) -> Result<String, ZoneError> {
    if config.elevate_command.is_empty() {
        return Err(ZoneError::PermissionDenied(format!(
            "cannot read {}",
            path.display()
        )));
    }

    let path = path.to_string_lossy();
    let out = runner.run(&config.elevated(&["cat", &*path])).await?;
    if out.success() {
        return Ok(out.stdout);
    }

    let diagnostic = out.diagnostic();
    warn!(path = %path, error = %diagnostic, "elevated read failed");
    if diagnostic.contains("No such file") {
        Err(ZoneError::ZoneFileNotFound)
    } else {
        Err(ZoneError::PermissionDenied(diagnostic))
    }
}
