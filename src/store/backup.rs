use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::{fs_error, run_elevated};
use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::exec::CommandRunner;

/// Copy the current zone file to `db.<zone>.<YYYYMMDD_HHMMSS>` in the backup
/// directory. Returns `None` when there is no zone file yet.
pub async fn snapshot(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    now: NaiveDateTime,
) -> Result<Option<PathBuf>, ZoneError> {
    match tokio::fs::metadata(&config.zone_file).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %config.zone_file.display(), "no zone file yet, skipping backup");
            return Ok(None);
        }
        // Unreadable metadata still means there is something to back up.
        _ => {}
    }

    let target = unique_path(config, now).await;

    let direct = async {
        tokio::fs::create_dir_all(&config.backup_dir)
            .await
            .map_err(|e| fs_error(format!("failed to create {}", config.backup_dir.display()), e))?;
        tokio::fs::copy(&config.zone_file, &target)
            .await
            .map_err(|e| fs_error(format!("failed to copy to {}", target.display()), e))?;
        Ok::<_, ZoneError>(())
    }
    .await;

    match direct {
        Err(ZoneError::PermissionDenied(reason)) if !config.elevate_command.is_empty() => {
            debug!(%reason, "direct backup denied, using elevated copy");
            snapshot_elevated(config, runner, &target).await?;
        }
        other => other?,
    }

    info!(backup = %target.display(), "zone backup written");
    Ok(Some(target))
}

pub(crate) async fn snapshot_elevated(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    target: &std::path::Path,
) -> Result<(), ZoneError> {
    let dir = config.backup_dir.to_string_lossy().into_owned();
    let source = config.zone_file.to_string_lossy().into_owned();
    let target = target.to_string_lossy().into_owned();

    run_elevated(config, runner, &["mkdir", "-p", dir.as_str()]).await?;
    run_elevated(config, runner, &["cp", source.as_str(), target.as_str()]).await
}

/// Backups made within the same second get a numeric suffix.
async fn unique_path(config: &ZoneConfig, now: NaiveDateTime) -> PathBuf {
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();
    let base = config.backup_path(&stamp);
    let mut candidate = base.clone();
    let mut n = 1;
    while tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        candidate = config.backup_path(&format!("{stamp}.{n}"));
        n += 1;
    }
    candidate
}
