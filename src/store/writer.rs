use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tracing::{debug, info, warn};

use super::{fs_error, run_elevated};
use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::exec::CommandRunner;

/// Replace the zone file with `content`.
///
/// The content is staged first, then copied next to the zone file and renamed
/// over it, so readers see either the old or the new file. Falls back to the
/// elevation command when the zone directory is not writable.
pub async fn write_zone(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    content: &str,
) -> Result<(), ZoneError> {
    let staged = config.staging_path();
    if let Err(e) = tokio::fs::write(&staged, content).await {
        let _ = tokio::fs::remove_file(&staged).await;
        return Err(ZoneError::io(format!("failed to stage {}", staged.display()), e));
    }

    let result = commit(config, runner, &staged).await;

    if let Err(e) = tokio::fs::remove_file(&staged).await {
        warn!(path = %staged.display(), "failed to remove staging file: {e}");
    }
    if result.is_ok() {
        info!(path = %config.zone_file.display(), bytes = content.len(), "zone file committed");
    }
    result
}

async fn commit(config: &ZoneConfig, runner: &dyn CommandRunner, staged: &Path) -> Result<(), ZoneError> {
    match commit_direct(config, runner, staged).await {
        Err(ZoneError::PermissionDenied(reason)) if !config.elevate_command.is_empty() => {
            debug!(%reason, "direct commit denied, using elevated commit");
            commit_elevated(config, runner, staged).await
        }
        other => other,
    }
}

async fn commit_direct(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    staged: &Path,
) -> Result<(), ZoneError> {
    let sibling = config.commit_path();
    let result = async {
        tokio::fs::copy(staged, &sibling)
            .await
            .map_err(|e| fs_error(format!("failed to copy into {}", sibling.display()), e))?;
        tokio::fs::set_permissions(&sibling, std::fs::Permissions::from_mode(config.mode))
            .await
            .map_err(|e| fs_error(format!("failed to chmod {}", sibling.display()), e))?;

        if let Some(owner) = &config.owner {
            let path = sibling.to_string_lossy();
            let out = runner
                .run(&["chown".to_string(), owner.clone(), path.into_owned()])
                .await?;
            if !out.success() {
                return Err(ZoneError::PermissionDenied(out.diagnostic()));
            }
        }

        tokio::fs::rename(&sibling, &config.zone_file).await.map_err(|e| {
            fs_error(
                format!("failed to move into {}", config.zone_file.display()),
                e,
            )
        })
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(&sibling).await;
    }
    result
}

async fn commit_elevated(
    config: &ZoneConfig,
    runner: &dyn CommandRunner,
    staged: &Path,
) -> Result<(), ZoneError> {
    let staged = staged.to_string_lossy().into_owned();
    let sibling = config.commit_path().to_string_lossy().into_owned();
    let target = config.zone_file.to_string_lossy().into_owned();
    let mode = format!("{:o}", config.mode);

    let mut install = vec!["install", "-m", mode.as_str()];
    if let Some((user, group)) = config.owner_parts() {
        install.extend(["-o", user, "-g", group]);
    }
    install.extend([staged.as_str(), sibling.as_str()]);
    let rename = ["mv", "-f", sibling.as_str(), target.as_str()];

    run_elevated(config, runner, &install).await?;
    if let Err(e) = run_elevated(config, runner, &rename).await {
        // install already placed the sibling as root
        if let Err(cleanup) = run_elevated(config, runner, &["rm", "-f", sibling.as_str()]).await {
            warn!(path = %sibling, "failed to remove commit file: {cleanup}");
        }
        return Err(e);
    }
    Ok(())
}
