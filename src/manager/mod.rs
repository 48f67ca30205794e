//! Add/remove/list orchestration over a single zone file.
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ZoneConfig;
use crate::error::{ErrorKind, ZoneError};
use crate::exec::{CommandRunner, SystemRunner};
use crate::store;
use crate::validation::{validate_hostname, validate_rrtype, validate_value};
use crate::zone::{self, RecordType, SerialOutcome};

/// What every public operation hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<String>>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            kind: None,
            records: None,
        }
    }

    pub fn with_records(records: Vec<String>) -> Self {
        Self {
            success: true,
            message: None,
            error: None,
            kind: None,
            records: Some(records),
        }
    }

    pub fn failure(err: &ZoneError) -> Self {
        Self {
            kind: Some(err.kind()),
            ..Self::failure_message(err.to_string())
        }
    }

    /// Failure that never reached the zone, e.g. a malformed request.
    pub fn failure_message(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(msg.into()),
            kind: None,
            records: None,
        }
    }
}

/// Owns the read, splice, serial, backup, write, check and reload sequence
/// for one zone file.
///
/// There is no locking in here: callers must make sure at most one `add` or
/// `remove` runs against the same zone file at a time.
pub struct ZoneManager {
    config: ZoneConfig,
    runner: Arc<dyn CommandRunner>,
    clock: Arc<dyn Clock>,
}

impl ZoneManager {
    pub fn new(config: ZoneConfig) -> Self {
        let runner = Arc::new(SystemRunner::new(config.command_timeout));
        Self::with_parts(config, runner, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: ZoneConfig,
        runner: Arc<dyn CommandRunner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            runner,
            clock,
        }
    }

    pub async fn add(&self, hostname: &str, rrtype: &str, value: &str, ttl: u32) -> OperationResult {
        let result = self.try_add(hostname, rrtype, value, ttl).await;
        report("add", result.map(OperationResult::ok))
    }

    /// Without `rrtype`, every record owned by `hostname` goes.
    pub async fn remove(&self, hostname: &str, rrtype: Option<&str>) -> OperationResult {
        let result = self.try_remove(hostname, rrtype).await;
        report("remove", result.map(OperationResult::ok))
    }

    pub async fn list(&self) -> OperationResult {
        let result = self.try_list().await;
        report("list", result.map(OperationResult::with_records))
    }

    pub async fn try_add(
        &self,
        hostname: &str,
        rrtype: &str,
        value: &str,
        ttl: u32,
    ) -> Result<String, ZoneError> {
        let record_type: RecordType = rrtype.parse()?;
        validate_hostname(hostname).map_err(|e| ZoneError::invalid(e.to_string()))?;
        validate_value(value, record_type == RecordType::Txt)
            .map_err(|e| ZoneError::invalid(e.to_string()))?;
        let line = zone::format_record(hostname, record_type, value, ttl)?;

        let current = store::read_zone(&self.config, self.runner.as_ref()).await?;

        if zone::find_existing(&current, hostname, rrtype)? {
            return Err(ZoneError::Conflict {
                hostname: hostname.to_string(),
                rrtype: rrtype.to_string(),
            });
        }

        let offset = zone::insertion_point(&current);
        debug!(hostname, rrtype, offset, "splicing record");
        let updated = zone::splice(&current, offset, &line);
        let now = self.clock.now();
        let updated = bump_serial(&updated, now.date())?;

        let backup = store::snapshot(&self.config, self.runner.as_ref(), now).await?;
        self.publish(&updated, backup).await?;
        Ok(format!("Record {hostname} {rrtype} added successfully"))
    }

    pub async fn try_remove(&self, hostname: &str, rrtype: Option<&str>) -> Result<String, ZoneError> {
        validate_hostname(hostname).map_err(|e| ZoneError::invalid(e.to_string()))?;
        if let Some(rrtype) = rrtype {
            validate_rrtype(rrtype).map_err(|e| ZoneError::invalid(e.to_string()))?;
        }
        let shown_type = rrtype.unwrap_or("");

        let current = store::read_zone(&self.config, self.runner.as_ref()).await?;

        let (updated, removed) = zone::remove_matching(&current, hostname, rrtype)?;
        if removed == 0 {
            return Err(ZoneError::RecordNotFound {
                hostname: hostname.to_string(),
                rrtype: shown_type.to_string(),
            });
        }
        debug!(hostname, rrtype = shown_type, removed, "removed record lines");

        let now = self.clock.now();
        let updated = bump_serial(&updated, now.date())?;
        let backup = store::snapshot(&self.config, self.runner.as_ref(), now).await?;

        self.publish(&updated, backup).await?;
        Ok(format!("Record {hostname} {shown_type} removed successfully"))
    }

    pub async fn try_list(&self) -> Result<Vec<String>, ZoneError> {
        let current = store::read_zone(&self.config, self.runner.as_ref()).await?;
        Ok(zone::list(&current).map(str::to_string).collect())
    }

    /// Write, check with named-checkzone, reload. The write is not undone when
    /// a later step fails unless `rollback_on_invalid` asks for it.
    async fn publish(&self, content: &str, backup: Option<PathBuf>) -> Result<(), ZoneError> {
        store::write_zone(&self.config, self.runner.as_ref(), content).await?;

        let check = self.runner.run(&self.config.checkzone_argv()).await?;
        if !check.success() {
            let reason = check.diagnostic();
            warn!(zone = %self.config.zone_name, error = %reason, "zone failed validation");
            if self.config.rollback_on_invalid {
                self.restore(backup.as_deref()).await;
            }
            return Err(ZoneError::ValidationFailed(reason));
        }

        let reload = self.runner.run(&self.config.reload_argv()).await?;
        if !reload.success() {
            return Err(ZoneError::ReloadFailed(reload.diagnostic()));
        }
        info!(zone = %self.config.zone_name, "name server reloaded");
        Ok(())
    }

    async fn restore(&self, backup: Option<&std::path::Path>) {
        let Some(backup) = backup else {
            warn!("no backup to restore from; invalid zone left in place");
            return;
        };
        let restored = async {
            let content = store::read_file(&self.config, self.runner.as_ref(), backup).await?;
            store::write_zone(&self.config, self.runner.as_ref(), &content).await
        }
        .await;
        match restored {
            Ok(()) => info!(backup = %backup.display(), "zone restored from backup"),
            Err(e) => error!(backup = %backup.display(), "failed to restore zone: {e}"),
        }
    }
}

fn bump_serial(content: &str, today: NaiveDate) -> Result<String, ZoneError> {
    let bumped = zone::bump(content, today)?;
    match &bumped.outcome {
        SerialOutcome::Bumped { from, to } => debug!(%from, %to, "serial bumped"),
        SerialOutcome::Inserted { to } => warn!(%to, "serial was malformed, wrote a fresh one"),
        SerialOutcome::MarkerMissing => warn!("no '; Serial' marker in zone, serial left as is"),
    }
    Ok(bumped.content)
}

fn report(op: &str, result: Result<OperationResult, ZoneError>) -> OperationResult {
    match result {
        Ok(ok) => {
            if let Some(message) = &ok.message {
                info!(op, "{message}");
            }
            ok
        }
        Err(e) => {
            warn!(op, kind = ?e.kind(), "{e}");
            OperationResult::failure(&e)
        }
    }
}

#[cfg(test)]
mod tests;
