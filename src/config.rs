use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the zone components need to know about where the zone lives
/// and how the name server around it is driven.
#[derive(Clone, Debug)]
pub struct ZoneConfig {
    pub zone_name: String, // "internal.local"
    pub zone_file: PathBuf,
    pub backup_dir: PathBuf,
    /// Directory holding the staged copy before it is committed.
    pub staging_dir: PathBuf,
    /// `user:group` applied to the committed zone file, if any.
    pub owner: Option<String>,
    pub mode: u32,
    /// Prefix used when direct filesystem access is denied, e.g. `["sudo"]`.
    pub elevate_command: Vec<String>,
    pub checkzone_command: String,
    pub reload_command: Vec<String>,
    pub command_timeout: Duration,
    /// Restore the pre-write backup when `named-checkzone` rejects the new zone.
    pub rollback_on_invalid: bool,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            zone_name: "internal.local".into(),
            zone_file: PathBuf::from("/etc/bind/zones/db.internal.local"),
            backup_dir: PathBuf::from("/var/backups/dns"),
            staging_dir: std::env::temp_dir(),
            owner: Some("bind:bind".into()),
            mode: 0o644,
            elevate_command: vec!["sudo".into()],
            checkzone_command: "named-checkzone".into(),
            reload_command: vec!["systemctl".into(), "reload".into(), "bind9".into()],
            command_timeout: Duration::from_secs(10),
            rollback_on_invalid: false,
        }
    }
}

impl ZoneConfig {
    /// File name of the zone, used for staging and backup names.
    pub fn zone_file_name(&self) -> String {
        self.zone_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("db.{}", self.zone_name))
    }

    /// Temporary file the new zone is written to before commit.
    pub fn staging_path(&self) -> PathBuf {
        self.staging_dir
            .join(format!("{}.{}.tmp", self.zone_file_name(), std::process::id()))
    }

    /// Hidden sibling of the zone file, renamed over it to commit atomically.
    pub fn commit_path(&self) -> PathBuf {
        let dir = self.zone_file.parent().unwrap_or(Path::new("."));
        dir.join(format!(".{}.new", self.zone_file_name()))
    }

    /// Backup file name for a given `YYYYMMDD_HHMMSS` stamp.
    pub fn backup_path(&self, stamp: &str) -> PathBuf {
        self.backup_dir.join(format!("db.{}.{}", self.zone_name, stamp))
    }

    /// Prefix `argv` with the elevation command.
    pub fn elevated(&self, argv: &[&str]) -> Vec<String> {
        self.elevate_command
            .iter()
            .cloned()
            .chain(argv.iter().map(|s| s.to_string()))
            .collect()
    }

    pub fn checkzone_argv(&self) -> Vec<String> {
        let file = self.zone_file.to_string_lossy();
        self.elevated(&[self.checkzone_command.as_str(), self.zone_name.as_str(), &*file])
    }

    pub fn reload_argv(&self) -> Vec<String> {
        let reload: Vec<&str> = self.reload_command.iter().map(String::as_str).collect();
        self.elevated(&reload)
    }

    /// Split `owner` into `(user, group)`; a bare user is its own group.
    pub fn owner_parts(&self) -> Option<(&str, &str)> {
        let owner = self.owner.as_deref()?;
        Some(owner.split_once(':').unwrap_or((owner, owner)))
    }
}
