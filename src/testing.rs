//! Shared fixtures for unit tests.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crate::config::ZoneConfig;
use crate::error::ZoneError;
use crate::exec::{CommandOutput, CommandRunner};

pub const SOA_NS_ZONE: &str = "\
$TTL 3600
@   IN  SOA ns1.internal.local. admin.internal.local. (
        2024060101 ; Serial
        3600       ; Refresh
        1800       ; Retry
        604800     ; Expire
        86400 )    ; Minimum TTL
@   IN  NS  ns1.internal.local.
";

/// Records every argv. Answers with the reply registered for the first argv
/// word that has one (so `sudo mv ...` hits a reply for `mv`), success
/// otherwise.
#[derive(Default)]
pub struct FakeRunner {
    pub calls: Mutex<Vec<Vec<String>>>,
    replies: HashMap<String, CommandOutput>,
}

impl FakeRunner {
    pub fn failing(program: &str, stderr: &str) -> Self {
        Self::default().reply(program, 1, "", stderr)
    }

    pub fn reply(mut self, program: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|argv| argv[0].clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, ZoneError> {
        self.calls.lock().unwrap().push(argv.to_vec());
        let reply = argv.iter().find_map(|word| self.replies.get(word));
        Ok(reply.cloned().unwrap_or(CommandOutput {
            code: Some(0),
            ..Default::default()
        }))
    }
}

/// Zone, backup and staging paths inside `dir`, no elevation, no chown.
pub fn config_in(dir: &TempDir) -> ZoneConfig {
    ZoneConfig {
        zone_file: dir.path().join("zones/db.internal.local"),
        backup_dir: dir.path().join("backups/dns"),
        staging_dir: dir.path().to_path_buf(),
        owner: None,
        elevate_command: Vec::new(),
        ..ZoneConfig::default()
    }
}

pub fn write_zone_file(config: &ZoneConfig, content: &str) {
    std::fs::create_dir_all(config.zone_file.parent().unwrap()).unwrap();
    std::fs::write(&config.zone_file, content).unwrap();
}

pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 30, 5)
        .unwrap()
}
