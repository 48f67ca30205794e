use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use super::*;
use crate::clock::FixedClock;
use crate::exec::SystemRunner;
use crate::testing::{FakeRunner, config_in, write_zone_file};

const ZONE: &str = "\
$TTL 3600
$ORIGIN internal.local.
; internal zone
@   IN  SOA ns1.internal.local. admin.internal.local. (
        2024060101 ; Serial
        3600       ; Refresh
        1800       ; Retry
        604800     ; Expire
        86400 )    ; Minimum TTL
@   IN  NS  ns1.internal.local.
ns1                            3600    IN    A      192.0.2.1
";

struct Fixture {
    _dir: TempDir,
    config: ZoneConfig,
    runner: Arc<FakeRunner>,
    manager: ZoneManager,
}

impl Fixture {
    fn new(zone: &str) -> Self {
        Self::with(zone, FakeRunner::default(), day(2024, 6, 1), false)
    }

    fn with(zone: &str, runner: FakeRunner, now: NaiveDateTime, rollback: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let config = ZoneConfig {
            rollback_on_invalid: rollback,
            ..config_in(&dir)
        };
        write_zone_file(&config, zone);

        let runner = Arc::new(runner);
        let manager =
            ZoneManager::with_parts(config.clone(), runner.clone(), Arc::new(FixedClock(now)));
        Self {
            _dir: dir,
            config,
            runner,
            manager,
        }
    }

    fn zone(&self) -> String {
        std::fs::read_to_string(&self.config.zone_file).unwrap()
    }

    fn backups(&self) -> usize {
        std::fs::read_dir(&self.config.backup_dir)
            .map(|d| d.count())
            .unwrap_or(0)
    }

    async fn records(&self) -> Vec<String> {
        let result = self.manager.list().await;
        assert!(result.success, "{result:?}");
        result.records.unwrap()
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

#[tokio::test]
async fn add_to_fresh_zone_then_reject_duplicate() {
    let fx = Fixture::new(ZONE);

    let added = fx.manager.add("web", "A", "192.0.2.10", 3600).await;
    assert!(added.success, "{added:?}");
    assert_eq!(added.message.as_deref(), Some("Record web A added successfully"));

    let web: Vec<String> = fx
        .records()
        .await
        .into_iter()
        .filter(|r| r.starts_with("web "))
        .collect();
    assert_eq!(web.len(), 1);
    assert!(web[0].ends_with("IN    A      192.0.2.10"));

    let after_first = fx.zone();
    let again = fx.manager.add("web", "A", "192.0.2.11", 3600).await;
    assert!(!again.success);
    assert_eq!(again.kind, Some(ErrorKind::Conflict));
    assert_eq!(again.error.as_deref(), Some("Record web A already exists"));
    assert_eq!(fx.zone(), after_first);
}

#[tokio::test]
async fn add_list_remove_round_trip() {
    let fx = Fixture::new(ZONE);

    assert!(fx.manager.add("app", "A", "10.0.0.5", 300).await.success);
    let records = fx.records().await;
    assert!(records.iter().any(|r| {
        r.starts_with("app ") && r.contains(" 300 ") && r.contains(" A ") && r.contains("10.0.0.5")
    }));

    let removed = fx.manager.remove("app", Some("A")).await;
    assert!(removed.success, "{removed:?}");
    assert_eq!(removed.message.as_deref(), Some("Record app A removed successfully"));
    assert!(!fx.records().await.iter().any(|r| r.contains("10.0.0.5")));
}

#[tokio::test]
async fn remove_by_type_keeps_other_types() {
    let fx = Fixture::new(ZONE);
    assert!(fx.manager.add("mail", "A", "192.0.2.25", 3600).await.success);
    assert!(fx.manager.add("mail", "MX", "mail.internal.local.", 3600).await.success);

    assert!(fx.manager.remove("mail", Some("MX")).await.success);

    let mail: Vec<String> = fx
        .records()
        .await
        .into_iter()
        .filter(|r| r.starts_with("mail "))
        .collect();
    assert_eq!(mail.len(), 1);
    assert!(mail[0].contains("192.0.2.25"));
}

#[tokio::test]
async fn remove_without_type_drops_every_record_of_host() {
    let fx = Fixture::new(ZONE);
    assert!(fx.manager.add("mail", "A", "192.0.2.25", 3600).await.success);
    assert!(fx.manager.add("mail", "TXT", "v=spf1 mx -all", 3600).await.success);

    let removed = fx.manager.remove("mail", None).await;
    assert!(removed.success);
    assert_eq!(removed.message.as_deref(), Some("Record mail  removed successfully"));
    assert!(!fx.records().await.iter().any(|r| r.starts_with("mail ")));
    assert!(fx.records().await.iter().any(|r| r.starts_with("ns1 ")));
}

#[tokio::test]
async fn removing_unknown_record_is_not_found() {
    let fx = Fixture::new(ZONE);
    let before = fx.zone();

    let result = fx.manager.remove("ghost", None).await;

    assert_eq!(result.kind, Some(ErrorKind::NotFound));
    assert_eq!(result.error.as_deref(), Some("Record ghost  not found"));
    assert_eq!(fx.zone(), before);
    assert_eq!(fx.backups(), 0);
}

#[tokio::test]
async fn serial_advances_same_day_and_resets_next_day() {
    let fx = Fixture::new(ZONE);
    assert!(fx.manager.add("a1", "A", "192.0.2.31", 3600).await.success);
    assert!(fx.zone().contains("2024060102 ; Serial"));

    let next_day = Fixture::with(&fx.zone(), FakeRunner::default(), day(2024, 6, 2), false);
    assert!(next_day.manager.remove("a1", None).await.success);
    assert!(next_day.zone().contains("2024060201 ; Serial"));
}

#[tokio::test]
async fn new_record_lands_right_after_ns_block() {
    let fx = Fixture::new(ZONE);
    assert!(fx.manager.add("web", "CNAME", "ns1", 3600).await.success);

    let zone = fx.zone();
    let soa = zone.find("SOA").unwrap();
    let ns = zone.find("@   IN  NS").unwrap();
    let web = zone.find("web ").unwrap();
    let ns1 = zone.find("ns1                            3600").unwrap();
    assert!(soa < ns && ns < web && web < ns1);
}

#[tokio::test]
async fn without_ns_record_goes_after_soa_block() {
    let zone = "\
@ IN SOA ns1.internal.local. admin.internal.local. (
        2024060101 ; Serial
        86400 ) ; Minimum TTL
old                            3600    IN    A      192.0.2.9
";
    let fx = Fixture::new(zone);
    assert!(fx.manager.add("web", "AAAA", "2001:db8::10", 3600).await.success);

    let zone = fx.zone();
    assert!(zone.contains("86400 ) ; Minimum TTL\nweb "));
    assert!(zone.find("web ").unwrap() < zone.find("old ").unwrap());
}

#[tokio::test]
async fn unsupported_type_touches_nothing() {
    let fx = Fixture::new(ZONE);

    let result = fx.manager.add("_sip._tcp", "SRV", "10 5 5060 sip", 3600).await;

    assert!(!result.success);
    assert_eq!(result.kind, Some(ErrorKind::UnsupportedType));
    assert_eq!(result.error.as_deref(), Some("Unsupported record type: SRV"));
    assert_eq!(fx.zone(), ZONE);
    assert_eq!(fx.backups(), 0);
    assert!(fx.runner.programs().is_empty());
}

#[tokio::test]
async fn every_mutation_is_backed_up_checked_and_reloaded() {
    let fx = Fixture::new(ZONE);
    assert!(fx.manager.add("web", "A", "192.0.2.10", 3600).await.success);

    assert_eq!(fx.backups(), 1);
    let backup = fx.config.backup_path("20240601_091500");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), ZONE);

    let calls = fx.runner.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], fx.config.checkzone_argv());
    assert_eq!(calls[1], vec!["systemctl", "reload", "bind9"]);
}

#[tokio::test]
async fn failed_validation_leaves_written_zone_in_place() {
    let runner = FakeRunner::failing("named-checkzone", "zone internal.local/IN: loading from master file failed");
    let fx = Fixture::with(ZONE, runner, day(2024, 6, 1), false);

    let result = fx.manager.add("web", "A", "192.0.2.10", 3600).await;

    assert_eq!(result.kind, Some(ErrorKind::ValidationFailed));
    assert_eq!(
        result.error.as_deref(),
        Some("Zone validation failed: zone internal.local/IN: loading from master file failed")
    );
    assert!(fx.zone().contains("192.0.2.10"));
    assert_eq!(fx.backups(), 1);
    assert_eq!(fx.runner.programs(), vec!["named-checkzone"]);
}

#[tokio::test]
async fn failed_validation_can_restore_backup() {
    let runner = FakeRunner::failing("named-checkzone", "bad zone");
    let fx = Fixture::with(ZONE, runner, day(2024, 6, 1), true);

    let result = fx.manager.add("web", "A", "192.0.2.10", 3600).await;

    assert_eq!(result.kind, Some(ErrorKind::ValidationFailed));
    assert_eq!(fx.zone(), ZONE);
}

#[tokio::test]
async fn failed_reload_is_reported() {
    let runner = FakeRunner::failing("systemctl", "Unit bind9.service not loaded.");
    let fx = Fixture::with(ZONE, runner, day(2024, 6, 1), false);

    let result = fx.manager.add("web", "A", "192.0.2.10", 3600).await;

    assert_eq!(result.kind, Some(ErrorKind::ReloadFailed));
    assert_eq!(
        result.error.as_deref(),
        Some("Failed to reload Bind9: Unit bind9.service not loaded.")
    );
}

#[tokio::test]
async fn missing_zone_file_is_not_found() {
    let fx = Fixture::new(ZONE);
    std::fs::remove_file(&fx.config.zone_file).unwrap();

    for result in [
        fx.manager.add("web", "A", "192.0.2.10", 3600).await,
        fx.manager.remove("web", None).await,
        fx.manager.list().await,
    ] {
        assert_eq!(result.kind, Some(ErrorKind::NotFound));
        assert_eq!(result.error.as_deref(), Some("Zone file not found"));
    }
}

#[tokio::test]
async fn same_day_counter_overflow_fails_before_writing() {
    let zone = ZONE.replace("2024060101", "2024060199");
    let fx = Fixture::new(&zone);

    let result = fx.manager.add("web", "A", "192.0.2.10", 3600).await;

    assert_eq!(result.kind, Some(ErrorKind::SerialOverflow));
    assert_eq!(fx.zone(), zone);
    assert_eq!(fx.backups(), 0);
    assert!(fx.runner.programs().is_empty());
}

#[tokio::test]
async fn runs_real_processes_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = ZoneConfig {
        zone_file: dir.path().join("db.internal.local"),
        backup_dir: dir.path().join("backups"),
        staging_dir: dir.path().to_path_buf(),
        owner: None,
        elevate_command: Vec::new(),
        checkzone_command: "true".into(),
        reload_command: vec!["true".into()],
        command_timeout: Duration::from_secs(5),
        ..ZoneConfig::default()
    };
    std::fs::write(&config.zone_file, ZONE).unwrap();
    let manager = ZoneManager::with_parts(
        config.clone(),
        Arc::new(SystemRunner::new(config.command_timeout)),
        Arc::new(FixedClock(day(2024, 6, 1))),
    );

    let result = manager.add("web", "TXT", "hello world", 120).await;

    assert!(result.success, "{result:?}");
    let zone = std::fs::read_to_string(&config.zone_file).unwrap();
    assert!(zone.contains("IN    TXT    \"hello world\""));
}

#[test]
fn success_serializes_without_error_fields() {
    let json = serde_json::to_value(OperationResult::ok("Record web A added successfully")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"success": true, "message": "Record web A added successfully"})
    );
}

#[test]
fn failure_carries_kind() {
    let err = ZoneError::Conflict {
        hostname: "web".into(),
        rrtype: "A".into(),
    };
    let json = serde_json::to_value(OperationResult::failure(&err)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "success": false,
            "error": "Record web A already exists",
            "kind": "conflict"
        })
    );
}

#[test]
fn list_result_has_records() {
    let json = serde_json::to_value(OperationResult::with_records(vec!["a".into()])).unwrap();
    assert_eq!(json, serde_json::json!({"success": true, "records": ["a"]}));
}
