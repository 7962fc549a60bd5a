//! End-to-end fetch cycle tests with a canned transport
//!
//! Drives the full pipeline (batch command, split, decode, assemble, and
//! the poller cache) through a stub `CommandRunner` returning recorded
//! device output.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use onumon_core::batch::{BATCH_COMMANDS, BOUNDARY};
use onumon_core::config::{OnuOptions, OnuSettings, ResolvedConfig};
use onumon_core::error::{FetchError, FetchResult};
use onumon_core::fetch_snapshot;
use onumon_core::poller::{PollEvent, start_poller};
use onumon_core::session::CommandRunner;

struct CannedRunner {
    output: FetchResult<String>,
}

#[async_trait]
impl CommandRunner for CannedRunner {
    async fn run(&self, _command: &str) -> FetchResult<String> {
        match &self.output {
            Ok(s) => Ok(s.clone()),
            Err(_) => Err(FetchError::NoOutput),
        }
    }
}

fn config() -> ResolvedConfig {
    let settings = OnuSettings {
        host: "192.168.11.1".to_string(),
        username: "root".to_string(),
        device_manufacturer: "ACME".to_string(),
        device_name: "XGSPON ONU Stick".to_string(),
        scan_interval_secs: None,
    };
    ResolvedConfig::resolve(&settings, &OnuOptions::default(), PathBuf::from("/k")).unwrap()
}

/// Recorded output of one healthy cycle, one entry per batch command.
fn healthy_segments() -> Vec<String> {
    let diagnostics = {
        let mut page = [0u8; 106];
        page[96] = 45; // 45 C
        page[98] = 0x80; // 3.2768 V
        page[102] = 0x27;
        page[103] = 0x10; // 1.0 mW tx
        page[104] = 0x13;
        page[105] = 0x88; // 0.5 mW rx
        hex::encode(page)
    };
    let vendor = {
        let mut page = [0x20u8; 96];
        page[20..24].copy_from_slice(b"ACME");
        page[40..48].copy_from_slice(b"ONU-8311");
        page[56..59].copy_from_slice(b"1.2");
        hex::encode(page)
    };

    vec![
        "PLOAM current=50 prev=40".to_string(),
        "48500".to_string(),
        "51250".to_string(),
        vendor,
        diagnostics,
        "10000".to_string(),
        "xgspon".to_string(),
        "bfw".to_string(),
        "B".to_string(),
        " 12:30:01 up 2 days, 3:15, load average: 0.52, 0.30, 0.18".to_string(),
        "              total        used        free\nMem:            230         120          95\nSwap:             0           0           0".to_string(),
        "system type : Falcon\nmachine : URX851-SFP-PON".to_string(),
        "FW_VERSION=2.1.0\nFW_REVISION=abcdef0\nFW_VARIANT=basic".to_string(),
        "aa:bb:cc:dd:ee:ff".to_string(),
        "ABCD12345678".to_string(),
    ]
}

fn device_output(segments: &[String]) -> String {
    segments.join(&format!("\n{BOUNDARY}\n"))
}

#[tokio::test]
async fn test_healthy_cycle_produces_full_snapshot() {
    let runner = CannedRunner {
        output: Ok(device_output(&healthy_segments())),
    };

    let snapshot = fetch_snapshot(&runner, &config()).await.unwrap();

    assert_eq!(snapshot.ploam_status, "O5, Operation state");
    assert_eq!(snapshot.temp_cpu0, Some(48.5));
    assert_eq!(snapshot.temp_cpu1, Some(51.25));
    assert_eq!(snapshot.temp_optic, Some(45.0));
    assert_eq!(snapshot.tx_power, Some(0.0)); // 1.0 mW
    assert_eq!(snapshot.rx_power, Some(-3.01)); // 0.5 mW
    assert_eq!(snapshot.eth_speed, Some(10_000));
    assert_eq!(snapshot.pon_mode, "XGS-PON");
    assert_eq!(snapshot.active_bank, "B");
    assert!((snapshot.cpu_load - 0.52).abs() < f64::EPSILON);
    assert_eq!(snapshot.uptime, "2 d, 3 h, 15 m");
    assert_eq!(snapshot.soc_arch, "Falcon");
    assert_eq!(snapshot.soc_model, "URX851");
    assert_eq!(snapshot.mac_address, "aa:bb:cc:dd:ee:ff");
    assert_eq!(snapshot.pon_serial, "ABCD12345678");
    assert_eq!(snapshot.ip_address, "192.168.11.1");
    assert_eq!(snapshot.device_model, "ACME ONU-8311");
    assert_eq!(snapshot.device_hw_version, "1.2 [bfw]");
    assert_eq!(snapshot.device_sw_version, "8311 [basic] - 2.1.0 (abcdef0)");
}

#[tokio::test]
async fn test_truncated_output_fails_the_cycle() {
    let mut segments = healthy_segments();
    segments.pop();
    let runner = CannedRunner {
        output: Ok(device_output(&segments)),
    };

    let err = fetch_snapshot(&runner, &config()).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::SegmentCountMismatch { expected, actual }
            if expected == BATCH_COMMANDS.len() && actual == BATCH_COMMANDS.len() - 1
    ));
}

#[tokio::test]
async fn test_empty_output_fails_the_cycle() {
    let runner = CannedRunner {
        output: Ok("   \n".to_string()),
    };
    let err = fetch_snapshot(&runner, &config()).await.unwrap_err();
    assert!(matches!(err, FetchError::NoOutput));
}

#[tokio::test]
async fn test_poller_caches_first_snapshot_and_stops() {
    let runner = Arc::new(CannedRunner {
        output: Ok(device_output(&healthy_segments())),
    });

    let (handle, mut events) = start_poller(config(), runner);

    match events.recv().await {
        Some(PollEvent::Snapshot(snapshot)) => {
            assert_eq!(snapshot.ploam_status, "O5, Operation state");
        }
        other => panic!("expected snapshot event, got {other:?}"),
    }
    assert!(handle.last_success());
    assert!(handle.latest().is_some());

    handle.stop().await;
    loop {
        match events.recv().await {
            Some(PollEvent::Stopped) | None => break,
            Some(_) => {}
        }
    }
}

#[tokio::test]
async fn test_poller_failure_leaves_cache_empty() {
    let runner = Arc::new(CannedRunner {
        output: Err(FetchError::NoOutput),
    });

    let (handle, mut events) = start_poller(config(), runner);

    match events.recv().await {
        Some(PollEvent::CycleFailed(_)) => {}
        other => panic!("expected failure event, got {other:?}"),
    }
    assert!(!handle.last_success());
    assert!(handle.latest().is_none());

    handle.stop().await;
}
