//! Snapshot assembly: one all-or-nothing fetch cycle
//!
//! A cycle executes the batched command once, splits the combined output
//! and runs every field decoder against its assigned segments. Transport
//! and protocol failures abort the cycle; decoder-level problems only
//! degrade their own field.

use chrono::Utc;

use crate::batch::{self, BATCH_COMMANDS, BOUNDARY, seg};
use crate::error::{FetchError, FetchResult};
use crate::parser;
use crate::session::CommandRunner;
use crate::snapshot::TelemetrySnapshot;
use crate::{config::ResolvedConfig, eeprom};

/// Runs one fetch cycle against the device.
///
/// Never retries; the scheduler decides when to try again.
///
/// # Errors
///
/// Returns [`FetchError::NoOutput`] when the batch produced nothing,
/// [`FetchError::SegmentCountMismatch`] on protocol drift, or any
/// transport error from the runner.
pub async fn fetch_snapshot(
    runner: &dyn CommandRunner,
    config: &ResolvedConfig,
) -> FetchResult<TelemetrySnapshot> {
    let command = batch::batch_command();
    let output = runner.run(&command).await?;

    if output.trim().is_empty() {
        return Err(FetchError::NoOutput);
    }

    let segments = batch::split(&output, BOUNDARY, BATCH_COMMANDS.len())?;
    tracing::debug!(host = %config.host, segments = segments.len(), "batch output split");

    Ok(assemble(&segments, &config.host))
}

/// Merges decoded fields from the ordered segments into one snapshot.
pub(crate) fn assemble(segments: &[String], host: &str) -> TelemetrySnapshot {
    let optical = eeprom::parse_diagnostics(&segments[seg::EEPROM51]);
    let vendor = eeprom::parse_vendor(&segments[seg::EEPROM50]);
    let soc = parser::parse_soc(&segments[seg::CPUINFO]);
    let firmware = parser::parse_firmware(&segments[seg::FW_VERSION]);
    let memory = parser::parse_memory(&segments[seg::MEMORY]);
    let module_type = parser::parse_module_type(&segments[seg::MODULE_TYPE]);

    TelemetrySnapshot {
        ploam_status: parser::parse_pon_state(&segments[seg::PON_STATUS]),
        temp_cpu0: parser::parse_millidegrees(&segments[seg::TEMP_CPU0]),
        temp_cpu1: parser::parse_millidegrees(&segments[seg::TEMP_CPU1]),
        temp_optic: optical.temperature,
        voltage: optical.voltage,
        tx_bias: optical.tx_bias,
        tx_power: optical.tx_power,
        rx_power: optical.rx_power,
        eth_speed: parser::parse_eth_speed(&segments[seg::ETH_SPEED]),
        pon_mode: parser::parse_pon_mode(&segments[seg::PON_MODE]),
        active_bank: parser::parse_active_bank(&segments[seg::ACTIVE_BANK]),
        cpu_load: parser::parse_cpu_load(&segments[seg::UPTIME]),
        uptime: parser::humanize_uptime(&segments[seg::UPTIME]),
        memory_total: memory.map(|m| m.total),
        memory_used: memory.map(|m| m.used),
        memory_available: memory.map(|m| m.available),
        memory_percent: memory.map(|m| m.percent),
        soc_arch: soc.arch,
        soc_model: soc.model,
        mac_address: parser::parse_identifier(&segments[seg::MAC_ADDRESS]),
        pon_serial: parser::parse_identifier(&segments[seg::PON_SERIAL]),
        ip_address: host.to_string(),
        device_model: format!("{} {}", vendor.name, vendor.part_number),
        device_hw_version: format!("{} [{}]", vendor.revision, module_type),
        device_sw_version: format!(
            "8311 [{}] - {} ({})",
            firmware.variant, firmware.version, firmware.revision
        ),
        fetched_at: Utc::now(),
    }
}
