//! Batched diagnostic command protocol
//!
//! All diagnostics are collected in a single remote round trip: the fixed
//! command list is joined into one shell invocation with a boundary line
//! echoed between sub-commands, and the combined output is split back into
//! per-command segments. The `;` join keeps the shell executing past
//! non-zero exits, so a failing sub-command yields an empty segment rather
//! than truncating the batch.

use crate::error::{FetchError, FetchResult};

/// Boundary line separating per-command output segments.
///
/// Chosen as effectively unique: it must never appear in any command's
/// output, or the split will over-count.
pub const BOUNDARY: &str = "---Boundary-ONU-exporter---";

/// The fixed, order-significant diagnostic command list.
///
/// Decoders are bound to segment positions, so reordering this list is a
/// protocol change.
pub const BATCH_COMMANDS: [&str; 15] = [
    "pon psg",
    "cat /sys/class/thermal/thermal_zone0/temp",
    "cat /sys/class/thermal/thermal_zone1/temp",
    "xxd -p /sys/class/pon_mbox/pon_mbox0/device/eeprom50",
    "xxd -p /sys/class/pon_mbox/pon_mbox0/device/eeprom51",
    "cat /sys/class/net/eth0_0/speed",
    "uci get gpon.ponip.pon_mode",
    ". /lib/8311.sh && get_8311_module_type",
    ". /lib/8311.sh && active_fwbank",
    "uptime",
    "free -m",
    "cat /proc/cpuinfo",
    "cat /etc/8311_version",
    ". /lib/8311.sh && get_8311_lct_mac",
    ". /lib/8311.sh && get_8311_gpon_sn",
];

/// Well-known segment positions within [`BATCH_COMMANDS`].
pub mod seg {
    /// `pon psg` PLOAM state output
    pub const PON_STATUS: usize = 0;
    /// Thermal zone 0 millidegrees
    pub const TEMP_CPU0: usize = 1;
    /// Thermal zone 1 millidegrees
    pub const TEMP_CPU1: usize = 2;
    /// Transceiver EEPROM page 0x50 hex dump (vendor identity)
    pub const EEPROM50: usize = 3;
    /// Transceiver EEPROM page 0x51 hex dump (diagnostics)
    pub const EEPROM51: usize = 4;
    /// Ethernet link speed in Mbit/s
    pub const ETH_SPEED: usize = 5;
    /// PON mode short code
    pub const PON_MODE: usize = 6;
    /// Module type identifier
    pub const MODULE_TYPE: usize = 7;
    /// Active firmware bank
    pub const ACTIVE_BANK: usize = 8;
    /// `uptime` output
    pub const UPTIME: usize = 9;
    /// `free -m` output
    pub const MEMORY: usize = 10;
    /// `/proc/cpuinfo` output
    pub const CPUINFO: usize = 11;
    /// Firmware version file contents
    pub const FW_VERSION: usize = 12;
    /// Management MAC address
    pub const MAC_ADDRESS: usize = 13;
    /// PON serial number
    pub const PON_SERIAL: usize = 14;
}

/// Joins commands into a single shell invocation with boundary echoes.
#[must_use]
pub fn build_batch(commands: &[&str], boundary: &str) -> String {
    commands.join(&format!("; echo '{boundary}'; "))
}

/// Returns the full batched command string for [`BATCH_COMMANDS`].
#[must_use]
pub fn batch_command() -> String {
    build_batch(&BATCH_COMMANDS, BOUNDARY)
}

/// Splits combined output into trimmed per-command segments.
///
/// Empty segments are valid — they mean a sub-command produced no output.
/// A segment count different from `expected` is fatal: a shortfall means
/// the batch was truncated, a surplus means the boundary leaked into some
/// command's output. Either way the positional decoder binding is broken.
///
/// # Errors
///
/// Returns [`FetchError::SegmentCountMismatch`] when the count is off.
pub fn split(raw: &str, boundary: &str, expected: usize) -> FetchResult<Vec<String>> {
    let segments: Vec<String> = raw
        .split(boundary)
        .map(|s| s.trim().to_string())
        .collect();

    if segments.len() != expected {
        return Err(FetchError::SegmentCountMismatch {
            expected,
            actual: segments.len(),
        });
    }

    Ok(segments)
}
