//! Text field decoders for the diagnostic batch segments
//!
//! Each decoder consumes one trimmed segment and produces a typed value.
//! Malformed or absent input degrades to `None` or a documented default —
//! decoding never fails a fetch cycle.

use std::sync::LazyLock;

use regex::Regex;

static PON_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"current=(\d+)").unwrap());
static LOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"load average:\s*([\d.]+)").unwrap());
static UPTIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"up\s+(?:(\d+)\s*days?,\s*)?(\d+):(\d{2})").unwrap());
static MEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Mem:\s*(\d+)\s*(\d+)\s*(\d+)").unwrap());
static SYSTEM_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"system type\s*:\s*(.*)").unwrap());
static MACHINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"machine\s*:\s*(.*)").unwrap());

/// PLOAM lifecycle states, keyed by the `pon psg` status code.
const PON_STATES: &[(u32, &str)] = &[
    (0, "O0, Power-up state"),
    (10, "O1, Initial state"),
    (11, "O1.1, Off-sync state"),
    (12, "O1.2, Profile learning state"),
    (20, "O2, Stand-by state"),
    (23, "O2.3, Serial number state"),
    (30, "O3, Serial number state"),
    (40, "O4, Ranging state"),
    (50, "O5, Operation state"),
    (51, "O5.1, Associated state"),
    (52, "O5.2, Pending state"),
    (60, "O6, Intermittent LOS state"),
    (70, "O7, Emergency stop state"),
    (71, "O7.1, Emergency stop off-sync state"),
    (72, "O7.2, Emergency stop in-sync state"),
    (81, "O8.1, Downstream tuning off-sync state"),
    (82, "O8.2, Downstream tuning profile learning state"),
    (90, "O9, Upstream tuning state"),
];

/// Maps a PLOAM status code to its human-readable label.
#[must_use]
pub fn pon_state_label(code: u32) -> String {
    PON_STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or_else(|| format!("Unknown ({code})"), |(_, label)| (*label).to_string())
}

/// Extracts the PLOAM state label from `pon psg` output.
///
/// No `current=<code>` token in the segment reads as state code 0.
#[must_use]
pub fn parse_pon_state(segment: &str) -> String {
    let code = PON_STATE_RE
        .captures(segment)
        .and_then(|c| c[1].parse::<u32>().ok())
        .unwrap_or(0);
    pon_state_label(code)
}

/// Parses a thermal-zone reading (integer millidegrees) into degrees.
#[must_use]
pub fn parse_millidegrees(segment: &str) -> Option<f64> {
    segment.trim().parse::<i64>().ok().map(|v| v as f64 / 1000.0)
}

/// Parses the ethernet link speed in Mbit/s.
#[must_use]
pub fn parse_eth_speed(segment: &str) -> Option<u32> {
    segment.trim().parse().ok()
}

/// Normalises the PON mode code for display.
///
/// Empty input falls back to the XGS-PON default; `PON` gets a dash
/// prefix so `xgspon` renders as `XGS-PON`.
#[must_use]
pub fn parse_pon_mode(segment: &str) -> String {
    let mode = if segment.is_empty() { "xgspon" } else { segment };
    mode.to_uppercase().replace("PON", "-PON")
}

/// Returns the module type, defaulting to `bfw` when the probe was empty.
#[must_use]
pub fn parse_module_type(segment: &str) -> String {
    if segment.is_empty() {
        "bfw".to_string()
    } else {
        segment.to_string()
    }
}

/// Returns the active firmware bank, defaulting to `A`.
#[must_use]
pub fn parse_active_bank(segment: &str) -> String {
    if segment.is_empty() {
        "A".to_string()
    } else {
        segment.to_string()
    }
}

/// Extracts the 1-minute load average from `uptime` output.
#[must_use]
pub fn parse_cpu_load(segment: &str) -> f64 {
    LOAD_RE
        .captures(segment)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0.0)
}

/// Humanizes the `up [<days> day(s),] H:MM` part of `uptime` output.
///
/// Zero components are omitted; an all-zero uptime reads
/// `less than a minute`; unparsable input reads `unknown`.
#[must_use]
pub fn humanize_uptime(segment: &str) -> String {
    let Some(caps) = UPTIME_RE.captures(segment) else {
        return "unknown".to_string();
    };

    let days: u64 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
    let hours: u64 = caps[2].parse().unwrap_or(0);
    let minutes: u64 = caps[3].parse().unwrap_or(0);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days} d"));
    }
    if hours > 0 {
        parts.push(format!("{hours} h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} m"));
    }

    if parts.is_empty() {
        "less than a minute".to_string()
    } else {
        parts.join(", ")
    }
}

/// Memory figures decoded from the `Mem:` line of `free -m`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStats {
    /// Total memory
    pub total: f64,
    /// Used memory
    pub used: f64,
    /// Available memory (total minus used)
    pub available: f64,
    /// Used fraction as a percentage, 0 when total is 0
    pub percent: f64,
}

/// Parses the `Mem:` line of `free -m` output.
///
/// The raw values are divided by 1024 even though `free -m` already
/// reports MiB. The original exporter labels the result as MB; the quirk
/// is preserved rather than corrected so readings stay comparable.
#[must_use]
pub fn parse_memory(segment: &str) -> Option<MemoryStats> {
    let caps = MEM_RE.captures(segment)?;
    let total: f64 = caps[1].parse().ok()?;
    let used: f64 = caps[2].parse().ok()?;

    let percent = if total > 0.0 {
        (used / total) * 100.0
    } else {
        0.0
    };

    Some(MemoryStats {
        total: total / 1024.0,
        used: used / 1024.0,
        available: (total - used) / 1024.0,
        percent,
    })
}

/// SoC identification from `/proc/cpuinfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocInfo {
    /// `system type :` line value
    pub arch: String,
    /// `machine :` line value, with the `-SFP-PON` suffix stripped
    pub model: String,
}

/// Parses the SoC architecture and model lines from `/proc/cpuinfo`.
#[must_use]
pub fn parse_soc(segment: &str) -> SocInfo {
    let arch = SYSTEM_TYPE_RE
        .captures(segment)
        .map_or_else(|| "unknown".to_string(), |c| c[1].trim().to_string());

    let model = MACHINE_RE.captures(segment).map_or_else(
        || "unknown".to_string(),
        |c| {
            let raw = c[1].trim();
            raw.strip_suffix("-SFP-PON").unwrap_or(raw).to_string()
        },
    );

    SocInfo { arch, model }
}

/// Firmware identity from the version file's `KEY=value` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// `FW_VERSION` value
    pub version: String,
    /// `FW_REVISION` value
    pub revision: String,
    /// `FW_VARIANT` value
    pub variant: String,
}

/// Parses the firmware version file, defaulting each field to `unknown`.
#[must_use]
pub fn parse_firmware(segment: &str) -> FirmwareInfo {
    let value = |key: &str| -> String {
        segment
            .lines()
            .find_map(|l| l.strip_prefix(key))
            .map_or_else(|| "unknown".to_string(), |v| v.trim().to_string())
    };

    FirmwareInfo {
        version: value("FW_VERSION="),
        revision: value("FW_REVISION="),
        variant: value("FW_VARIANT="),
    }
}

/// Trims an identifier segment (MAC, serial), defaulting to `unknown`.
#[must_use]
pub fn parse_identifier(segment: &str) -> String {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pon_state_operation() {
        let label = parse_pon_state("PLOAM status: current=50 prev=40");
        assert!(label.contains("O5, Operation state"));
    }

    #[test]
    fn test_pon_state_unmapped_code() {
        assert_eq!(pon_state_label(999), "Unknown (999)");
    }

    #[test]
    fn test_pon_state_missing_token_reads_as_power_up() {
        assert_eq!(parse_pon_state("garbage"), "O0, Power-up state");
    }

    #[test]
    fn test_millidegrees() {
        assert_eq!(parse_millidegrees("48500"), Some(48.5));
        assert_eq!(parse_millidegrees("not-a-number"), None);
        assert_eq!(parse_millidegrees(""), None);
    }

    #[test]
    fn test_eth_speed() {
        assert_eq!(parse_eth_speed("10000"), Some(10_000));
        assert_eq!(parse_eth_speed(""), None);
    }

    #[test]
    fn test_pon_mode_default_and_substitution() {
        assert_eq!(parse_pon_mode(""), "XGS-PON");
        assert_eq!(parse_pon_mode("xgspon"), "XGS-PON");
        assert_eq!(parse_pon_mode("gpon"), "G-PON");
    }

    #[test]
    fn test_module_type_and_bank_defaults() {
        assert_eq!(parse_module_type(""), "bfw");
        assert_eq!(parse_module_type("potron"), "potron");
        assert_eq!(parse_active_bank(""), "A");
        assert_eq!(parse_active_bank("B"), "B");
    }

    #[test]
    fn test_cpu_load() {
        let uptime = " 12:30:01 up 2 days, 3:15, load average: 0.52, 0.34, 0.28";
        assert!((parse_cpu_load(uptime) - 0.52).abs() < f64::EPSILON);
        assert!((parse_cpu_load("garbage") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_humanize_uptime_days() {
        let uptime = " 12:30:01 up 2 days, 3:15, load average: 0.52, 0.34, 0.28";
        assert_eq!(humanize_uptime(uptime), "2 d, 3 h, 15 m");
    }

    #[test]
    fn test_humanize_uptime_no_days() {
        assert_eq!(humanize_uptime("10:00:00 up 4:05, load average: 0.1"), "4 h, 5 m");
    }

    #[test]
    fn test_humanize_uptime_under_a_minute() {
        assert_eq!(humanize_uptime("10:00:00 up 0:00, load average: 0.1"), "less than a minute");
    }

    #[test]
    fn test_humanize_uptime_unparsable() {
        assert_eq!(humanize_uptime("no uptime here"), "unknown");
    }

    #[test]
    fn test_memory_preserves_unit_quirk() {
        let free = "              total        used        free\nMem:           230         120          90";
        let mem = parse_memory(free).unwrap();
        assert!((mem.total - 230.0 / 1024.0).abs() < 1e-9);
        assert!((mem.used - 120.0 / 1024.0).abs() < 1e-9);
        assert!((mem.available - 110.0 / 1024.0).abs() < 1e-9);
        assert!((mem.percent - (120.0 / 230.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_zero_total() {
        let mem = parse_memory("Mem: 0 0 0").unwrap();
        assert!((mem.percent - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_memory_unparsable() {
        assert!(parse_memory("Swap: 1 2 3").is_none());
    }

    #[test]
    fn test_soc_suffix_strip() {
        let cpuinfo = "system type : Intel Falcon Mountain\nmachine : SFP_8311-SFP-PON\n";
        let soc = parse_soc(cpuinfo);
        assert_eq!(soc.arch, "Intel Falcon Mountain");
        assert_eq!(soc.model, "SFP_8311");
    }

    #[test]
    fn test_soc_missing_lines() {
        let soc = parse_soc("processor : 0");
        assert_eq!(soc.arch, "unknown");
        assert_eq!(soc.model, "unknown");
    }

    #[test]
    fn test_firmware_fields() {
        let version_file = "FW_VERSION=2.1.0\nFW_REVISION=abc123\nFW_VARIANT=basic\n";
        let fw = parse_firmware(version_file);
        assert_eq!(fw.version, "2.1.0");
        assert_eq!(fw.revision, "abc123");
        assert_eq!(fw.variant, "basic");
    }

    #[test]
    fn test_firmware_defaults() {
        let fw = parse_firmware("");
        assert_eq!(fw.version, "unknown");
        assert_eq!(fw.revision, "unknown");
        assert_eq!(fw.variant, "unknown");
    }

    #[test]
    fn test_identifier_default() {
        assert_eq!(parse_identifier("  "), "unknown");
        assert_eq!(parse_identifier(" aa:bb:cc:dd:ee:ff "), "aa:bb:cc:dd:ee:ff");
    }
}
