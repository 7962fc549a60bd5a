//! Telemetry snapshot value type and the field descriptor table
//!
//! A [`TelemetrySnapshot`] is built once per successful fetch cycle and
//! never mutated; consumers either see a complete fresh snapshot or the
//! previous one. The descriptor table gives hosts a single generic way to
//! enumerate fields (label, unit, category) instead of hard-coding one
//! accessor per field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable set of telemetry values from a single fetch cycle.
///
/// `None` means the field was absent or malformed in that cycle's output;
/// the cycle itself still succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// PLOAM lifecycle state label
    pub ploam_status: String,
    /// CPU thermal zone 0 temperature (Celsius)
    pub temp_cpu0: Option<f64>,
    /// CPU thermal zone 1 temperature (Celsius)
    pub temp_cpu1: Option<f64>,
    /// Optical module temperature (Celsius)
    pub temp_optic: Option<f64>,
    /// Optical module supply voltage (V)
    pub voltage: Option<f64>,
    /// Laser bias current (mA)
    pub tx_bias: Option<f64>,
    /// Transmit power (dBm)
    pub tx_power: Option<f64>,
    /// Receive power (dBm)
    pub rx_power: Option<f64>,
    /// Ethernet link speed (Mbit/s)
    pub eth_speed: Option<u32>,
    /// PON mode label (e.g. `XGS-PON`)
    pub pon_mode: String,
    /// Active firmware bank (`A`/`B`)
    pub active_bank: String,
    /// 1-minute load average
    pub cpu_load: f64,
    /// Humanized uptime description
    pub uptime: String,
    /// Total memory (MB, see memory decoder for the unit quirk)
    pub memory_total: Option<f64>,
    /// Used memory (MB)
    pub memory_used: Option<f64>,
    /// Available memory (MB)
    pub memory_available: Option<f64>,
    /// Memory usage percentage
    pub memory_percent: Option<f64>,
    /// SoC architecture string
    pub soc_arch: String,
    /// SoC model string
    pub soc_model: String,
    /// Management MAC address
    pub mac_address: String,
    /// PON serial number
    pub pon_serial: String,
    /// Management IP address (from configuration)
    pub ip_address: String,
    /// Device model (vendor name + part number)
    pub device_model: String,
    /// Hardware version (vendor revision + module type)
    pub device_hw_version: String,
    /// Software version (firmware variant/version/revision)
    pub device_sw_version: String,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

/// A field value as exposed through the descriptor table.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Numeric reading
    Number(f64),
    /// Textual reading
    Text(String),
    /// Absent or malformed in this cycle
    Unavailable,
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Broad grouping of telemetry fields for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// Optical transceiver readings
    Optical,
    /// Temperatures
    Thermal,
    /// Link and PON protocol state
    Network,
    /// Load, uptime, memory
    System,
    /// Device identity strings
    Identity,
}

/// Describes one telemetry field: key, label, unit and how to read it.
pub struct FieldDescriptor {
    /// Stable machine-readable key
    pub key: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Display unit, if the field is numeric
    pub unit: Option<&'static str>,
    /// Display grouping
    pub category: FieldCategory,
    /// Reads the field out of a snapshot
    pub read: fn(&TelemetrySnapshot) -> FieldValue,
}

fn num(value: Option<f64>) -> FieldValue {
    value.map_or(FieldValue::Unavailable, FieldValue::Number)
}

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

/// The full telemetry field table, in display order.
pub const FIELD_DESCRIPTORS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: "ploam_status",
        label: "PLOAM Status",
        unit: None,
        category: FieldCategory::Network,
        read: |s| text(&s.ploam_status),
    },
    FieldDescriptor {
        key: "pon_mode",
        label: "PON Mode",
        unit: None,
        category: FieldCategory::Network,
        read: |s| text(&s.pon_mode),
    },
    FieldDescriptor {
        key: "eth_speed",
        label: "Ethernet Speed",
        unit: Some("Mbit/s"),
        category: FieldCategory::Network,
        read: |s| num(s.eth_speed.map(f64::from)),
    },
    FieldDescriptor {
        key: "temp_cpu0",
        label: "CPU 0 Temperature",
        unit: Some("°C"),
        category: FieldCategory::Thermal,
        read: |s| num(s.temp_cpu0),
    },
    FieldDescriptor {
        key: "temp_cpu1",
        label: "CPU 1 Temperature",
        unit: Some("°C"),
        category: FieldCategory::Thermal,
        read: |s| num(s.temp_cpu1),
    },
    FieldDescriptor {
        key: "temp_optic",
        label: "Optical Temperature",
        unit: Some("°C"),
        category: FieldCategory::Optical,
        read: |s| num(s.temp_optic),
    },
    FieldDescriptor {
        key: "voltage",
        label: "Module Voltage",
        unit: Some("V"),
        category: FieldCategory::Optical,
        read: |s| num(s.voltage),
    },
    FieldDescriptor {
        key: "tx_bias",
        label: "TX Bias",
        unit: Some("mA"),
        category: FieldCategory::Optical,
        read: |s| num(s.tx_bias),
    },
    FieldDescriptor {
        key: "tx_power",
        label: "TX Power",
        unit: Some("dBm"),
        category: FieldCategory::Optical,
        read: |s| num(s.tx_power),
    },
    FieldDescriptor {
        key: "rx_power",
        label: "RX Power",
        unit: Some("dBm"),
        category: FieldCategory::Optical,
        read: |s| num(s.rx_power),
    },
    FieldDescriptor {
        key: "cpu_load",
        label: "CPU Load",
        unit: None,
        category: FieldCategory::System,
        read: |s| FieldValue::Number(s.cpu_load),
    },
    FieldDescriptor {
        key: "uptime",
        label: "Uptime",
        unit: None,
        category: FieldCategory::System,
        read: |s| text(&s.uptime),
    },
    FieldDescriptor {
        key: "memory_total",
        label: "Memory Total",
        unit: Some("MB"),
        category: FieldCategory::System,
        read: |s| num(s.memory_total),
    },
    FieldDescriptor {
        key: "memory_used",
        label: "Memory Used",
        unit: Some("MB"),
        category: FieldCategory::System,
        read: |s| num(s.memory_used),
    },
    FieldDescriptor {
        key: "memory_available",
        label: "Memory Available",
        unit: Some("MB"),
        category: FieldCategory::System,
        read: |s| num(s.memory_available),
    },
    FieldDescriptor {
        key: "memory_percent",
        label: "Memory Usage",
        unit: Some("%"),
        category: FieldCategory::System,
        read: |s| num(s.memory_percent),
    },
    FieldDescriptor {
        key: "active_bank",
        label: "Active Firmware Bank",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.active_bank),
    },
    FieldDescriptor {
        key: "soc_arch",
        label: "SoC Architecture",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.soc_arch),
    },
    FieldDescriptor {
        key: "soc_model",
        label: "SoC Model",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.soc_model),
    },
    FieldDescriptor {
        key: "mac_address",
        label: "Management MAC Address",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.mac_address),
    },
    FieldDescriptor {
        key: "ip_address",
        label: "Management IP Address",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.ip_address),
    },
    FieldDescriptor {
        key: "pon_serial",
        label: "PON Serial",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.pon_serial),
    },
    FieldDescriptor {
        key: "device_model",
        label: "Device Model",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.device_model),
    },
    FieldDescriptor {
        key: "device_hw_version",
        label: "Hardware Version",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.device_hw_version),
    },
    FieldDescriptor {
        key: "device_sw_version",
        label: "Software Version",
        unit: None,
        category: FieldCategory::Identity,
        read: |s| text(&s.device_sw_version),
    },
];

impl TelemetrySnapshot {
    /// Iterates over all fields as `(descriptor, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, FieldValue)> + '_ {
        FIELD_DESCRIPTORS.iter().map(|d| (d, (d.read)(self)))
    }

    /// Looks up a single field value by its key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        FIELD_DESCRIPTORS
            .iter()
            .find(|d| d.key == key)
            .map(|d| (d.read)(self))
    }
}
