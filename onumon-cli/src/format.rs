//! Snapshot rendering for terminal output.

use std::fmt::Write as _;

use onumon_core::snapshot::{FIELD_DESCRIPTORS, FieldCategory, FieldValue, TelemetrySnapshot};

use crate::error::CliError;

const CATEGORY_ORDER: [(FieldCategory, &str); 5] = [
    (FieldCategory::Network, "Network"),
    (FieldCategory::Optical, "Optical"),
    (FieldCategory::Thermal, "Thermal"),
    (FieldCategory::System, "System"),
    (FieldCategory::Identity, "Identity"),
];

/// Formats a snapshot as a category-grouped table.
#[must_use]
pub fn format_table(snapshot: &TelemetrySnapshot) -> String {
    let label_width = FIELD_DESCRIPTORS
        .iter()
        .map(|d| d.label.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Snapshot of {} at {}",
        snapshot.ip_address,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for (category, heading) in CATEGORY_ORDER {
        let rows: Vec<_> = snapshot
            .fields()
            .filter(|(d, _)| d.category == category)
            .collect();
        if rows.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{heading}");
        for (descriptor, value) in rows {
            let rendered = render_value(&value, descriptor.unit);
            let _ = writeln!(out, "  {:<label_width$}  {rendered}", descriptor.label);
        }
    }

    out
}

fn render_value(value: &FieldValue, unit: Option<&str>) -> String {
    match (value, unit) {
        (FieldValue::Unavailable, _) => "unavailable".to_string(),
        (v, Some(unit)) => format!("{v} {unit}"),
        (v, None) => v.to_string(),
    }
}

/// Formats a snapshot as pretty-printed JSON.
pub fn format_json(snapshot: &TelemetrySnapshot) -> Result<String, CliError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| CliError::Config(format!("failed to serialize snapshot: {e}")))
}
