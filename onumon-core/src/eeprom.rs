//! Transceiver EEPROM page decoders
//!
//! The ONU exposes two SFF-8472-style EEPROM pages as hex dumps: page 0x50
//! carries the vendor identity strings, page 0x51 the live diagnostic
//! block. Both decoders are pure and degrade to unavailable values on
//! short or malformed input.

/// Minimum page length carrying the full diagnostic block.
const DIAG_PAGE_MIN_LEN: usize = 106;

/// Byte offsets of the diagnostic fields within page 0x51.
const DIAG_TEMP: usize = 96;
const DIAG_VOLTAGE: usize = 98;
const DIAG_TX_BIAS: usize = 100;
const DIAG_TX_POWER: usize = 102;
const DIAG_RX_POWER: usize = 104;

/// Byte ranges of the identity strings within page 0x50.
const VENDOR_NAME: std::ops::Range<usize> = 20..36;
const VENDOR_PART_NUMBER: std::ops::Range<usize> = 40..56;
const VENDOR_REVISION: std::ops::Range<usize> = 56..60;

/// Live optical diagnostics decoded from EEPROM page 0x51.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OpticalReadings {
    /// Module temperature in degrees Celsius
    pub temperature: Option<f64>,
    /// Supply voltage in volts
    pub voltage: Option<f64>,
    /// Laser bias current in milliamps, rounded to 2 decimals
    pub tx_bias: Option<f64>,
    /// Transmit power in dBm, rounded to 2 decimals
    pub tx_power: Option<f64>,
    /// Receive power in dBm, rounded to 2 decimals
    pub rx_power: Option<f64>,
}

impl OpticalReadings {
    /// All five fields unavailable (short or missing page).
    #[must_use]
    pub const fn unavailable() -> Self {
        Self {
            temperature: None,
            voltage: None,
            tx_bias: None,
            tx_power: None,
            rx_power: None,
        }
    }
}

/// Vendor identity strings decoded from EEPROM page 0x50.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorIdentity {
    /// Vendor name
    pub name: String,
    /// Vendor part number
    pub part_number: String,
    /// Hardware revision
    pub revision: String,
}

/// Decodes a hex-dump segment into raw bytes, ignoring line breaks.
#[must_use]
pub fn decode_hex_page(segment: &str) -> Option<Vec<u8>> {
    let compact: String = segment.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    hex::decode(compact).ok()
}

/// Converts milliwatts to dBm, rounded to 2 decimals.
///
/// Zero or negative power has no dBm representation and reads as
/// unavailable.
#[must_use]
pub fn dbm(mw: f64) -> Option<f64> {
    if mw <= 0.0 {
        return None;
    }
    Some(round2(10.0 * mw.log10()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn u16_be(page: &[u8], offset: usize) -> f64 {
    f64::from((u16::from(page[offset]) << 8) | u16::from(page[offset + 1]))
}

/// Decodes the diagnostic block from a page 0x51 hex dump.
///
/// Pages shorter than 106 bytes carry no diagnostic block; every field is
/// unavailable. Scaling follows the SFF-8472 external-calibration layout:
/// whole+fractional temperature bytes, voltage /10000, bias /500, tx/rx
/// power /10000 mW then converted to dBm.
#[must_use]
pub fn parse_diagnostics(segment: &str) -> OpticalReadings {
    let Some(page) = decode_hex_page(segment) else {
        return OpticalReadings::unavailable();
    };
    if page.len() < DIAG_PAGE_MIN_LEN {
        tracing::warn!(
            len = page.len(),
            need = DIAG_PAGE_MIN_LEN,
            "diagnostic EEPROM page too short"
        );
        return OpticalReadings::unavailable();
    }

    let temperature = f64::from(page[DIAG_TEMP]) + f64::from(page[DIAG_TEMP + 1]) / 256.0;
    let voltage = u16_be(&page, DIAG_VOLTAGE) / 10_000.0;
    let tx_bias = round2(u16_be(&page, DIAG_TX_BIAS) / 500.0);
    let tx_mw = u16_be(&page, DIAG_TX_POWER) / 10_000.0;
    let rx_mw = u16_be(&page, DIAG_RX_POWER) / 10_000.0;

    OpticalReadings {
        temperature: Some(temperature),
        voltage: Some(voltage),
        tx_bias: Some(tx_bias),
        tx_power: dbm(tx_mw),
        rx_power: dbm(rx_mw),
    }
}

/// Decodes the vendor identity strings from a page 0x50 hex dump.
///
/// Short or malformed pages yield empty strings; invalid bytes inside the
/// string ranges are dropped.
#[must_use]
pub fn parse_vendor(segment: &str) -> VendorIdentity {
    let Some(page) = decode_hex_page(segment) else {
        return VendorIdentity::default();
    };

    let text = |range: std::ops::Range<usize>| -> String {
        page.get(range)
            .map(|bytes| String::from_utf8_lossy(bytes).replace('\u{fffd}', ""))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    VendorIdentity {
        name: text(VENDOR_NAME),
        part_number: text(VENDOR_PART_NUMBER),
        revision: text(VENDOR_REVISION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_page(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    #[test]
    fn test_dbm_fixed_points() {
        assert_eq!(dbm(1.0), Some(0.0));
        assert_eq!(dbm(10.0), Some(10.0));
        assert_eq!(dbm(0.0), None);
        assert_eq!(dbm(-0.5), None);
    }

    #[test]
    fn test_zero_page_yields_zero_values_and_no_dbm() {
        let readings = parse_diagnostics(&hex_page(&[0u8; 106]));
        assert_eq!(readings.temperature, Some(0.0));
        assert_eq!(readings.voltage, Some(0.0));
        assert_eq!(readings.tx_bias, Some(0.0));
        // 0 mW has no dBm representation
        assert_eq!(readings.tx_power, None);
        assert_eq!(readings.rx_power, None);
    }

    #[test]
    fn test_short_page_is_fully_unavailable() {
        let readings = parse_diagnostics(&hex_page(&[0u8; 105]));
        assert_eq!(readings, OpticalReadings::unavailable());
    }

    #[test]
    fn test_empty_and_invalid_input() {
        assert_eq!(parse_diagnostics(""), OpticalReadings::unavailable());
        assert_eq!(parse_diagnostics("zz-not-hex"), OpticalReadings::unavailable());
    }

    #[test]
    fn test_diagnostic_scaling() {
        let mut page = [0u8; 106];
        page[96] = 45; // 45.5 C
        page[97] = 128;
        page[98] = 0x80; // 0x8000 / 10000 = 3.2768 V
        page[99] = 0x00;
        page[100] = 0x0B; // 0x0BB8 / 500 = 6.0 mA
        page[101] = 0xB8;
        page[102] = 0x27; // 0x2710 / 10000 = 1.0 mW -> 0 dBm
        page[103] = 0x10;
        page[104] = 0x03; // 0x03E8 / 10000 = 0.1 mW -> -10 dBm
        page[105] = 0xE8;

        let readings = parse_diagnostics(&hex_page(&page));
        assert_eq!(readings.temperature, Some(45.5));
        assert_eq!(readings.voltage, Some(3.2768));
        assert_eq!(readings.tx_bias, Some(6.0));
        assert_eq!(readings.tx_power, Some(0.0));
        assert_eq!(readings.rx_power, Some(-10.0));
    }

    #[test]
    fn test_hex_dump_with_line_breaks() {
        let page = [0u8; 106];
        let dump = hex_page(&page)
            .as_bytes()
            .chunks(32)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(parse_diagnostics(&dump).temperature.is_some());
    }

    #[test]
    fn test_vendor_identity_slices() {
        let mut page = [0x20u8; 96]; // ASCII spaces
        page[20..26].copy_from_slice(b"ACMEco");
        page[40..48].copy_from_slice(b"SFP-8311");
        page[56..59].copy_from_slice(b"1.2");
        let identity = parse_vendor(&hex_page(&page));
        assert_eq!(identity.name, "ACMEco");
        assert_eq!(identity.part_number, "SFP-8311");
        assert_eq!(identity.revision, "1.2");
    }

    #[test]
    fn test_vendor_identity_short_page() {
        let identity = parse_vendor(&hex_page(&[0x41u8; 10]));
        assert_eq!(identity, VendorIdentity::default());
        assert_eq!(parse_vendor(""), VendorIdentity::default());
    }
}
