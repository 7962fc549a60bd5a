//! Property-based tests for the batch split protocol
//!
//! Checks that splitting the combined output of a well-formed batch always
//! recovers exactly one segment per command, and that truncation or
//! boundary leakage is always detected.

use onumon_core::batch::{BATCH_COMMANDS, BOUNDARY, batch_command, split};
use onumon_core::error::FetchError;
use proptest::prelude::*;

/// Strategy for one command's output: arbitrary printable text that does
/// not contain the boundary line.
fn arb_segment_output() -> impl Strategy<Value = String> {
    "[ -~\n]{0,80}".prop_filter("must not contain boundary", |s| !s.contains(BOUNDARY))
}

/// Strategy for a full cycle's worth of per-command outputs.
fn arb_cycle_outputs() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_segment_output(), BATCH_COMMANDS.len())
}

/// Simulates the device side of the protocol: each command's output
/// followed by the echoed boundary line, except after the last command.
fn simulate_device_output(outputs: &[String]) -> String {
    outputs.join(&format!("\n{BOUNDARY}\n"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Splitting well-formed output always yields one segment per command,
    /// each equal to that command's trimmed output.
    #[test]
    fn prop_split_recovers_every_segment(outputs in arb_cycle_outputs()) {
        let raw = simulate_device_output(&outputs);
        let segments = split(&raw, BOUNDARY, BATCH_COMMANDS.len()).unwrap();

        prop_assert_eq!(segments.len(), BATCH_COMMANDS.len());
        for (segment, output) in segments.iter().zip(&outputs) {
            prop_assert_eq!(segment.as_str(), output.trim());
        }
    }

    /// Dropping any one boundary (a truncated batch) is always detected.
    #[test]
    fn prop_split_detects_truncation(
        outputs in arb_cycle_outputs(),
        drop_at in 0..BATCH_COMMANDS.len() - 1,
    ) {
        let raw = simulate_device_output(&outputs);
        let truncated = raw
            .match_indices(BOUNDARY)
            .nth(drop_at)
            .map(|(pos, _)| format!("{}{}", &raw[..pos], &raw[pos + BOUNDARY.len()..]))
            .unwrap();

        let err = split(&truncated, BOUNDARY, BATCH_COMMANDS.len()).unwrap_err();
        prop_assert!(
            matches!(
                err,
                FetchError::SegmentCountMismatch { actual, .. }
                    if actual == BATCH_COMMANDS.len() - 1
            ),
            "expected SegmentCountMismatch with actual == {}, got {:?}",
            BATCH_COMMANDS.len() - 1,
            err
        );
    }

    /// A boundary leaking into some command's output is always detected.
    #[test]
    fn prop_split_detects_leakage(
        outputs in arb_cycle_outputs(),
        leak_at in 0..BATCH_COMMANDS.len(),
    ) {
        let mut outputs = outputs;
        outputs[leak_at] = format!("noise\n{BOUNDARY}\nmore");
        let raw = simulate_device_output(&outputs);

        let err = split(&raw, BOUNDARY, BATCH_COMMANDS.len()).unwrap_err();
        prop_assert!(
            matches!(
                err,
                FetchError::SegmentCountMismatch { actual, .. }
                    if actual == BATCH_COMMANDS.len() + 1
            ),
            "expected SegmentCountMismatch with actual == {}, got {:?}",
            BATCH_COMMANDS.len() + 1,
            err
        );
    }
}

#[test]
fn test_batch_command_boundary_count() {
    let command = batch_command();
    assert_eq!(command.matches(BOUNDARY).count(), BATCH_COMMANDS.len() - 1);
}
