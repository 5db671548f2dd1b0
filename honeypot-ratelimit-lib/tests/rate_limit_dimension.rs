mod helpers;

use std::time::Duration;

use helpers::{dimension, MetricsHarness, TestResult};
use honeypot_ratelimit_lib::security::rate_limit::{
    DimensionConfig, DimensionKind, RateDimension, Verdict, MAX_SLOTS,
};
use honeypot_ratelimit_lib::RateLimitError;

fn identity_dimension(harness: &MetricsHarness, config: DimensionConfig) -> TestResult<RateDimension> {
    Ok(RateDimension::new(
        DimensionKind::Identity,
        config,
        harness.metrics.tracked_keys(DimensionKind::Identity),
    )?)
}

#[test]
fn test_key_decays_after_exactly_one_window() -> TestResult {
    let harness = MetricsHarness::new()?;
    let dim = identity_dimension(&harness, dimension(4, 1, 100, 100))?;
    assert_eq!(dim.slots(), 4);

    assert_eq!(dim.evaluate("k"), Verdict::Allowed);
    assert_eq!(dim.evaluate("k"), Verdict::Allowed);

    for remaining in (1..4).rev() {
        assert_eq!(dim.advance(), 0);
        assert_eq!(dim.window_count("k"), Some(2), "{remaining} slots still hold history");
    }

    assert_eq!(dim.advance(), 1);
    assert!(!dim.contains_key("k"));
    assert_eq!(dim.window_count("k"), None);
    assert_eq!(dim.tracked_keys(), 0);
    Ok(())
}

#[test]
fn test_history_slides_out_slot_by_slot() -> TestResult {
    let harness = MetricsHarness::new()?;
    let dim = identity_dimension(&harness, dimension(3, 1, 100, 100))?;

    dim.evaluate("k");
    dim.advance();
    dim.evaluate("k");
    dim.evaluate("k");
    dim.advance();
    dim.evaluate("k");
    assert_eq!(dim.window_count("k"), Some(4));

    // The first slot falls out, then the two-request slot.
    dim.advance();
    assert_eq!(dim.window_count("k"), Some(3));
    dim.advance();
    assert_eq!(dim.window_count("k"), Some(1));
    dim.advance();
    assert_eq!(dim.window_count("k"), None);
    Ok(())
}

#[test]
fn test_slot_limit_resets_on_advance() -> TestResult {
    let harness = MetricsHarness::new()?;
    let dim = identity_dimension(&harness, dimension(10, 1, 100, 1))?;

    assert_eq!(dim.evaluate("k"), Verdict::Allowed);
    assert_eq!(dim.evaluate("k"), Verdict::SlotLimitExceeded);
    dim.advance();
    assert_eq!(dim.evaluate("k"), Verdict::Allowed);
    Ok(())
}

#[test]
fn test_gauge_follows_tracked_keys() -> TestResult {
    let harness = MetricsHarness::new()?;
    let dim = identity_dimension(&harness, dimension(2, 1, 100, 100))?;

    dim.evaluate("a");
    dim.evaluate("b");
    dim.evaluate("b");
    assert_eq!(dim.tracked_keys(), 2);
    assert_eq!(harness.identity_keys(), 2.0);

    dim.advance();
    dim.evaluate("a");
    dim.advance();
    // "b" went idle one slot earlier than "a".
    assert_eq!(dim.tracked_keys(), 1);
    assert_eq!(harness.identity_keys(), 1.0);

    dim.advance();
    assert_eq!(dim.tracked_keys(), 0);
    assert_eq!(harness.identity_keys(), 0.0);
    assert_eq!(harness.content_keys(), 0.0);
    Ok(())
}

#[test]
fn test_advance_on_empty_dimension_is_noop() -> TestResult {
    let harness = MetricsHarness::new()?;
    let dim = identity_dimension(&harness, dimension(2, 1, 1, 1))?;

    assert_eq!(dim.advance(), 0);
    assert_eq!(dim.tracked_keys(), 0);
    Ok(())
}

#[test]
fn test_single_slot_window() -> TestResult {
    let harness = MetricsHarness::new()?;
    let dim = identity_dimension(&harness, dimension(1, 1, 2, 5))?;
    assert_eq!(dim.slots(), 1);

    assert_eq!(dim.evaluate("k"), Verdict::Allowed);
    assert_eq!(dim.evaluate("k"), Verdict::Allowed);
    assert_eq!(dim.evaluate("k"), Verdict::WindowLimitExceeded);
    assert_eq!(dim.advance(), 1);
    assert_eq!(dim.evaluate("k"), Verdict::Allowed);
    Ok(())
}

#[test]
fn test_slot_count_validation() {
    let ok = dimension(3600, 60, 10, 10);
    assert!(matches!(ok.slot_count(DimensionKind::Identity), Ok(60)));

    let sub_second = DimensionConfig {
        window: Duration::from_millis(1500),
        slot: Duration::from_millis(500),
        max_per_window: 1,
        max_per_slot: 1,
    };
    assert!(matches!(sub_second.slot_count(DimensionKind::Content), Ok(3)));

    for bad in [dimension(0, 1, 1, 1), dimension(10, 0, 1, 1), dimension(10, 3, 1, 1)] {
        assert!(matches!(
            bad.slot_count(DimensionKind::Content),
            Err(RateLimitError::InvalidWindow { dimension: "content", .. })
        ));
    }

    assert!(matches!(
        dimension(10, 1, 1, 0).slot_count(DimensionKind::Identity),
        Err(RateLimitError::Config(ref msg)) if msg.contains("max_per_slot")
    ));
}

#[test]
fn test_slot_count_ceiling() {
    let max_window = u64::try_from(MAX_SLOTS).unwrap_or(u64::MAX);

    assert!(matches!(
        dimension(max_window, 1, 1, 1).slot_count(DimensionKind::Identity),
        Ok(slots) if slots == MAX_SLOTS
    ));
    assert!(matches!(
        dimension(max_window + 1, 1, 1, 1).slot_count(DimensionKind::Identity),
        Err(RateLimitError::Config(ref msg)) if msg.contains("too many slots")
    ));
    assert!(matches!(
        dimension(1 << 40, 1, 1, 1).slot_count(DimensionKind::Content),
        Err(RateLimitError::Config(_))
    ));
}
