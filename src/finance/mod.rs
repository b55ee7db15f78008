//! Derived monetary values.
//!
//! Everything here is a pure function of its inputs. Nothing is cached, so
//! a derived value can never go stale relative to the collections it reads.

mod roi;

use std::collections::BTreeMap;

pub use roi::{
    compute_roi_metrics, internal_rate_of_return, net_present_value, payback, IRR_INITIAL_GUESS,
    IRR_MAX_ITERATIONS, IRR_TOLERANCE,
};

use crate::config::RoiSettings;
use crate::error::ValidationError;
use crate::numfmt::round_cents;
use crate::types::{Collection, DerivedMetrics, LineItem, Location, ProposalSnapshot, SectionTotals};

/// Subtotal, tax and total of a collection, rounded to cents.
///
/// Tax is computed on the rounded subtotal and the total is the sum of the
/// two rounded values, so `subtotal + tax == total` holds exactly in cents.
pub fn compute_totals(items: &Collection<LineItem>, tax_rate: f64) -> SectionTotals {
    let mut raw_subtotal = 0.0;
    let mut raw_per_category: BTreeMap<String, f64> = BTreeMap::new();

    for item in items {
        let line = item.total();
        raw_subtotal += line;
        *raw_per_category.entry(item.category.clone()).or_insert(0.0) += line;
    }

    let subtotal = round_cents(raw_subtotal);
    let tax = round_cents(subtotal * tax_rate);
    SectionTotals {
        subtotal,
        tax,
        total: round_cents(subtotal + tax),
        per_category: raw_per_category
            .into_iter()
            .map(|(category, amount)| (category, round_cents(amount)))
            .collect(),
    }
}

/// Analog and IP camera counts across all locations.
pub fn camera_totals(locations: &Collection<Location>) -> (u32, u32) {
    locations.iter().fold((0u32, 0u32), |(analog, ip), location| {
        (
            analog.saturating_add(location.analog_camera_count),
            ip.saturating_add(location.ip_camera_count),
        )
    })
}

/// Percentage fewer cameras after migrating from analog to IP.
/// Zero when there are no analog cameras to compare against.
#[allow(clippy::cast_possible_truncation)]
pub fn camera_reduction_pct(analog: u32, ip: u32) -> i64 {
    if analog == 0 {
        return 0;
    }
    let pct = ((1.0 - f64::from(ip) / f64::from(analog)) * 100.0).round();
    // bounded by [-100 * u32::MAX, 100]
    pct as i64
}

/// How many times longer the new system retains footage.
/// `None` when the current retention is zero days.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn recording_improvement(current_days: u32, target_days: u32) -> Option<u32> {
    if current_days == 0 {
        return None;
    }
    // non-negative and at most u32::MAX
    Some((f64::from(target_days) / f64::from(current_days)).round() as u32)
}

/// Compute every derived metric of a snapshot.
pub fn derive_metrics(
    snapshot: &ProposalSnapshot,
    settings: &RoiSettings,
) -> Result<DerivedMetrics, ValidationError> {
    let quotation = compute_totals(&snapshot.quotation.items, snapshot.quotation.tax_rate);
    let access_control = compute_totals(
        &snapshot.access_control.items,
        snapshot.access_control.tax_rate,
    );
    let current_investment =
        compute_totals(&snapshot.current_state.infrastructure, 0.0).subtotal;
    let annual_savings = round_cents(snapshot.roi.iter().map(|item| item.annual_saving).sum());
    let total_investment = round_cents(quotation.subtotal + access_control.subtotal);

    let roi = compute_roi_metrics(
        total_investment,
        annual_savings,
        settings.years,
        settings.discount_rate,
    )?;
    let (analog_cameras, ip_cameras) = camera_totals(&snapshot.locations);

    Ok(DerivedMetrics {
        quotation,
        access_control,
        current_investment,
        annual_savings,
        total_investment,
        roi,
        analog_cameras,
        ip_cameras,
        camera_reduction_pct: camera_reduction_pct(analog_cameras, ip_cameras),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::{Draft, LineItemDraft};
    use test_case::test_case;

    fn items(lines: &[(&str, f64, f64)]) -> Collection<LineItem> {
        let mut collection = Collection::default();
        for &(category, quantity, unit_price) in lines {
            collection
                .add(LineItemDraft {
                    category: category.into(),
                    quantity,
                    unit_price,
                    ..LineItemDraft::default()
                })
                .unwrap();
        }
        collection
    }

    #[test]
    fn test_totals_cameras_and_ai_key() {
        let totals = compute_totals(&items(&[("CAM", 19.0, 249.08), ("IA", 1.0, 1389.0)]), 0.15);
        assert_eq!(totals.subtotal, 6121.52);
        assert_eq!(totals.tax, 918.23);
        assert_eq!(totals.total, 7039.75);
        assert_eq!(totals.per_category.get("CAM"), Some(&4732.52));
        assert_eq!(totals.per_category.get("IA"), Some(&1389.0));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let totals = compute_totals(&items(&[("X", 1.0, 6101.52)]), 0.15);
        assert_eq!(totals.subtotal, 6101.52);
        assert_eq!(totals.tax, 915.23);
        assert_eq!(totals.total, 7016.75);
    }

    #[test]
    fn test_totals_are_bit_identical_on_repeat() {
        let collection = items(&[
            ("A", 3.0, 10.10),
            ("B", 7.0, 0.33),
            ("A", 1.5, 99.99),
            ("C", 12.0, 4.07),
            ("B", 2.0, 1234.56),
        ]);
        let first = compute_totals(&collection, 0.12);
        let second = compute_totals(&collection, 0.12);
        assert_eq!(first.subtotal.to_bits(), second.subtotal.to_bits());
        assert_eq!(first.tax.to_bits(), second.tax.to_bits());
        assert_eq!(first.total.to_bits(), second.total.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_collection() {
        let totals = compute_totals(&Collection::default(), 0.15);
        assert_eq!(totals.total, 0.0);
        assert!(totals.per_category.is_empty());
    }

    #[test_case(117, 25, 79)]
    #[test_case(10, 10, 0)]
    #[test_case(0, 12, 0)]
    #[test_case(4, 6, -50)]
    fn test_camera_reduction(analog: u32, ip: u32, expected: i64) {
        assert_eq!(camera_reduction_pct(analog, ip), expected);
    }

    #[test]
    fn test_recording_improvement() {
        assert_eq!(recording_improvement(15, 365), Some(24));
        assert_eq!(recording_improvement(0, 365), None);
    }

    #[test]
    fn test_draft_defaults_are_valid() {
        assert!(LineItemDraft::default().validate().is_ok());
    }
}
