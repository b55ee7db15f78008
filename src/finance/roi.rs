//! Discounted-cash-flow metrics for an up-front investment followed by a
//! constant annual saving.

use crate::error::{ensure_non_negative, ValidationError};
use crate::numfmt::round_cents;
use crate::types::{IrrEstimate, Payback, RoiMetrics, YearProjection};

/// Starting rate of the IRR iteration.
pub const IRR_INITIAL_GUESS: f64 = 0.10;
/// The iteration stops once |NPV| falls below this amount.
pub const IRR_TOLERANCE: f64 = 0.01;
/// Upper bound on IRR iterations. Reaching it is a normal outcome.
pub const IRR_MAX_ITERATIONS: u32 = 100;

/// `-investment + Σ_{t=1..years} savings / (1 + rate)^t`.
pub fn net_present_value(investment: f64, annual_savings: f64, years: u32, rate: f64) -> f64 {
    let discounted: f64 = (1..=years)
        .map(|t| annual_savings / (1.0 + rate).powi(exponent(t)))
        .sum();
    discounted - investment
}

/// d(NPV)/d(rate).
fn npv_derivative(annual_savings: f64, years: u32, rate: f64) -> f64 {
    (1..=years)
        .map(|t| -f64::from(t) * annual_savings / (1.0 + rate).powi(exponent(t).saturating_add(1)))
        .sum()
}

fn exponent(t: u32) -> i32 {
    i32::try_from(t).unwrap_or(i32::MAX)
}

/// Newton-Raphson IRR from [`IRR_INITIAL_GUESS`].
///
/// Stops when |NPV| < [`IRR_TOLERANCE`], after [`IRR_MAX_ITERATIONS`], or as
/// soon as the derivative is zero or not finite. Only the first case sets
/// `converged`.
pub fn internal_rate_of_return(investment: f64, annual_savings: f64, years: u32) -> IrrEstimate {
    let mut rate = IRR_INITIAL_GUESS;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < IRR_MAX_ITERATIONS {
        let npv = net_present_value(investment, annual_savings, years, rate);
        if npv.abs() < IRR_TOLERANCE {
            converged = true;
            break;
        }
        let slope = npv_derivative(annual_savings, years, rate);
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let next = rate - npv / slope;
        iterations += 1;
        if !next.is_finite() {
            break;
        }
        rate = next;
    }

    if !converged && iterations == IRR_MAX_ITERATIONS {
        converged = net_present_value(investment, annual_savings, years, rate).abs() < IRR_TOLERANCE;
    }

    IrrEstimate {
        rate_pct: Some(rate * 100.0).filter(|pct| pct.is_finite()),
        converged,
        iterations,
    }
}

/// Whole months until cumulative savings cover the investment.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn payback(investment: f64, annual_savings: f64) -> Payback {
    if annual_savings <= 0.0 {
        return Payback::Never;
    }
    let months = (investment / (annual_savings / 12.0)).ceil();
    if months.is_finite() {
        // clamped to the u32 range before the cast
        Payback::Months(months.clamp(0.0, f64::from(u32::MAX)) as u32)
    } else {
        Payback::Never
    }
}

/// ROI analysis of `investment` against a constant `annual_savings` over
/// `years`, discounted at `discount_rate`.
///
/// Percentages relative to the investment are `None` when the investment
/// is zero.
pub fn compute_roi_metrics(
    investment: f64,
    annual_savings: f64,
    years: u32,
    discount_rate: f64,
) -> Result<RoiMetrics, ValidationError> {
    ensure_non_negative("totalInvestment", investment)?;
    ensure_non_negative("annualSavings", annual_savings)?;
    if !discount_rate.is_finite() {
        return Err(ValidationError::NonFinite {
            field: "discountRate",
        });
    }
    if discount_rate <= -1.0 {
        return Err(ValidationError::RateOutOfRange {
            field: "discountRate",
            value: discount_rate,
        });
    }

    let relative = |amount: f64| (investment > 0.0).then(|| amount / investment * 100.0);

    let yearly_projection = (1..=years)
        .map(|year| {
            let cumulative_savings = round_cents(annual_savings * f64::from(year));
            let net_position = round_cents(cumulative_savings - investment);
            YearProjection {
                year,
                cumulative_savings,
                net_position,
                roi_pct: relative(net_position),
            }
        })
        .collect();

    Ok(RoiMetrics {
        payback: payback(investment, annual_savings),
        roi_year1_pct: relative(annual_savings),
        net_present_value: round_cents(net_present_value(
            investment,
            annual_savings,
            years,
            discount_rate,
        )),
        internal_rate_of_return: internal_rate_of_return(investment, annual_savings, years),
        yearly_projection,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_payback_rounds_up_to_whole_months() {
        assert_eq!(payback(17_696.81, 73_000.0), Payback::Months(3));
        assert_eq!(payback(12_000.0, 12_000.0), Payback::Months(12));
        assert_eq!(payback(0.0, 5_000.0), Payback::Months(0));
    }

    #[test]
    fn test_no_savings_never_pays_back() {
        let metrics = compute_roi_metrics(10_000.0, 0.0, 5, 0.10).unwrap();
        assert_eq!(metrics.payback, Payback::Never);
        assert_eq!(metrics.roi_year1_pct, Some(0.0));
        assert!(!metrics.internal_rate_of_return.converged);
        assert!(metrics.net_present_value.is_finite());
    }

    #[test]
    fn test_npv_matches_closed_form() {
        // 1000/1.1 + 1000/1.21 = 1735.54 - 1000
        let npv = net_present_value(1000.0, 1000.0, 2, 0.10);
        assert!((npv - 735.537_190_082_644_6).abs() < 1e-9);
    }

    #[test]
    fn test_irr_converges_for_profitable_project() {
        let irr = internal_rate_of_return(17_696.81, 73_000.0, 5);
        assert!(irr.converged);
        let rate = irr.rate_pct.unwrap() / 100.0;
        assert!(net_present_value(17_696.81, 73_000.0, 5, rate).abs() < IRR_TOLERANCE);
        assert!(irr.iterations <= IRR_MAX_ITERATIONS);
    }

    #[test]
    fn test_irr_zero_derivative_stops_early() {
        let irr = internal_rate_of_return(500.0, 0.0, 5);
        assert!(!irr.converged);
        assert_eq!(irr.iterations, 0);
        assert!((irr.rate_pct.unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_yearly_projection() {
        let metrics = compute_roi_metrics(1000.0, 400.0, 3, 0.10).unwrap();
        let years = &metrics.yearly_projection;
        assert_eq!(years.len(), 3);
        assert_eq!(years[0].year, 1);
        assert_eq!(years[0].net_position, -600.0);
        assert_eq!(years[2].cumulative_savings, 1200.0);
        assert_eq!(years[2].roi_pct, Some(20.0));
    }

    #[test]
    fn test_zero_investment_has_no_percentages() {
        let metrics = compute_roi_metrics(0.0, 1000.0, 2, 0.10).unwrap();
        assert_eq!(metrics.roi_year1_pct, None);
        assert!(metrics.yearly_projection.iter().all(|y| y.roi_pct.is_none()));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(compute_roi_metrics(-1.0, 10.0, 5, 0.10).is_err());
        assert!(compute_roi_metrics(1.0, f64::NAN, 5, 0.10).is_err());
        assert!(compute_roi_metrics(1.0, 10.0, 5, -1.0).is_err());
    }
}
