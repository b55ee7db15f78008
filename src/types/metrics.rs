use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Totals for one priced section, rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    /// Subtotal per item category, in category order.
    pub per_category: BTreeMap<String, f64>,
}

/// Time until cumulative savings cover the investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "months")]
pub enum Payback {
    Months(u32),
    /// No savings: the investment is never recovered.
    Never,
}

impl Payback {
    pub fn months(self) -> Option<u32> {
        match self {
            Self::Months(months) => Some(months),
            Self::Never => None,
        }
    }
}

/// Result of the bounded Newton-Raphson IRR iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrEstimate {
    /// Last iterate as a percentage; `None` when it is not a finite number.
    pub rate_pct: Option<f64>,
    /// Whether |NPV| dropped below the tolerance.
    pub converged: bool,
    pub iterations: u32,
}

/// One year of the cumulative ROI projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearProjection {
    pub year: u32,
    pub cumulative_savings: f64,
    pub net_position: f64,
    /// `None` when the investment is zero.
    pub roi_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiMetrics {
    pub payback: Payback,
    /// `None` when the investment is zero.
    pub roi_year1_pct: Option<f64>,
    pub net_present_value: f64,
    pub internal_rate_of_return: IrrEstimate,
    pub yearly_projection: Vec<YearProjection>,
}

/// Everything computed from a snapshot. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub quotation: SectionTotals,
    pub access_control: SectionTotals,
    /// Value of the infrastructure being replaced.
    pub current_investment: f64,
    pub annual_savings: f64,
    /// Quotation plus access-control subtotals, before tax.
    pub total_investment: f64,
    pub roi: RoiMetrics,
    pub analog_cameras: u32,
    pub ip_cameras: u32,
    /// Percentage fewer cameras after migration; 0 without analog cameras.
    pub camera_reduction_pct: i64,
}
