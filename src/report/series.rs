//! Derived scalars and series over the payload's monthly cost data.
//!
//! Pure arithmetic. A null month contributes nothing to a sum but is never
//! rewritten to zero in a series; division by a degenerate total yields the
//! `"0,0"` sentinel instead of letting NaN or infinity reach the report.

use crate::locale;
use crate::payload::ContractsComparisonTotals;

/// Sums a monthly series, skipping unavailable months.
pub fn sum_ignoring_gaps(series: &[Option<f64>]) -> f64 {
    series.iter().flatten().sum()
}

/// Share of `scenario_total` covered by `category`, as a pt-BR label with 1
/// decimal (`"66,0"`). The total must belong to the same scenario as the
/// category series; a zero, negative, or non-finite total yields `"0,0"`.
pub fn percentage_of_total(category: &[Option<f64>], scenario_total: f64) -> String {
    if !scenario_total.is_finite() || scenario_total <= 0.0 {
        return "0,0".to_string();
    }
    let share = sum_ignoring_gaps(category) / scenario_total * 100.0;
    locale::format_percent_1(share)
}

/// The pre-computed savings percentage, formatted only (`"10,68"`).
pub fn nominal_savings_label(percentage: f64) -> String {
    locale::format_decimal_2(percentage)
}

pub fn absolute_difference_label(totals: &ContractsComparisonTotals) -> String {
    locale::format_brl(totals.absolute_difference)
}

/// Adds peak and off-peak into one combined series for green-mode charts.
/// An index stays `None` only when both inputs are unavailable there.
pub fn combine_additive(peak: &[Option<f64>], off_peak: &[Option<f64>]) -> Vec<Option<f64>> {
    peak.iter()
        .zip(off_peak)
        .map(|(p, o)| match (p, o) {
            (None, None) => None,
            _ => Some(p.unwrap_or(0.0) + o.unwrap_or(0.0)),
        })
        .collect()
}

/// Collapses peak and off-peak measured demand into one series for
/// green-mode charts. Demand is a power level, not a volume, so the combined
/// value is the larger of the two windows rather than their sum.
pub fn combine_peak_demand(peak: &[Option<f64>], off_peak: &[Option<f64>]) -> Vec<Option<f64>> {
    peak.iter()
        .zip(off_peak)
        .map(|(p, o)| match (p, o) {
            (None, None) => None,
            (Some(p), Some(o)) => Some(p.max(*o)),
            (Some(v), None) | (None, Some(v)) => Some(*v),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        combine_additive, combine_peak_demand, nominal_savings_label, percentage_of_total,
        sum_ignoring_gaps,
    };

    #[test]
    fn percentage_matches_dashboard_example() {
        let category = [Some(44528.33), Some(53256.95)];
        let total = 69752.33 + 78480.95;
        assert_eq!(percentage_of_total(&category, total), "66,0");
    }

    #[test]
    fn all_null_series_yields_zero_sentinel() {
        let category: [Option<f64>; 12] = [None; 12];
        assert_eq!(percentage_of_total(&category, 1000.0), "0,0");
    }

    #[test]
    fn degenerate_totals_yield_zero_sentinel() {
        let category = [Some(10.0), Some(20.0)];
        assert_eq!(percentage_of_total(&category, 0.0), "0,0");
        assert_eq!(percentage_of_total(&category, -5.0), "0,0");
        assert_eq!(percentage_of_total(&category, f64::NAN), "0,0");
        assert_eq!(percentage_of_total(&category, f64::INFINITY), "0,0");
    }

    #[test]
    fn sums_skip_unavailable_months() {
        let series = [Some(1.5), None, Some(2.5), None];
        assert_eq!(sum_ignoring_gaps(&series), 4.0);
    }

    #[test]
    fn additive_combination_keeps_shared_gaps() {
        let peak = [Some(10.0), None, None];
        let off_peak = [Some(40.0), Some(5.0), None];
        assert_eq!(
            combine_additive(&peak, &off_peak),
            vec![Some(50.0), Some(5.0), None]
        );
    }

    #[test]
    fn demand_combination_takes_the_larger_window() {
        let peak = [Some(310.0), None, None];
        let off_peak = [Some(360.0), Some(350.0), None];
        assert_eq!(
            combine_peak_demand(&peak, &off_peak),
            vec![Some(360.0), Some(350.0), None]
        );
    }

    #[test]
    fn savings_label_has_two_decimals_and_comma() {
        assert_eq!(nominal_savings_label(10.68), "10,68");
        assert_eq!(nominal_savings_label(7.0), "7,00");
    }
}
