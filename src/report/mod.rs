//! Report view models.
//!
//! Everything the detailed-analysis report renders is derived here, once,
//! from a single immutable payload snapshot. Rendering layers (terminal
//! tables, JSON API) only format what these types already contain.

pub mod assembler;
pub mod axis;
pub mod charts;
pub mod series;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issues::RoutedIssue;
use crate::payload::TariffMode;
use crate::report::charts::ChartSeries;

/// Terminal state of one assembled report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    /// Errors gate the comparison; only the current-state view renders.
    SummaryOnly,
    /// Current and recommended contracts render side by side.
    FullComparison,
}

/// Lifecycle of the report for the selected consumer unit. Entered at
/// `Loading` on every selection, leaves it exactly once per fetch.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "phase", content = "detail")]
pub enum ReportPhase {
    Loading,
    /// The fetch itself failed. Distinct from `Loading` and from payload
    /// business errors, which produce a `Ready` summary-only report.
    FetchFailed { reason: String },
    Ready(Box<ReportViewModel>),
}

/// A contract with every display quantity pre-formatted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContractView {
    pub university: String,
    pub distributor: String,
    pub consumer_unit: String,
    pub supply_voltage_label: String,
    pub tariff_mode: TariffMode,
    pub tariff_mode_label: String,
    pub subgroup: String,
    pub peak_demand_label: String,
    pub off_peak_demand_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub category: String,
    pub current_label: String,
    /// Share of the current scenario's grand total, e.g. `"66,0"`.
    pub current_share: String,
    pub recommended_label: String,
    pub recommended_share: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonRow>,
    pub total_current_label: String,
    pub total_recommended_label: String,
    pub absolute_difference_label: String,
    pub nominal_savings_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TariffRowView {
    pub label: String,
    pub billing_time: String,
    pub blue_label: String,
    pub green_label: String,
}

/// The full detailed-analysis view model.
///
/// Recommendation-side fields are `None` whenever the payload carries
/// errors, even if the raw payload includes a recommended contract.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportViewModel {
    pub generated_on: DateTime<Utc>,
    pub state: ReportState,
    pub has_errors: bool,
    pub has_warnings: bool,
    pub has_recommendation: bool,
    pub has_minimum_energy_bills: bool,
    pub has_ideal_energy_bills: bool,
    pub energy_bills_count: u32,
    pub date_axis: Vec<(String, String)>,
    pub issues: Vec<RoutedIssue>,
    pub current_contract: ContractView,
    pub recommended_contract: Option<ContractView>,
    pub consumption_chart: Vec<ChartSeries>,
    pub demand_chart: Vec<ChartSeries>,
    pub current_costs_chart: Vec<ChartSeries>,
    pub costs_comparison_chart: Option<Vec<ChartSeries>>,
    pub detailed_comparison_chart: Option<Vec<ChartSeries>>,
    pub comparison_table: Option<ComparisonTable>,
    pub meets_renovation_threshold: Option<bool>,
    pub tariffs_table: Vec<TariffRowView>,
}

impl ReportViewModel {
    /// The current-state subset: what still renders when errors suppress
    /// the comparison.
    pub fn summary(&self) -> SummaryView {
        SummaryView {
            generated_on: self.generated_on,
            state: self.state,
            energy_bills_count: self.energy_bills_count,
            has_minimum_energy_bills: self.has_minimum_energy_bills,
            current_contract: self.current_contract.clone(),
            date_axis: self.date_axis.clone(),
            issues: self.issues.clone(),
            consumption_chart: self.consumption_chart.clone(),
            demand_chart: self.demand_chart.clone(),
            current_costs_chart: self.current_costs_chart.clone(),
        }
    }
}

/// Current-state-only view.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub generated_on: DateTime<Utc>,
    pub state: ReportState,
    pub energy_bills_count: u32,
    pub has_minimum_energy_bills: bool,
    pub current_contract: ContractView,
    pub date_axis: Vec<(String, String)>,
    pub issues: Vec<RoutedIssue>,
    pub consumption_chart: Vec<ChartSeries>,
    pub demand_chart: Vec<ChartSeries>,
    pub current_costs_chart: Vec<ChartSeries>,
}
