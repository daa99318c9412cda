//! Data model for the server-computed recommendation payload.
//!
//! The MEPA backend computes the whole contract recommendation (optimal
//! demand, tariff mode, monthly cost series) and delivers it as a single
//! JSON document. This crate never recomputes any of it; the types here are
//! a faithful, read-only view of that document. Monthly series use
//! `Option<f64>` so that a null month stays distinguishable from zero all
//! the way to the rendered report.

pub mod cache;
pub mod fetch;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::issues::Issue;

/// Every monthly series in one payload covers the same 12 months.
pub const MONTHS_IN_REPORT: usize = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TariffMode {
    /// Single demand tier.
    #[serde(rename = "G")]
    Green,
    /// Separate peak / off-peak contracted demand.
    #[serde(rename = "B")]
    Blue,
}

impl Display for TariffMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Green => "Verde",
            Self::Blue => "Azul",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown tariff mode: {0}")]
pub struct TariffModeParseError(pub String);

impl FromStr for TariffMode {
    type Err = TariffModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "g" | "green" | "verde" => Ok(Self::Green),
            "b" | "blue" | "azul" => Ok(Self::Blue),
            _ => Err(TariffModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationContract {
    pub university: String,
    pub distributor: String,
    pub consumer_unit: String,
    pub supply_voltage_in_kv: f64,
    pub tariff_mode: TariffMode,
    pub subgroup: String,
    pub peak_contracted_demand_in_kw: f64,
    pub off_peak_contracted_demand_in_kw: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionHistoryPlot {
    pub peak_consumption_in_kwh: Vec<Option<f64>>,
    pub off_peak_consumption_in_kwh: Vec<Option<f64>>,
    pub peak_measured_demand_in_kw: Vec<Option<f64>>,
    pub off_peak_measured_demand_in_kw: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentContractCostsPlot {
    pub consumption_cost_in_reais: Vec<Option<f64>>,
    pub demand_cost_in_reais: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailedContractsCostsComparisonPlot {
    pub consumption_cost_in_reais_in_current: Vec<Option<f64>>,
    pub demand_cost_in_reais_in_current: Vec<Option<f64>>,
    pub consumption_cost_in_reais_in_recommended: Vec<Option<f64>>,
    pub demand_cost_in_reais_in_recommended: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostsComparisonPlot {
    pub total_cost_in_reais_in_current: Vec<Option<f64>>,
    pub total_cost_in_reais_in_recommended: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContractsComparisonTotals {
    pub total_cost_in_reais_in_current: f64,
    pub total_cost_in_reais_in_recommended: f64,
    pub absolute_difference: f64,
    pub consumption_cost_in_reais_in_current: f64,
    pub consumption_cost_in_reais_in_recommended: f64,
    pub demand_cost_in_reais_in_current: f64,
    pub demand_cost_in_reais_in_recommended: f64,
}

/// One row of the blue-vs-green tariff cross-tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TariffRow {
    pub label: String,
    pub blue: Option<f64>,
    pub green: Option<f64>,
    pub billing_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPayload {
    pub generated_on: DateTime<Utc>,
    pub dates: Vec<String>,
    #[serde(default)]
    pub errors: Vec<Issue>,
    #[serde(default)]
    pub warnings: Vec<Issue>,
    pub current_contract: RecommendationContract,
    pub recommended_contract: Option<RecommendationContract>,
    pub consumption_history_plot: ConsumptionHistoryPlot,
    pub current_contract_costs_plot: CurrentContractCostsPlot,
    pub detailed_contracts_costs_comparison_plot: DetailedContractsCostsComparisonPlot,
    pub costs_comparison_plot: CostsComparisonPlot,
    pub contracts_comparison_totals: ContractsComparisonTotals,
    pub nominal_savings_percentage: f64,
    pub tariffs_table: Vec<TariffRow>,
    pub energy_bills_count: u32,
}

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("payload covers {actual} months, expected 12")]
    WrongMonthCount { actual: usize },
    #[error("series {series} has {actual} entries, expected {expected} to align with dates")]
    SeriesLength {
        series: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl RecommendationPayload {
    /// Checks the index-alignment invariant: every monthly series has the
    /// same length as `dates`, and the report covers exactly 12 months.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.dates.len() != MONTHS_IN_REPORT {
            return Err(PayloadError::WrongMonthCount {
                actual: self.dates.len(),
            });
        }
        let expected = self.dates.len();
        let history = &self.consumption_history_plot;
        let current = &self.current_contract_costs_plot;
        let detailed = &self.detailed_contracts_costs_comparison_plot;
        let comparison = &self.costs_comparison_plot;
        let series: [(&'static str, usize); 12] = [
            ("peakConsumptionInKwh", history.peak_consumption_in_kwh.len()),
            (
                "offPeakConsumptionInKwh",
                history.off_peak_consumption_in_kwh.len(),
            ),
            (
                "peakMeasuredDemandInKw",
                history.peak_measured_demand_in_kw.len(),
            ),
            (
                "offPeakMeasuredDemandInKw",
                history.off_peak_measured_demand_in_kw.len(),
            ),
            (
                "consumptionCostInReais",
                current.consumption_cost_in_reais.len(),
            ),
            ("demandCostInReais", current.demand_cost_in_reais.len()),
            (
                "consumptionCostInReaisInCurrent",
                detailed.consumption_cost_in_reais_in_current.len(),
            ),
            (
                "demandCostInReaisInCurrent",
                detailed.demand_cost_in_reais_in_current.len(),
            ),
            (
                "consumptionCostInReaisInRecommended",
                detailed.consumption_cost_in_reais_in_recommended.len(),
            ),
            (
                "demandCostInReaisInRecommended",
                detailed.demand_cost_in_reais_in_recommended.len(),
            ),
            (
                "totalCostInReaisInCurrent",
                comparison.total_cost_in_reais_in_current.len(),
            ),
            (
                "totalCostInReaisInRecommended",
                comparison.total_cost_in_reais_in_recommended.len(),
            ),
        ];
        for (name, actual) in series {
            if actual != expected {
                return Err(PayloadError::SeriesLength {
                    series: name,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// A complete, valid payload for one metered year. Used by tests and the
    /// config template docs.
    pub fn sample() -> Self {
        let dates = (1..=12).map(|m| format!("2023-{m:02}")).collect();
        let gap = |values: [f64; 12]| -> Vec<Option<f64>> {
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| if i == 5 { None } else { Some(v) })
                .collect()
        };
        Self {
            generated_on: Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap(),
            dates,
            errors: Vec::new(),
            warnings: Vec::new(),
            current_contract: RecommendationContract {
                university: "UnB".to_string(),
                distributor: "Neoenergia".to_string(),
                consumer_unit: "Campus Darcy Ribeiro".to_string(),
                supply_voltage_in_kv: 13.8,
                tariff_mode: TariffMode::Green,
                subgroup: "A4".to_string(),
                peak_contracted_demand_in_kw: 400.0,
                off_peak_contracted_demand_in_kw: 400.0,
            },
            recommended_contract: Some(RecommendationContract {
                university: "UnB".to_string(),
                distributor: "Neoenergia".to_string(),
                consumer_unit: "Campus Darcy Ribeiro".to_string(),
                supply_voltage_in_kv: 13.8,
                tariff_mode: TariffMode::Blue,
                subgroup: "A4".to_string(),
                peak_contracted_demand_in_kw: 320.0,
                off_peak_contracted_demand_in_kw: 380.0,
            }),
            consumption_history_plot: ConsumptionHistoryPlot {
                peak_consumption_in_kwh: gap([
                    9000.0, 9500.0, 8700.0, 9100.0, 8800.0, 0.0, 9300.0, 9600.0, 9200.0, 9400.0,
                    9100.0, 8900.0,
                ]),
                off_peak_consumption_in_kwh: gap([
                    41000.0, 42500.0, 39800.0, 40200.0, 41500.0, 0.0, 43000.0, 42800.0, 41900.0,
                    42100.0, 40800.0, 41200.0,
                ]),
                peak_measured_demand_in_kw: gap([
                    310.0, 325.0, 300.0, 315.0, 305.0, 0.0, 330.0, 335.0, 320.0, 328.0, 312.0,
                    308.0,
                ]),
                off_peak_measured_demand_in_kw: gap([
                    360.0, 372.0, 350.0, 365.0, 355.0, 0.0, 380.0, 385.0, 370.0, 377.0, 362.0,
                    358.0,
                ]),
            },
            current_contract_costs_plot: CurrentContractCostsPlot {
                consumption_cost_in_reais: gap([
                    30500.0, 31800.0, 29700.0, 30200.0, 31000.0, 0.0, 32100.0, 31900.0, 31200.0,
                    31500.0, 30400.0, 30800.0,
                ]),
                demand_cost_in_reais: gap([
                    11200.0, 11200.0, 11200.0, 11200.0, 11200.0, 0.0, 11200.0, 11200.0, 11200.0,
                    11200.0, 11200.0, 11200.0,
                ]),
            },
            detailed_contracts_costs_comparison_plot: DetailedContractsCostsComparisonPlot {
                consumption_cost_in_reais_in_current: gap([
                    30500.0, 31800.0, 29700.0, 30200.0, 31000.0, 0.0, 32100.0, 31900.0, 31200.0,
                    31500.0, 30400.0, 30800.0,
                ]),
                demand_cost_in_reais_in_current: gap([
                    11200.0, 11200.0, 11200.0, 11200.0, 11200.0, 0.0, 11200.0, 11200.0, 11200.0,
                    11200.0, 11200.0, 11200.0,
                ]),
                consumption_cost_in_reais_in_recommended: gap([
                    27400.0, 28600.0, 26700.0, 27200.0, 27900.0, 0.0, 28900.0, 28700.0, 28100.0,
                    28400.0, 27300.0, 27700.0,
                ]),
                demand_cost_in_reais_in_recommended: gap([
                    9800.0, 9800.0, 9800.0, 9800.0, 9800.0, 0.0, 9800.0, 9800.0, 9800.0, 9800.0,
                    9800.0, 9800.0,
                ]),
            },
            costs_comparison_plot: CostsComparisonPlot {
                total_cost_in_reais_in_current: gap([
                    41700.0, 43000.0, 40900.0, 41400.0, 42200.0, 0.0, 43300.0, 43100.0, 42400.0,
                    42700.0, 41600.0, 42000.0,
                ]),
                total_cost_in_reais_in_recommended: gap([
                    37200.0, 38400.0, 36500.0, 37000.0, 37700.0, 0.0, 38700.0, 38500.0, 37900.0,
                    38200.0, 37100.0, 37500.0,
                ]),
            },
            contracts_comparison_totals: ContractsComparisonTotals {
                total_cost_in_reais_in_current: 464_300.0,
                total_cost_in_reais_in_recommended: 414_700.0,
                absolute_difference: 49_600.0,
                consumption_cost_in_reais_in_current: 341_100.0,
                consumption_cost_in_reais_in_recommended: 306_900.0,
                demand_cost_in_reais_in_current: 123_200.0,
                demand_cost_in_reais_in_recommended: 107_800.0,
            },
            nominal_savings_percentage: 10.68,
            tariffs_table: vec![
                TariffRow {
                    label: "TUSD (R$/kW)".to_string(),
                    blue: Some(21.43),
                    green: None,
                    billing_time: "Ponta".to_string(),
                },
                TariffRow {
                    label: "TUSD (R$/kW)".to_string(),
                    blue: Some(9.85),
                    green: Some(9.85),
                    billing_time: "Fora Ponta".to_string(),
                },
                TariffRow {
                    label: "TUSD (R$/MWh)".to_string(),
                    blue: Some(101.77),
                    green: Some(1047.04),
                    billing_time: "Ponta".to_string(),
                },
                TariffRow {
                    label: "TUSD (R$/MWh)".to_string(),
                    blue: Some(101.77),
                    green: Some(101.77),
                    billing_time: "Fora Ponta".to_string(),
                },
                TariffRow {
                    label: "TE (R$/MWh)".to_string(),
                    blue: Some(413.03),
                    green: Some(413.03),
                    billing_time: "Ponta".to_string(),
                },
                TariffRow {
                    label: "TE (R$/MWh)".to_string(),
                    blue: Some(259.32),
                    green: Some(259.32),
                    billing_time: "Fora Ponta".to_string(),
                },
                TariffRow {
                    label: "Demanda (R$/kW)".to_string(),
                    blue: None,
                    green: Some(28.04),
                    billing_time: "NA".to_string(),
                },
            ],
            energy_bills_count: 11,
        }
    }
}

/// Thresholds the backend exposes for gating the detailed analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSettings {
    pub minimum_energy_bills_for_recommendation: u32,
    pub ideal_energy_bills_for_recommendation: u32,
    pub minimum_percentage_difference_for_contract_renovation: f64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            minimum_energy_bills_for_recommendation: 6,
            ideal_energy_bills_for_recommendation: 12,
            minimum_percentage_difference_for_contract_renovation: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PayloadError, RecommendationPayload, TariffMode};

    #[test]
    fn sample_payload_is_valid() {
        RecommendationPayload::sample()
            .validate()
            .expect("sample payload must satisfy its own invariants");
    }

    #[test]
    fn validate_rejects_misaligned_series() {
        let mut payload = RecommendationPayload::sample();
        payload
            .consumption_history_plot
            .peak_consumption_in_kwh
            .pop();
        assert_eq!(
            payload.validate(),
            Err(PayloadError::SeriesLength {
                series: "peakConsumptionInKwh",
                expected: 12,
                actual: 11,
            })
        );
    }

    #[test]
    fn validate_rejects_wrong_month_count() {
        let mut payload = RecommendationPayload::sample();
        payload.dates.pop();
        assert_eq!(
            payload.validate(),
            Err(PayloadError::WrongMonthCount { actual: 11 })
        );
    }

    #[test]
    fn serde_round_trip_preserves_nulls() {
        let payload = RecommendationPayload::sample();
        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(json.contains("\"tariffMode\":\"G\""));
        let back: RecommendationPayload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, payload);
        assert_eq!(back.consumption_history_plot.peak_consumption_in_kwh[5], None);
    }

    #[test]
    fn tariff_mode_parses_wire_and_human_names() {
        assert_eq!("G".parse::<TariffMode>().unwrap(), TariffMode::Green);
        assert_eq!("azul".parse::<TariffMode>().unwrap(), TariffMode::Blue);
        assert!("X".parse::<TariffMode>().is_err());
    }
}
