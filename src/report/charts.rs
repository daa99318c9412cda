//! Chart dataset assembly.
//!
//! One dispatch on the tariff mode decides whether a metric renders as a
//! single combined series (green) or as a peak / off-peak pair (blue); every
//! chart component consumes the result instead of re-branching on the mode.
//! Series stay aligned with the shared date axis and nulls pass through so
//! the charting layer renders gaps instead of interpolating.

use serde::{Deserialize, Serialize};

use crate::payload::{RecommendationPayload, TariffMode};
use crate::report::series::{combine_additive, combine_peak_demand};

/// Fixed display palette. Colors are assigned by role, not derived.
pub mod palette {
    pub const CONSUMPTION: &str = "#0060B1";
    pub const PEAK: &str = "#EE8F84";
    pub const OFF_PEAK: &str = "#0E438C";
    pub const CONTRACTED: &str = "#008940";
    pub const CONTRACTED_PEAK: &str = "#B31B0A";
    pub const CONTRACTED_OFF_PEAK: &str = "#FB736C";
    pub const CURRENT_TOTAL: &str = "#B31B0A";
    pub const RECOMMENDED_TOTAL: &str = "#008940";
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PointStyle {
    Circle,
    Triangle,
    Rect,
}

/// Which plot of the payload to assemble.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    Consumption,
    MeasuredDemand,
    CurrentCosts,
    CostsComparison,
    DetailedCostsComparison,
}

/// One renderable series: label, aligned data (nulls preserved), and the
/// fixed visual attributes the charting layer needs.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub kind: SeriesKind,
    pub data: Vec<Option<f64>>,
    pub color: &'static str,
    pub point_style: PointStyle,
    pub stack: Option<&'static str>,
}

impl ChartSeries {
    fn bar(label: &str, data: Vec<Option<f64>>, color: &'static str) -> Self {
        Self {
            label: label.to_string(),
            kind: SeriesKind::Bar,
            data,
            color,
            point_style: PointStyle::Rect,
            stack: None,
        }
    }

    fn stacked_bar(
        label: &str,
        data: Vec<Option<f64>>,
        color: &'static str,
        stack: &'static str,
    ) -> Self {
        Self {
            stack: Some(stack),
            ..Self::bar(label, data, color)
        }
    }

    /// A contracted-demand reference line: the contract value repeated once
    /// per month, overlaid atop the measured bars.
    fn reference_line(label: &str, value: f64, months: usize, color: &'static str) -> Self {
        Self {
            label: label.to_string(),
            kind: SeriesKind::Line,
            data: vec![Some(value); months],
            color,
            point_style: PointStyle::Circle,
            stack: None,
        }
    }
}

/// Assembles the ordered series list for one chart. The order is stable and
/// reference lines always precede the bars they overlay.
pub fn assemble_datasets(
    mode: TariffMode,
    metric: ChartMetric,
    payload: &RecommendationPayload,
) -> Vec<ChartSeries> {
    let months = payload.dates.len();
    let history = &payload.consumption_history_plot;
    match metric {
        ChartMetric::Consumption => match mode {
            TariffMode::Green => vec![ChartSeries::bar(
                "Consumo",
                combine_additive(
                    &history.peak_consumption_in_kwh,
                    &history.off_peak_consumption_in_kwh,
                ),
                palette::CONSUMPTION,
            )],
            TariffMode::Blue => vec![
                ChartSeries::stacked_bar(
                    "Consumo Ponta",
                    history.peak_consumption_in_kwh.clone(),
                    palette::PEAK,
                    "consumo",
                ),
                ChartSeries::stacked_bar(
                    "Consumo Fora Ponta",
                    history.off_peak_consumption_in_kwh.clone(),
                    palette::OFF_PEAK,
                    "consumo",
                ),
            ],
        },
        ChartMetric::MeasuredDemand => {
            let contract = &payload.current_contract;
            match mode {
                TariffMode::Green => vec![
                    ChartSeries::reference_line(
                        "Demanda Contratada",
                        contract.peak_contracted_demand_in_kw,
                        months,
                        palette::CONTRACTED,
                    ),
                    ChartSeries::bar(
                        "Demanda Medida",
                        combine_peak_demand(
                            &history.peak_measured_demand_in_kw,
                            &history.off_peak_measured_demand_in_kw,
                        ),
                        palette::CONSUMPTION,
                    ),
                ],
                TariffMode::Blue => vec![
                    ChartSeries::reference_line(
                        "Demanda Contratada Ponta",
                        contract.peak_contracted_demand_in_kw,
                        months,
                        palette::CONTRACTED_PEAK,
                    ),
                    ChartSeries::reference_line(
                        "Demanda Contratada Fora Ponta",
                        contract.off_peak_contracted_demand_in_kw,
                        months,
                        palette::CONTRACTED_OFF_PEAK,
                    ),
                    ChartSeries::bar(
                        "Demanda Medida Ponta",
                        history.peak_measured_demand_in_kw.clone(),
                        palette::PEAK,
                    ),
                    ChartSeries::bar(
                        "Demanda Medida Fora Ponta",
                        history.off_peak_measured_demand_in_kw.clone(),
                        palette::OFF_PEAK,
                    ),
                ],
            }
        }
        ChartMetric::CurrentCosts => {
            let costs = &payload.current_contract_costs_plot;
            vec![
                ChartSeries::stacked_bar(
                    "Valor de Consumo",
                    costs.consumption_cost_in_reais.clone(),
                    palette::CONSUMPTION,
                    "atual",
                ),
                ChartSeries::stacked_bar(
                    "Valor de Demanda",
                    costs.demand_cost_in_reais.clone(),
                    palette::OFF_PEAK,
                    "atual",
                ),
            ]
        }
        ChartMetric::CostsComparison => {
            let plot = &payload.costs_comparison_plot;
            vec![
                ChartSeries::bar(
                    "Contrato Atual",
                    plot.total_cost_in_reais_in_current.clone(),
                    palette::CURRENT_TOTAL,
                ),
                ChartSeries::bar(
                    "Contrato Proposto",
                    plot.total_cost_in_reais_in_recommended.clone(),
                    palette::RECOMMENDED_TOTAL,
                ),
            ]
        }
        ChartMetric::DetailedCostsComparison => {
            let plot = &payload.detailed_contracts_costs_comparison_plot;
            vec![
                ChartSeries::stacked_bar(
                    "Consumo Atual",
                    plot.consumption_cost_in_reais_in_current.clone(),
                    palette::CURRENT_TOTAL,
                    "atual",
                ),
                ChartSeries::stacked_bar(
                    "Demanda Atual",
                    plot.demand_cost_in_reais_in_current.clone(),
                    palette::PEAK,
                    "atual",
                ),
                ChartSeries::stacked_bar(
                    "Consumo Proposto",
                    plot.consumption_cost_in_reais_in_recommended.clone(),
                    palette::RECOMMENDED_TOTAL,
                    "proposto",
                ),
                ChartSeries::stacked_bar(
                    "Demanda Proposta",
                    plot.demand_cost_in_reais_in_recommended.clone(),
                    palette::CONTRACTED,
                    "proposto",
                ),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{assemble_datasets, ChartMetric, SeriesKind};
    use crate::payload::{RecommendationPayload, TariffMode};

    #[test]
    fn green_demand_is_reference_line_plus_measured_bar() {
        let payload = RecommendationPayload::sample();
        let series = assemble_datasets(TariffMode::Green, ChartMetric::MeasuredDemand, &payload);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].kind, SeriesKind::Line);
        assert_eq!(series[1].kind, SeriesKind::Bar);
        assert!(series[0].data.iter().all(|v| *v == Some(400.0)));
    }

    #[test]
    fn blue_demand_has_two_lines_and_two_bars() {
        let payload = RecommendationPayload::sample();
        let series = assemble_datasets(TariffMode::Blue, ChartMetric::MeasuredDemand, &payload);
        assert_eq!(series.len(), 4);
        let lines = series.iter().filter(|s| s.kind == SeriesKind::Line).count();
        let bars = series.iter().filter(|s| s.kind == SeriesKind::Bar).count();
        assert_eq!((lines, bars), (2, 2));
        assert!(series[2].label.ends_with("Ponta"));
        assert!(series[3].label.ends_with("Fora Ponta"));
    }

    #[test]
    fn green_consumption_is_one_combined_series() {
        let payload = RecommendationPayload::sample();
        let series = assemble_datasets(TariffMode::Green, ChartMetric::Consumption, &payload);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].data[0], Some(50_000.0));
    }

    #[test]
    fn nulls_pass_through_untouched() {
        let payload = RecommendationPayload::sample();
        for metric in [
            ChartMetric::Consumption,
            ChartMetric::MeasuredDemand,
            ChartMetric::CurrentCosts,
            ChartMetric::CostsComparison,
            ChartMetric::DetailedCostsComparison,
        ] {
            for series in assemble_datasets(TariffMode::Blue, metric, &payload) {
                assert_eq!(series.data.len(), payload.dates.len());
                if series.kind == SeriesKind::Bar {
                    assert_eq!(series.data[5], None, "{} lost its gap", series.label);
                }
            }
        }
    }
}
