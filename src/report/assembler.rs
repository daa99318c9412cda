//! Builds the full report view model from one payload snapshot.

use crate::issues::{route_issues, IssueSeverity};
use crate::locale;
use crate::payload::{
    RecommendationContract, RecommendationPayload, RecommendationSettings, TariffRow,
};
use crate::report::axis::build_date_axis;
use crate::report::charts::{assemble_datasets, ChartMetric};
use crate::report::series::{absolute_difference_label, nominal_savings_label, percentage_of_total};
use crate::report::{
    ComparisonRow, ComparisonTable, ContractView, ReportState, ReportViewModel, TariffRowView,
};

/// Derives every display quantity of the detailed-analysis report.
///
/// Payload errors suppress the whole recommendation side: the comparison
/// charts, the comparison table and the recommended contract stay `None`
/// even when the raw payload carries a `recommended_contract`.
pub fn build_report(
    payload: &RecommendationPayload,
    settings: &RecommendationSettings,
) -> ReportViewModel {
    let has_errors = !payload.errors.is_empty();
    let has_warnings = !payload.warnings.is_empty();
    let has_recommendation = payload.recommended_contract.is_some();
    let comparison_allowed = !has_errors && has_recommendation;

    let mode = payload.current_contract.tariff_mode;
    let mut issues = route_issues(IssueSeverity::Error, &payload.errors);
    issues.extend(route_issues(IssueSeverity::Warning, &payload.warnings));

    let (recommended_contract, costs_comparison_chart, detailed_comparison_chart) =
        if comparison_allowed {
            (
                payload.recommended_contract.as_ref().map(contract_view),
                Some(assemble_datasets(
                    mode,
                    ChartMetric::CostsComparison,
                    payload,
                )),
                Some(assemble_datasets(
                    mode,
                    ChartMetric::DetailedCostsComparison,
                    payload,
                )),
            )
        } else {
            (None, None, None)
        };

    let comparison_table = comparison_allowed.then(|| build_comparison_table(payload));
    let meets_renovation_threshold = comparison_allowed.then(|| {
        payload.nominal_savings_percentage
            >= settings.minimum_percentage_difference_for_contract_renovation
    });

    ReportViewModel {
        generated_on: payload.generated_on,
        state: if comparison_allowed {
            ReportState::FullComparison
        } else {
            ReportState::SummaryOnly
        },
        has_errors,
        has_warnings,
        has_recommendation,
        has_minimum_energy_bills: payload.energy_bills_count
            >= settings.minimum_energy_bills_for_recommendation,
        has_ideal_energy_bills: payload.energy_bills_count
            >= settings.ideal_energy_bills_for_recommendation,
        energy_bills_count: payload.energy_bills_count,
        date_axis: build_date_axis(&payload.dates),
        issues,
        current_contract: contract_view(&payload.current_contract),
        recommended_contract,
        consumption_chart: assemble_datasets(mode, ChartMetric::Consumption, payload),
        demand_chart: assemble_datasets(mode, ChartMetric::MeasuredDemand, payload),
        current_costs_chart: assemble_datasets(mode, ChartMetric::CurrentCosts, payload),
        costs_comparison_chart,
        detailed_comparison_chart,
        comparison_table,
        meets_renovation_threshold,
        tariffs_table: payload.tariffs_table.iter().map(tariff_row_view).collect(),
    }
}

pub fn contract_view(contract: &RecommendationContract) -> ContractView {
    ContractView {
        university: contract.university.clone(),
        distributor: contract.distributor.clone(),
        consumer_unit: contract.consumer_unit.clone(),
        supply_voltage_label: format!(
            "{} kV",
            locale::format_decimal_1(contract.supply_voltage_in_kv)
        ),
        tariff_mode: contract.tariff_mode,
        tariff_mode_label: contract.tariff_mode.to_string(),
        subgroup: contract.subgroup.clone(),
        peak_demand_label: format!(
            "{} kW",
            locale::format_decimal_2(contract.peak_contracted_demand_in_kw)
        ),
        off_peak_demand_label: format!(
            "{} kW",
            locale::format_decimal_2(contract.off_peak_contracted_demand_in_kw)
        ),
    }
}

fn build_comparison_table(payload: &RecommendationPayload) -> ComparisonTable {
    let totals = &payload.contracts_comparison_totals;
    let detailed = &payload.detailed_contracts_costs_comparison_plot;
    // Shares divide each category by the grand total of the SAME scenario.
    let rows = vec![
        ComparisonRow {
            category: "Consumo".to_string(),
            current_label: locale::format_brl(totals.consumption_cost_in_reais_in_current),
            current_share: percentage_of_total(
                &detailed.consumption_cost_in_reais_in_current,
                totals.total_cost_in_reais_in_current,
            ),
            recommended_label: locale::format_brl(totals.consumption_cost_in_reais_in_recommended),
            recommended_share: percentage_of_total(
                &detailed.consumption_cost_in_reais_in_recommended,
                totals.total_cost_in_reais_in_recommended,
            ),
        },
        ComparisonRow {
            category: "Demanda".to_string(),
            current_label: locale::format_brl(totals.demand_cost_in_reais_in_current),
            current_share: percentage_of_total(
                &detailed.demand_cost_in_reais_in_current,
                totals.total_cost_in_reais_in_current,
            ),
            recommended_label: locale::format_brl(totals.demand_cost_in_reais_in_recommended),
            recommended_share: percentage_of_total(
                &detailed.demand_cost_in_reais_in_recommended,
                totals.total_cost_in_reais_in_recommended,
            ),
        },
    ];
    ComparisonTable {
        rows,
        total_current_label: locale::format_brl(totals.total_cost_in_reais_in_current),
        total_recommended_label: locale::format_brl(totals.total_cost_in_reais_in_recommended),
        absolute_difference_label: absolute_difference_label(totals),
        nominal_savings_label: nominal_savings_label(payload.nominal_savings_percentage),
    }
}

fn tariff_row_view(row: &TariffRow) -> TariffRowView {
    let rate = |value: Option<f64>| {
        value
            .map(locale::format_decimal_2)
            .unwrap_or_else(|| "-".to_string())
    };
    TariffRowView {
        label: row.label.clone(),
        billing_time: row.billing_time.clone(),
        blue_label: rate(row.blue),
        green_label: rate(row.green),
    }
}

#[cfg(test)]
mod tests {
    use super::build_report;
    use crate::issues::Issue;
    use crate::payload::{RecommendationPayload, RecommendationSettings};
    use crate::report::ReportState;

    fn settings() -> RecommendationSettings {
        RecommendationSettings::default()
    }

    #[test]
    fn clean_payload_builds_full_comparison() {
        let payload = RecommendationPayload::sample();
        let report = build_report(&payload, &settings());
        assert_eq!(report.state, ReportState::FullComparison);
        assert!(report.has_recommendation);
        assert!(report.recommended_contract.is_some());
        assert!(report.costs_comparison_chart.is_some());
        let table = report.comparison_table.expect("comparison table");
        assert_eq!(table.total_current_label, "R$ 464.300,00");
        assert_eq!(table.nominal_savings_label, "10,68");
        assert_eq!(table.absolute_difference_label, "R$ 49.600,00");
        assert_eq!(report.meets_renovation_threshold, Some(true));
    }

    #[test]
    fn errors_suppress_every_recommendation_field() {
        let mut payload = RecommendationPayload::sample();
        payload.errors.push(Issue {
            code: 1,
            message: "Tarifas não encontradas".to_string(),
        });
        assert!(payload.recommended_contract.is_some());

        let report = build_report(&payload, &settings());
        assert_eq!(report.state, ReportState::SummaryOnly);
        assert!(report.has_errors);
        assert!(report.recommended_contract.is_none());
        assert!(report.costs_comparison_chart.is_none());
        assert!(report.detailed_comparison_chart.is_none());
        assert!(report.comparison_table.is_none());
        assert!(report.meets_renovation_threshold.is_none());
    }

    #[test]
    fn missing_recommendation_falls_back_to_summary() {
        let mut payload = RecommendationPayload::sample();
        payload.recommended_contract = None;
        let report = build_report(&payload, &settings());
        assert_eq!(report.state, ReportState::SummaryOnly);
        assert!(!report.has_errors);
        assert!(!report.has_recommendation);
    }

    #[test]
    fn bill_count_gates_against_settings() {
        let mut payload = RecommendationPayload::sample();
        payload.energy_bills_count = 5;
        let report = build_report(&payload, &settings());
        assert!(!report.has_minimum_energy_bills);
        assert!(!report.has_ideal_energy_bills);

        payload.energy_bills_count = 12;
        let report = build_report(&payload, &settings());
        assert!(report.has_minimum_energy_bills);
        assert!(report.has_ideal_energy_bills);
    }

    #[test]
    fn warnings_do_not_gate_the_comparison() {
        let mut payload = RecommendationPayload::sample();
        payload.warnings.push(Issue {
            code: 4,
            message: "Faturas pendentes".to_string(),
        });
        let report = build_report(&payload, &settings());
        assert_eq!(report.state, ReportState::FullComparison);
        assert!(report.has_warnings);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn contract_labels_use_pt_br_conventions() {
        let payload = RecommendationPayload::sample();
        let report = build_report(&payload, &settings());
        assert_eq!(report.current_contract.supply_voltage_label, "13,8 kV");
        assert_eq!(report.current_contract.peak_demand_label, "400,00 kW");
        assert_eq!(report.current_contract.tariff_mode_label, "Verde");
    }
}
