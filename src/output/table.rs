use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::issues::{IssueSeverity, RoutedIssue};
use crate::locale::UNAVAILABLE;
use crate::report::charts::{ChartSeries, SeriesKind};
use crate::report::{ComparisonTable, ContractView, ReportViewModel, TariffRowView};

pub fn render_contracts_table(
    current: &ContractView,
    recommended: Option<&ContractView>,
) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["", "Contrato Atual"];
    if recommended.is_some() {
        header.push("Contrato Proposto");
    }
    table.set_header(header);

    let rows: [(&str, fn(&ContractView) -> String); 7] = [
        ("Universidade", |c| c.university.clone()),
        ("Distribuidora", |c| c.distributor.clone()),
        ("Unidade Consumidora", |c| c.consumer_unit.clone()),
        ("Tensão de Fornecimento", |c| c.supply_voltage_label.clone()),
        ("Modalidade / Subgrupo", |c| {
            format!("{} / {}", c.tariff_mode_label, c.subgroup)
        }),
        ("Demanda Contratada Ponta", |c| c.peak_demand_label.clone()),
        ("Demanda Contratada Fora Ponta", |c| {
            c.off_peak_demand_label.clone()
        }),
    ];
    for (label, value) in rows {
        let mut row = vec![label.to_string(), value(current)];
        if let Some(recommended) = recommended {
            row.push(value(recommended));
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn render_comparison_table(comparison: &ComparisonTable) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "",
        "Atual",
        "Atual (%)",
        "Proposto",
        "Proposto (%)",
    ]);
    for row in &comparison.rows {
        table.add_row(vec![
            row.category.clone(),
            row.current_label.clone(),
            row.current_share.clone(),
            row.recommended_label.clone(),
            row.recommended_share.clone(),
        ]);
    }
    table.add_row(vec![
        "Total".to_string(),
        comparison.total_current_label.clone(),
        "100,0".to_string(),
        comparison.total_recommended_label.clone(),
        "100,0".to_string(),
    ]);

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nEconomia nominal: {} ({}%)",
        comparison.absolute_difference_label, comparison.nominal_savings_label
    ));
    out
}

/// Monthly table: one row per axis tick, one column per bar series of the
/// given charts. Reference lines are constant and stay out of the table.
pub fn render_monthly_table(report: &ReportViewModel) -> String {
    let charts: Vec<&ChartSeries> = report
        .consumption_chart
        .iter()
        .chain(report.demand_chart.iter())
        .chain(report.current_costs_chart.iter())
        .filter(|series| series.kind == SeriesKind::Bar)
        .collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec!["Mês".to_string()];
    header.extend(charts.iter().map(|series| series.label.clone()));
    table.set_header(header);

    for (index, (month, year)) in report.date_axis.iter().enumerate() {
        let mut row = vec![format!("{month}/{year}")];
        for series in &charts {
            let cell = match series.data.get(index).copied().flatten() {
                Some(value) => format!("{value:.1}"),
                None => UNAVAILABLE.to_string(),
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    table.to_string()
}

pub fn render_tariffs_table(rows: &[TariffRowView]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Tarifa", "Posto", "Azul", "Verde"]);
    for row in rows {
        table.add_row(vec![
            row.label.clone(),
            row.billing_time.clone(),
            row.blue_label.clone(),
            row.green_label.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_issues_table(issues: &[RoutedIssue]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Severidade", "Código", "Mensagem", "Destino"]);
    for issue in issues {
        let severity_cell = match issue.severity {
            IssueSeverity::Error => Cell::new(issue.severity.to_string()).fg(Color::Red),
            IssueSeverity::Warning => Cell::new(issue.severity.to_string()).fg(Color::Yellow),
        };
        table.add_row(Row::from(vec![
            severity_cell,
            Cell::new(issue.code.to_string()),
            Cell::new(issue.message.clone()),
            Cell::new(
                issue
                    .action
                    .map(|action| action.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::{render_comparison_table, render_monthly_table};
    use crate::payload::{RecommendationPayload, RecommendationSettings};
    use crate::report::assembler::build_report;

    #[test]
    fn monthly_table_marks_gaps_as_unavailable() {
        let payload = RecommendationPayload::sample();
        let report = build_report(&payload, &RecommendationSettings::default());
        let rendered = render_monthly_table(&report);
        assert!(rendered.contains("Indisponível"));
        assert!(rendered.contains("Jan/2023"));
    }

    #[test]
    fn comparison_table_carries_savings_footer() {
        let payload = RecommendationPayload::sample();
        let report = build_report(&payload, &RecommendationSettings::default());
        let rendered = render_comparison_table(&report.comparison_table.expect("table"));
        assert!(rendered.contains("R$ 49.600,00"));
        assert!(rendered.contains("10,68"));
    }
}
