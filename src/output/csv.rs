use anyhow::Result;

use crate::report::charts::SeriesKind;
use crate::report::{ComparisonTable, ReportViewModel};

pub fn comparison_to_csv(comparison: &ComparisonTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "category",
        "current",
        "current_share_pct",
        "recommended",
        "recommended_share_pct",
    ])?;
    for row in &comparison.rows {
        writer.write_record([
            row.category.as_str(),
            row.current_label.as_str(),
            row.current_share.as_str(),
            row.recommended_label.as_str(),
            row.recommended_share.as_str(),
        ])?;
    }
    writer.write_record([
        "Total",
        comparison.total_current_label.as_str(),
        "100,0",
        comparison.total_recommended_label.as_str(),
        "100,0",
    ])?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

/// Monthly export of every bar series in the current-state charts. Null
/// months stay as empty fields.
pub fn monthly_to_csv(report: &ReportViewModel) -> Result<String> {
    let charts: Vec<_> = report
        .consumption_chart
        .iter()
        .chain(report.demand_chart.iter())
        .chain(report.current_costs_chart.iter())
        .filter(|series| series.kind == SeriesKind::Bar)
        .collect();

    let mut writer = csv::Writer::from_writer(vec![]);
    let mut header = vec!["month".to_string(), "year".to_string()];
    header.extend(charts.iter().map(|series| series.label.clone()));
    writer.write_record(&header)?;

    for (index, (month, year)) in report.date_axis.iter().enumerate() {
        let mut record = vec![month.clone(), year.clone()];
        for series in &charts {
            record.push(
                series
                    .data
                    .get(index)
                    .copied()
                    .flatten()
                    .map(|value| format!("{value:.2}"))
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::monthly_to_csv;
    use crate::payload::{RecommendationPayload, RecommendationSettings};
    use crate::report::assembler::build_report;

    #[test]
    fn monthly_csv_leaves_gaps_empty() {
        let payload = RecommendationPayload::sample();
        let report = build_report(&payload, &RecommendationSettings::default());
        let rendered = monthly_to_csv(&report).expect("csv");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 13);
        let june = lines[6];
        assert!(june.starts_with("Jun,2023"));
        assert!(june.contains(",,"));
    }
}
