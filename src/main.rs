use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mepa_report::config::{Config, ConfigOverrides};
use mepa_report::output::csv::{comparison_to_csv, monthly_to_csv};
use mepa_report::output::json::render_json;
use mepa_report::output::table::{
    render_comparison_table, render_contracts_table, render_issues_table, render_monthly_table,
    render_tariffs_table,
};
use mepa_report::payload::cache::PayloadCache;
use mepa_report::payload::fetch::{FileSource, HttpSource, PayloadSource};
use mepa_report::payload::RecommendationSettings;
use mepa_report::report::assembler::build_report;
use mepa_report::report::{ReportState, ReportViewModel};
use mepa_report::server::run_server;
use mepa_report::session::SessionState;
use tracing::warn;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "mepa-report",
    about = "Contract recommendation reports for MEC Energia consumer units"
)]
struct Cli {
    /// Consumer unit id (falls back to the configured default)
    #[arg(short = 'u', long)]
    consumer_unit: Option<u64>,
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Backend base URL
    #[arg(short, long)]
    api_url: Option<String>,
    /// Read the recommendation payload from a local JSON file instead of
    /// the backend
    #[arg(short, long)]
    payload: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Full detailed-analysis report
    Report,
    /// Current-state view only
    Summary,
    /// Payload errors and warnings with their destinations
    Issues,
    /// Blue vs green tariff cross-tab
    Tariffs,
    /// Monthly consumption, demand and cost table
    Consumption,
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        consumer_unit: cli.consumer_unit,
        api_url: cli.api_url.clone(),
    });

    if let Commands::Config { init, show } = &cli.command {
        if *init {
            Config::write_template(&config_path)?;
            println!("Wrote config template to {}", config_path.display());
        }
        if *show || !*init {
            println!("{}", render_json(&config)?);
        }
        return Ok(());
    }

    let source = build_source(&cli, &config);

    if let Commands::Serve { host, port } = &cli.command {
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        let settings = resolve_settings(source.as_ref(), &config).await;
        return run_server(config, source, settings, addr).await;
    }

    let consumer_unit = resolve_consumer_unit(&cli, &config)?;
    let settings = resolve_settings(source.as_ref(), &config).await;

    let cache = PayloadCache::new();
    let mut session = SessionState::new();
    session.select_consumer_unit(consumer_unit);

    let cached = match cache.get_or_fetch(consumer_unit, source.as_ref()).await {
        Ok(cached) => cached,
        Err(error) => {
            session.mark_fetch_failed(format!("{error:#}"));
            return Err(error)
                .with_context(|| format!("failed fetching consumer unit {consumer_unit}"));
        }
    };
    let report = build_report(&cached.payload, &settings);
    session.mark_ready(report.clone());

    match &cli.command {
        Commands::Report => print_report(&report, &settings, cli.output)?,
        Commands::Summary => print_summary(&report, cli.output)?,
        Commands::Issues => print_issues(&report, &mut session, &cached.payload, cli.output)?,
        Commands::Tariffs => print_tariffs(&report, cli.output)?,
        Commands::Consumption => print_consumption(&report, cli.output)?,
        Commands::Serve { .. } | Commands::Config { .. } => {
            unreachable!("handled before dispatch")
        }
    }

    Ok(())
}

fn build_source(cli: &Cli, config: &Config) -> Arc<dyn PayloadSource> {
    match &cli.payload {
        Some(path) => Arc::new(FileSource::new(path, config.fallback_settings())),
        None => Arc::new(HttpSource::new(config.api.base_url.clone())),
    }
}

fn resolve_consumer_unit(cli: &Cli, config: &Config) -> Result<u64> {
    if cli.payload.is_some() {
        // A file payload is self-contained; the id only keys the cache.
        return Ok(cli
            .consumer_unit
            .or(config.consumer_unit.default_id)
            .unwrap_or(0));
    }
    cli.consumer_unit
        .or(config.consumer_unit.default_id)
        .ok_or_else(|| anyhow!("no consumer unit given (use --consumer-unit or the config file)"))
}

async fn resolve_settings(source: &dyn PayloadSource, config: &Config) -> RecommendationSettings {
    match source.fetch_settings().await {
        Ok(settings) => settings,
        Err(error) => {
            warn!("settings fetch failed, using configured fallbacks: {error:#}");
            config.fallback_settings()
        }
    }
}

fn print_report(
    report: &ReportViewModel,
    settings: &RecommendationSettings,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if !report.has_minimum_energy_bills {
                println!(
                    "Atenção: apenas {} faturas lançadas (mínimo {} para análise).\n",
                    report.energy_bills_count,
                    settings.minimum_energy_bills_for_recommendation
                );
            }
            println!(
                "{}",
                render_contracts_table(
                    &report.current_contract,
                    report.recommended_contract.as_ref()
                )
            );
            if !report.issues.is_empty() {
                println!("{}", render_issues_table(&report.issues));
            }
            match (&report.comparison_table, report.state) {
                (Some(comparison), _) => println!("{}", render_comparison_table(comparison)),
                (None, ReportState::SummaryOnly) => {
                    println!("Comparação indisponível: apenas o estado atual será exibido.")
                }
                (None, ReportState::FullComparison) => {}
            }
            println!("{}", render_monthly_table(report));
        }
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => match &report.comparison_table {
            Some(comparison) => println!("{}", comparison_to_csv(comparison)?),
            None => {
                warn!("no comparison to export, using JSON");
                println!("{}", render_json(report)?);
            }
        },
    }
    Ok(())
}

fn print_summary(report: &ReportViewModel, format: OutputFormat) -> Result<()> {
    let summary = report.summary();
    match format {
        OutputFormat::Table => {
            println!("{}", render_contracts_table(&summary.current_contract, None));
            if !summary.issues.is_empty() {
                println!("{}", render_issues_table(&summary.issues));
            }
            println!("{}", render_monthly_table(report));
        }
        OutputFormat::Json => println!("{}", render_json(&summary)?),
        OutputFormat::Csv => println!("{}", monthly_to_csv(report)?),
    }
    Ok(())
}

fn print_issues(
    report: &ReportViewModel,
    session: &mut SessionState,
    payload: &mepa_report::payload::RecommendationPayload,
    format: OutputFormat,
) -> Result<()> {
    // Applying the first actionable route mirrors the dashboard's
    // click-to-navigate affordance.
    if let Some(action) = report.issues.iter().find_map(|issue| issue.action) {
        session.apply(action, &payload.current_contract);
    }
    match format {
        OutputFormat::Table => {
            if report.issues.is_empty() {
                println!("Nenhum erro ou aviso no payload.");
            } else {
                println!("{}", render_issues_table(&report.issues));
                println!("Painel ativo após navegação: {:?}", session.active_pane);
            }
        }
        OutputFormat::Json => println!("{}", render_json(&report.issues)?),
        OutputFormat::Csv => {
            warn!("CSV output for issues not implemented, using JSON");
            println!("{}", render_json(&report.issues)?);
        }
    }
    Ok(())
}

fn print_tariffs(report: &ReportViewModel, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_tariffs_table(&report.tariffs_table)),
        OutputFormat::Json => println!("{}", render_json(&report.tariffs_table)?),
        OutputFormat::Csv => {
            warn!("CSV output for tariffs not implemented, using JSON");
            println!("{}", render_json(&report.tariffs_table)?);
        }
    }
    Ok(())
}

fn print_consumption(report: &ReportViewModel, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_monthly_table(report)),
        OutputFormat::Json => {
            let charts = serde_json::json!({
                "dateAxis": report.date_axis,
                "consumption": report.consumption_chart,
                "demand": report.demand_chart,
                "currentCosts": report.current_costs_chart,
            });
            println!("{}", render_json(&charts)?);
        }
        OutputFormat::Csv => println!("{}", monthly_to_csv(report)?),
    }
    Ok(())
}
