use crate::commands::{
    run_calendar, run_clear, run_factors, run_import, run_kpis, run_record, run_report,
    run_settings, run_simulate, CalendarCommand, FactorsCommand, ImportArgs, RecordCommand,
    ReportArgs, SettingsArgs, SimulateArgs,
};
use crate::infra::SessionStore;
use carbon_ledger::config::AppConfig;
use carbon_ledger::error::AppError;
use carbon_ledger::telemetry;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "carbon-ledger",
    about = "Record activity data, compute the carbon footprint and simulate mitigation plans",
    version
)]
struct Cli {
    /// Backup file holding the session (defaults to APP_BACKUP_PATH)
    #[arg(long, global = true)]
    backup: Option<PathBuf>,
    /// Date used for new entries (YYYY-MM-DD). Defaults to today.
    #[arg(long, global = true, value_parser = crate::infra::parse_date)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List or edit emission factors and grid presets
    Factors {
        #[command(subcommand)]
        command: FactorsCommand,
    },
    /// Update the entity, population, budget and pricing settings
    Settings(SettingsArgs),
    /// Append activity data to the ledger
    Record {
        #[command(subcommand)]
        command: RecordCommand,
    },
    /// Print the dashboard indicators
    Kpis {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Project the footprint under a set of mitigation levers
    Simulate(SimulateArgs),
    /// Print the report snapshot and optionally export the ledger as CSV
    Report(ReportArgs),
    /// Replace the ledger from a CSV spreadsheet
    Import(ImportArgs),
    /// Estimate or import the number of operating days
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Remove every ledger entry
    Clear,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let backup_path = cli
        .backup
        .unwrap_or_else(|| config.storage.backup_path.clone());
    let store = SessionStore::new(backup_path, config.operating_days_override, today);
    debug!(
        environment = ?config.environment,
        backup = %store.path().display(),
        %today,
        "session store ready"
    );

    match cli.command {
        Command::Factors { command } => run_factors(&store, command),
        Command::Settings(args) => run_settings(&store, args),
        Command::Record { command } => run_record(&store, command),
        Command::Kpis { json } => run_kpis(&store, json),
        Command::Simulate(args) => run_simulate(&store, args),
        Command::Report(args) => run_report(&store, args),
        Command::Import(args) => run_import(&store, args),
        Command::Calendar { command } => run_calendar(&store, command),
        Command::Clear => run_clear(&store),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::RecordCommand;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(
            ["carbon-ledger", "record", "entry", "--category", "Energy", "--item", "Elec"]
                .iter()
                .chain(args),
        )
    }

    #[test]
    fn entry_requires_a_factor_or_a_factor_key() {
        let error = parse(&["--quantity", "100"]).expect_err("coefficient missing");
        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn entry_rejects_both_factor_sources() {
        let error = parse(&["--quantity", "100", "--factor", "0.06", "--factor-key", "electricity"])
            .expect_err("conflicting coefficients");
        assert_eq!(error.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn entry_accepts_a_single_factor_source() {
        for args in [
            ["--quantity", "100", "--factor", "0.06"],
            ["--quantity", "100", "--factor-key", "electricity"],
        ] {
            match parse(&args).expect("valid entry").command {
                Command::Record {
                    command: RecordCommand::Entry(entry),
                } => assert!(entry.factor.is_some() != entry.factor_key.is_some()),
                other => panic!("expected record entry, got {other:?}"),
            }
        }
    }
}
