use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use fleetdash::cli::{self, OutputFormat};
use fleetdash::core::{ChartId, Selection, TabId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fleetdash")]
#[command(about = "Vehicle fleet dashboard: costs, alerts and Excel reports from a fleet workbook")]
#[command(long_about = "Fleet Dashboard - vehicle follow-up from an Excel workbook

Reads the fleet workbook (Parc_Véhicules, Entretien, Carburant, ...), cleans
it and shows, per vehicle: mileage, maintenance/repair/purchase/fuel costs,
expired insurance and technical inspection alerts, and fleet-wide totals.

COMMANDS:
  sheets    - Row counts and expected-sheet check
  vehicles  - Directions and vehicle choices
  show      - The dashboard (text, JSON or YAML)
  report    - Excel report of one vehicle
  chart     - One dashboard chart as SVG
  watch     - Refresh KPIs whenever the workbook changes

EXAMPLES:
  fleetdash show flotte.xlsx -v \"1234 TBA\"
  fleetdash show flotte.xlsx -d DSI --from 2024-01-01 --format json
  fleetdash report flotte.xlsx -v \"1234 TBA\" -o rapport.xlsx
  fleetdash chart flotte.xlsx fuel-liters -o carburant.svg")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Vehicle, direction and period filters shared by the dashboard commands
#[derive(Args, Debug, Clone, Default)]
struct Filters {
    /// Vehicle plate (defaults to the first vehicle of the selected directions)
    #[arg(short, long)]
    vehicle: Option<String>,

    /// Direction to include (repeatable; all directions when omitted)
    #[arg(short, long = "direction")]
    directions: Vec<String>,

    /// First day of the period (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the period (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Reference date for expiry alerts and report naming (defaults to today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

impl Filters {
    fn selection(&self) -> anyhow::Result<Selection> {
        Ok(cli::build_selection(
            self.vehicle.clone(),
            self.directions.clone(),
            self.from,
            self.to,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show row counts and check the expected sheets
    Sheets {
        /// Path to the fleet workbook (.xlsx)
        file: PathBuf,
    },

    /// List directions and the vehicles they contain
    Vehicles {
        /// Path to the fleet workbook (.xlsx)
        file: PathBuf,

        /// Direction to include (repeatable)
        #[arg(short, long = "direction")]
        directions: Vec<String>,
    },

    #[command(long_about = "Show the dashboard of one vehicle.

Prints the KPIs, the alerts and the seven tabs (vehicle sheet, maintenance &
repairs, mileage, insurance & inspections, purchases & suppliers, fuel,
global dashboard). Use --tab to print a single tab and --format json|yaml for
machine-readable output.")]
    /// Show the dashboard of one vehicle
    Show {
        /// Path to the fleet workbook (.xlsx)
        file: PathBuf,

        #[command(flatten)]
        filters: Filters,

        /// Only print this tab (vehicle, maintenance, mileage, insurance, purchases, fuel, global)
        #[arg(long)]
        tab: Option<TabId>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write the Excel report of one vehicle
    Report {
        /// Path to the fleet workbook (.xlsx)
        file: PathBuf,

        #[command(flatten)]
        filters: Filters,

        /// Output path (defaults to Rapport_<PLATE>_<YYYYMMDD>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render one dashboard chart as SVG
    Chart {
        /// Path to the fleet workbook (.xlsx)
        file: PathBuf,

        /// Chart id (maintenance-by-type, internal-repairs, external-services, mileage,
        /// purchases-by-supplier, fuel-liters, costs-by-direction, fuel-cost-by-type)
        chart: ChartId,

        #[command(flatten)]
        filters: Filters,

        /// Output .svg path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    #[command(long_about = "Watch the workbook and refresh the KPIs on every save.

Watches the workbook's directory and reloads when the workbook changes.
Debounced so spreadsheet editors saving in several writes trigger one reload.

Press Ctrl+C to stop watching.")]
    /// Refresh KPIs and alerts whenever the workbook changes
    Watch {
        /// Path to the fleet workbook (.xlsx)
        file: PathBuf,

        /// Vehicle plate
        #[arg(short, long)]
        vehicle: Option<String>,

        /// Show sheet counts on every reload
        #[arg(long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { file } => cli::sheets(file)?,

        Commands::Vehicles { file, directions } => cli::vehicles(file, directions)?,

        Commands::Show {
            file,
            filters,
            tab,
            format,
        } => cli::show(file, filters.selection()?, filters.today, tab, format)?,

        Commands::Report {
            file,
            filters,
            output,
        } => cli::report(file, filters.selection()?, output, filters.today)?,

        Commands::Chart {
            file,
            chart,
            filters,
            output,
        } => cli::chart(file, chart, filters.selection()?, output, filters.today)?,

        Commands::Watch {
            file,
            vehicle,
            verbose,
        } => cli::watch(file, vehicle, verbose)?,
    }
    Ok(())
}
