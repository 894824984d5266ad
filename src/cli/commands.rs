use crate::core::charts::ChartId;
use crate::core::dashboard::{Dashboard, FleetView, Section, TabId};
use crate::core::metrics::{AlertLevel, VehicleKpis};
use crate::core::selection::{self, Period, Selection};
use crate::core::sheets::{FleetSheet, FleetWorkbook};
use crate::core::{dashboard, metrics};
use crate::error::{FleetError, FleetResult};
use crate::excel::{FleetImporter, ReportExporter};
use crate::format::FormattedTable;
use crate::render::{render_svg, ChartStyle};
use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Output format of the `show` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Load, clean and check a fleet workbook
pub fn load_workbook(file: &Path) -> FleetResult<FleetWorkbook> {
    let data = FleetImporter::new(file).import()?;
    FleetWorkbook::from_data(data)
}

/// The date used for expiry checks and report naming
pub fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

/// Build a selection from command-line filters.
///
/// An empty direction list selects every direction. A period bound left out
/// stays open on that side.
pub fn build_selection(
    vehicle: Option<String>,
    directions: Vec<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> FleetResult<Selection> {
    let mut selection = Selection {
        vehicle,
        ..Selection::default()
    };
    if !directions.is_empty() {
        selection = selection.directions(directions);
    }
    if from.is_some() || to.is_some() {
        let period = Period::new(
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        )?;
        selection = selection.period(period);
    }
    Ok(selection)
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> FleetResult<()> {
    println!("{}", "📂 Fleet Dashboard - Workbook sheets".bold().green());
    println!("   File: {}\n", file.display());

    let data = FleetImporter::new(&file).import()?;
    println!("{}", "📊 Chargement:".bold().cyan());
    for stat in data.stats() {
        println!("   {}: {} lignes", stat.name.bright_blue(), stat.rows);
    }
    println!();

    println!("{}", "📋 Feuilles attendues:".bold().cyan());
    let mut missing = None;
    for sheet in FleetSheet::ALL {
        if data.get(sheet.sheet_name()).is_some() {
            println!("   {} {}", "✅".green(), sheet.sheet_name());
        } else {
            println!("   {} {}", "❌".red(), sheet.sheet_name().red());
            missing.get_or_insert(sheet);
        }
    }
    println!();

    match missing {
        Some(sheet) => Err(FleetError::MissingSheet(sheet.sheet_name().to_string())),
        None => {
            println!("{}", "✅ Workbook complete".bold().green());
            Ok(())
        }
    }
}

/// Execute the vehicles command
pub fn vehicles(file: PathBuf, directions: Vec<String>) -> FleetResult<()> {
    println!("{}", "🚗 Fleet Dashboard - Vehicles".bold().green());
    println!("   File: {}\n", file.display());

    let workbook = load_workbook(&file)?;
    println!("{}", "🏢 Directions:".bold().cyan());
    for direction in selection::directions(&workbook) {
        let marker = if directions.is_empty() || directions.contains(&direction) {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!("   {} {}", marker, direction);
    }
    println!();

    let selection = build_selection(None, directions, None, None)?;
    let filtered = selection::filtered_vehicles(&workbook, &selection)?;
    let choices = selection::vehicle_choices(&filtered);
    println!("{} ({})", "🚗 Véhicules:".bold().cyan(), choices.len());
    for plate in &choices {
        println!("   {}", plate.bright_blue());
    }
    Ok(())
}

/// Execute the show command
pub fn show(
    file: PathBuf,
    selection: Selection,
    today: Option<NaiveDate>,
    tab: Option<TabId>,
    format: OutputFormat,
) -> FleetResult<()> {
    let workbook = load_workbook(&file)?;
    let dashboard = Dashboard::build(&workbook, &selection, resolve_today(today))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&dashboard)?),
        OutputFormat::Text => print_dashboard(&dashboard, tab),
    }
    Ok(())
}

/// Execute the report command
pub fn report(
    file: PathBuf,
    selection: Selection,
    output: Option<PathBuf>,
    today: Option<NaiveDate>,
) -> FleetResult<()> {
    println!("{}", "📥 Fleet Dashboard - Excel report".bold().green());
    println!("   File: {}", file.display());

    let workbook = load_workbook(&file)?;
    let view = FleetView::new(&workbook, selection, resolve_today(today))?;
    let exporter = ReportExporter::new(&view);
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(exporter.file_name()?),
    };
    println!("   Vehicle: {}", view.scope.plate.bright_blue().bold());
    println!("   Output: {}\n", output.display());

    exporter.export(&output)?;

    println!("{}", "✅ Report written".bold().green());
    println!("   {}", output.display());
    Ok(())
}

/// Execute the chart command
pub fn chart(
    file: PathBuf,
    chart: ChartId,
    selection: Selection,
    output: Option<PathBuf>,
    today: Option<NaiveDate>,
) -> FleetResult<()> {
    let workbook = load_workbook(&file)?;
    let view = FleetView::new(&workbook, selection, resolve_today(today))?;
    let spec = view.require_chart(chart)?;
    let svg = render_svg(&spec, &ChartStyle::default())?;

    match output {
        Some(path) => {
            fs::write(&path, svg)?;
            println!("{} {}", "✅ Chart written:".bold().green(), path.display());
        }
        None => print!("{}", svg),
    }
    Ok(())
}

//==============================================================================
// Text rendering
//==============================================================================

fn print_dashboard(dashboard: &Dashboard, tab: Option<TabId>) {
    println!("{}", format!("🚗 {}", dashboard.title).bold().green());
    let loaded: Vec<String> = dashboard
        .sheets
        .iter()
        .map(|s| format!("{}: {} lignes", s.name, s.rows))
        .collect();
    println!("   {}", loaded.join(" | ").dimmed());
    if let Some(period) = &dashboard.period {
        println!("   Période: {} → {}", period.start, period.end);
    }
    println!(
        "   Véhicule: {} ({} véhicule(s) sélectionnable(s))\n",
        dashboard.vehicle.bright_blue().bold(),
        dashboard.vehicles.len()
    );

    for kpi in &dashboard.kpis {
        println!("   {:<24} {}", kpi.label, kpi.value.bold());
    }
    println!();

    for alert in &dashboard.alerts {
        match alert.level {
            AlertLevel::Error => println!("{} {}", "⚠️".red(), alert.message.red().bold()),
            AlertLevel::Warning => println!("{} {}", "⚠️".yellow(), alert.message.yellow()),
        }
    }
    if !dashboard.alerts.is_empty() {
        println!();
    }

    for t in dashboard.tabs.iter().filter(|t| tab.map_or(true, |id| id == t.id)) {
        println!("{}", t.title.bold().cyan());
        for kpi in &t.kpis {
            println!("   {:<24} {}", kpi.label, kpi.value.bold());
        }
        for section in &t.sections {
            print_section(section);
        }
        println!();
    }
}

fn print_section(section: &Section) {
    println!("\n   {}", section.title.bold());
    if let Some(info) = &section.info {
        println!("   {} {}", "ℹ".blue(), info);
    }
    if let Some(table) = &section.table {
        print_table(table);
    }
    for chart in &section.charts {
        println!(
            "   📊 {} ({} points, total {:.0} {})",
            chart.title,
            chart.points.len(),
            chart.total(),
            chart.unit
        );
    }
}

fn print_table(table: &FormattedTable) {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{}{}", c, " ".repeat(w - c.chars().count())))
            .collect::<Vec<_>>()
            .join(" │ ")
    };
    println!("   {}", line(&table.headers).bold());
    for row in &table.rows {
        println!("   {}", line(row));
    }
}

fn print_kpis(kpis: &VehicleKpis) {
    for kpi in dashboard::vehicle_kpis(kpis) {
        println!("   {:<24} {}", kpi.label, kpi.value.bold());
    }
}

//==============================================================================
// Watch mode
//==============================================================================

/// Execute the watch command
pub fn watch(file: PathBuf, vehicle: Option<String>, verbose: bool) -> FleetResult<()> {
    println!("{}", "👁️  Fleet Dashboard - Watch Mode".bold().green());
    println!("   Watching: {}", file.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    if !file.exists() {
        return Err(FleetError::Validation(format!(
            "File not found: {}",
            file.display()
        )));
    }

    let canonical_path = file.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| FleetError::Validation("Cannot determine parent directory".to_string()))?;

    let (tx, rx) = channel();

    // Spreadsheet editors save in several writes
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| FleetError::Validation(format!("Failed to create file watcher: {}", e)))?;

    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| FleetError::Validation(format!("Failed to watch directory: {}", e)))?;

    if verbose {
        println!(
            "   {} {}",
            "Watching directory:".cyan(),
            parent_dir.display()
        );
    }

    println!("{}", "🔄 Initial load...".cyan());
    run_watch_action(&file, vehicle.as_deref(), verbose);
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && is_watched_file(&event.path, &canonical_path)
                });

                if relevant {
                    if verbose {
                        print!("\x1B[2J\x1B[1;1H");
                    }
                    println!(
                        "\n{} {}",
                        "🔄 Change detected at".cyan(),
                        Local::now().format("%H:%M:%S").to_string().cyan()
                    );
                    run_watch_action(&file, vehicle.as_deref(), verbose);
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// The workbook itself; editor lock files like `~$fleet.xlsx` are ignored
fn is_watched_file(path: &Path, watched: &Path) -> bool {
    if let Ok(canonical) = path.canonicalize() {
        if canonical == watched {
            return true;
        }
    }
    matches!((path.file_name(), watched.file_name()), (Some(a), Some(b)) if a == b)
}

fn run_watch_action(file: &Path, vehicle: Option<&str>, verbose: bool) {
    match watch_summary(file, vehicle, verbose) {
        Ok(()) => println!("{}", "✅ Dashboard refreshed".bold().green()),
        Err(e) => println!("{} {}", "❌ Load failed:".bold().red(), e),
    }
}

fn watch_summary(file: &Path, vehicle: Option<&str>, verbose: bool) -> FleetResult<()> {
    let workbook = load_workbook(file)?;
    if verbose {
        for stat in workbook.stats() {
            println!("   {}: {} lignes", stat.name, stat.rows);
        }
    }

    let selection = Selection {
        vehicle: vehicle.map(str::to_string),
        ..Selection::default()
    };
    let view = FleetView::new(&workbook, selection, resolve_today(None))?;
    println!("   Véhicule: {}", view.scope.plate.bright_blue().bold());
    print_kpis(&view.kpis);
    for alert in metrics::alerts(&view.scope, view.today) {
        println!("   {} {}", "⚠️".yellow(), alert.message);
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
