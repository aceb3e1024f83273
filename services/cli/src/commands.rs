use crate::infra::{parse_amount, parse_date, parse_percent, SessionStore};
use carbon_ledger::accounting::calendar::operating_days_between;
use carbon_ledger::accounting::factors::{default_unit, GridMix};
use carbon_ledger::accounting::ledger::capture::{
    inventory_drafts, CommuteFlow, Consumable, Device, DeviceFleet, HeatedSurface, HeatingSource,
    InventoryRow, TravelMode, TravellerProfile,
};
use carbon_ledger::accounting::scenario::ScenarioParameters;
use carbon_ledger::accounting::{CarbonSession, EntryDraft, KpiSet, SimulationResult};
use carbon_ledger::error::AppError;
use carbon_ledger::export::export_ledger_to_path;
use carbon_ledger::import::{CalendarCsvImporter, LedgerCsvImporter};
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub(crate) enum FactorsCommand {
    /// Print every active factor
    List {
        #[arg(long)]
        json: bool,
    },
    /// Overwrite or add a factor (kgCO2e per unit)
    Set {
        key: String,
        #[arg(value_parser = parse_amount)]
        value: f64,
    },
    /// Apply a country electricity preset
    Grid {
        #[arg(value_enum)]
        grid: GridArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum GridArg {
    France,
    Germany,
    EuropeAverage,
    Usa,
    China,
}

impl From<GridArg> for GridMix {
    fn from(value: GridArg) -> Self {
        match value {
            GridArg::France => GridMix::France,
            GridArg::Germany => GridMix::Germany,
            GridArg::EuropeAverage => GridMix::EuropeAverage,
            GridArg::Usa => GridMix::Usa,
            GridArg::China => GridMix::China,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct SettingsArgs {
    #[arg(long)]
    pub(crate) entity_name: Option<String>,
    #[arg(long)]
    pub(crate) students: Option<u32>,
    #[arg(long)]
    pub(crate) apprentices: Option<u32>,
    #[arg(long)]
    pub(crate) staff: Option<u32>,
    #[arg(long)]
    pub(crate) operating_days: Option<u32>,
    /// Target footprint in tonnes CO2e per person
    #[arg(long, value_parser = parse_amount)]
    pub(crate) budget: Option<f64>,
    /// Notional price per tonne CO2e
    #[arg(long, value_parser = parse_amount)]
    pub(crate) shadow_price: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum RecordCommand {
    /// Free-form entry; give either --factor or --factor-key
    Entry(EntryArgs),
    /// Home-to-campus travel for a group of people
    Commute(CommuteArgs),
    /// Heated surface of a building
    Heating(HeatingArgs),
    /// Routine purchases such as meals or paper
    Consumable(ConsumableArgs),
    /// Manufacturing share of an IT fleet
    Fleet(FleetArgs),
    /// Equipment inventory from a JSON file of rows
    Inventory {
        path: PathBuf,
    },
}

#[derive(Args, Debug)]
pub(crate) struct EntryArgs {
    #[arg(long)]
    pub(crate) category: String,
    #[arg(long)]
    pub(crate) item: String,
    #[arg(long, value_parser = parse_amount)]
    pub(crate) quantity: f64,
    #[arg(long)]
    pub(crate) unit: Option<String>,
    #[arg(
        long,
        value_parser = parse_amount,
        conflicts_with = "factor_key",
        required_unless_present = "factor_key"
    )]
    pub(crate) factor: Option<f64>,
    #[arg(long)]
    pub(crate) factor_key: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub(crate) uncertainty: i64,
    #[arg(long, default_value = "")]
    pub(crate) detail: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum ProfileArg {
    FullTime,
    Apprentice,
    Exchange,
    Staff,
    Guest,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum ModeArg {
    CarThermal,
    CarElectric,
    RegionalTrain,
    Tgv,
    Bus,
    Plane,
}

impl From<ModeArg> for TravelMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::CarThermal => TravelMode::CarThermal,
            ModeArg::CarElectric => TravelMode::CarElectric,
            ModeArg::RegionalTrain => TravelMode::RegionalTrain,
            ModeArg::Tgv => TravelMode::Tgv,
            ModeArg::Bus => TravelMode::Bus,
            ModeArg::Plane => TravelMode::Plane,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct CommuteArgs {
    #[arg(long, value_enum)]
    pub(crate) profile: ProfileArg,
    /// School weeks, months, days on site or visits, depending on the profile
    #[arg(long)]
    pub(crate) count: Option<u32>,
    #[arg(long, value_enum)]
    pub(crate) mode: ModeArg,
    #[arg(long, value_parser = parse_amount, default_value = "30")]
    pub(crate) round_trip_km: f64,
    #[arg(long, default_value_t = 1)]
    pub(crate) travellers: u32,
    #[arg(long, default_value_t = 10)]
    pub(crate) uncertainty: i64,
}

impl CommuteArgs {
    fn profile(&self) -> TravellerProfile {
        match self.profile {
            ProfileArg::FullTime => TravellerProfile::FullTimeStudent,
            ProfileArg::Apprentice => TravellerProfile::Apprentice {
                school_weeks: self.count.unwrap_or(20),
            },
            ProfileArg::Exchange => TravellerProfile::ExchangeStudent {
                months: self.count.unwrap_or(6),
            },
            ProfileArg::Staff => TravellerProfile::Staff {
                days_on_site: self.count.unwrap_or(160),
            },
            ProfileArg::Guest => TravellerProfile::GuestLecturer {
                visits: self.count.unwrap_or(2),
            },
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum HeatingArg {
    Gas,
    Electric,
    DistrictNetwork,
}

#[derive(Args, Debug)]
pub(crate) struct HeatingArgs {
    #[arg(long, value_parser = parse_amount)]
    pub(crate) surface_m2: f64,
    #[arg(long, value_enum)]
    pub(crate) source: HeatingArg,
    #[arg(long, value_parser = parse_amount, default_value = "110")]
    pub(crate) kwh_per_m2: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum ConsumableArg {
    BeefMeal,
    VegetarianMeal,
    Coffee,
    Paper,
    Goodies,
}

#[derive(Args, Debug)]
pub(crate) struct ConsumableArgs {
    #[arg(value_enum)]
    pub(crate) kind: ConsumableArg,
    #[arg(long, value_parser = parse_amount, default_value = "500")]
    pub(crate) quantity: f64,
    #[arg(long, default_value_t = 20)]
    pub(crate) uncertainty: i64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub(crate) enum DeviceArg {
    Laptop,
    Desktop,
    Screen,
    Smartphone,
    Projector,
}

#[derive(Args, Debug)]
pub(crate) struct FleetArgs {
    #[arg(value_enum)]
    pub(crate) device: DeviceArg,
    #[arg(long, value_parser = parse_amount)]
    pub(crate) units: f64,
    #[arg(long, default_value_t = 4)]
    pub(crate) lifespan_years: u32,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SimulateArgs {
    /// JSON file of lever settings; flags below override it
    #[arg(long)]
    pub(crate) params_file: Option<PathBuf>,
    /// Headcount change in percent (negative for a decline)
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) pop_growth: Option<f64>,
    #[arg(long)]
    pub(crate) remote_days: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    pub(crate) mobility_sobriety: Option<f64>,
    #[arg(long)]
    pub(crate) rail_shift: bool,
    /// Average occupants per car (1 to 4)
    #[arg(long)]
    pub(crate) carpool: Option<f64>,
    #[arg(long)]
    pub(crate) soft_mobility: bool,
    #[arg(long, value_parser = parse_percent)]
    pub(crate) heat_sobriety: Option<f64>,
    #[arg(long)]
    pub(crate) led: bool,
    #[arg(long, value_parser = parse_percent)]
    pub(crate) solar: Option<f64>,
    #[arg(long)]
    pub(crate) green_electricity: bool,
    #[arg(long)]
    pub(crate) it_extra_years: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    pub(crate) refurbished: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    pub(crate) vegetarian: Option<f64>,
    #[arg(long, value_parser = parse_percent)]
    pub(crate) waste_reduction: Option<f64>,
    /// Print the per-lever trace and action plan
    #[arg(long)]
    pub(crate) plan: bool,
    #[arg(long)]
    pub(crate) json: bool,
}

impl SimulateArgs {
    fn parameters(&self) -> Result<ScenarioParameters, AppError> {
        let mut params = match &self.params_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<ScenarioParameters>(&raw).map_err(std::io::Error::from)?
            }
            None => ScenarioParameters::default(),
        };

        if let Some(value) = self.pop_growth {
            params.pop_growth_pct = value;
        }
        if let Some(value) = self.remote_days {
            params.remote_days_per_week = value;
        }
        if let Some(value) = self.mobility_sobriety {
            params.mobility_sobriety_pct = value;
        }
        if let Some(value) = self.carpool {
            params.carpool_occupancy = value;
        }
        if let Some(value) = self.heat_sobriety {
            params.heat_sobriety_pct = value;
        }
        if let Some(value) = self.solar {
            params.solar_pct = value;
        }
        if let Some(value) = self.it_extra_years {
            params.it_extra_years = value;
        }
        if let Some(value) = self.refurbished {
            params.refurbished_pct = value;
        }
        if let Some(value) = self.vegetarian {
            params.vegetarian_pct = value;
        }
        if let Some(value) = self.waste_reduction {
            params.waste_reduction_pct = value;
        }
        params.rail_shift |= self.rail_shift;
        params.soft_mobility |= self.soft_mobility;
        params.led_relamping |= self.led;
        params.green_electricity |= self.green_electricity;

        Ok(params)
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    #[arg(long)]
    pub(crate) json: bool,
    /// Also write the ledger with its scope column to this CSV file
    #[arg(long)]
    pub(crate) export_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    pub(crate) path: PathBuf,
    /// Report what would be imported without replacing the ledger
    #[arg(long)]
    pub(crate) dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CalendarCommand {
    /// Teaching days between two dates, minus vacations
    Estimate {
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
        #[arg(long, default_value_t = 4)]
        vacation_weeks: u32,
        #[arg(long, default_value_t = 5)]
        days_per_week: u32,
        /// Store the result as the session's operating days
        #[arg(long)]
        apply: bool,
    },
    /// Count the rows of a calendar CSV (one row per teaching day)
    Import {
        path: PathBuf,
        #[arg(long)]
        apply: bool,
    },
}

pub(crate) fn run_factors(store: &SessionStore, command: FactorsCommand) -> Result<(), AppError> {
    let mut session = store.load()?;
    match command {
        FactorsCommand::List { json } => {
            if json {
                print_json(session.factors());
            } else {
                println!("Emission factors (grid: {})", session.settings().grid.label());
                for (key, value) in session.factors().iter() {
                    match default_unit(key) {
                        Some(unit) => println!("- {key}: {value} kgCO2e/{unit}"),
                        None => println!("- {key}: {value} kgCO2e (custom)"),
                    }
                }
            }
        }
        FactorsCommand::Set { key, value } => {
            let previous = session.set_factor(&key, value)?;
            store.save(&session)?;
            match previous {
                Some(previous) => println!("{key}: {previous} -> {value}"),
                None => println!("{key}: added at {value}"),
            }
        }
        FactorsCommand::Grid { grid } => {
            let grid = GridMix::from(grid);
            session.set_grid(grid);
            store.save(&session)?;
            println!(
                "Grid set to {} ({}): electricity {} kgCO2e/kWh",
                grid.label(),
                grid.description(),
                grid.electricity_factor()
            );
        }
    }
    Ok(())
}

pub(crate) fn run_settings(store: &SessionStore, args: SettingsArgs) -> Result<(), AppError> {
    let mut session = store.load()?;
    let settings = session.settings_mut();
    if let Some(name) = args.entity_name {
        settings.entity_name = name;
    }
    if let Some(students) = args.students {
        settings.population.students = students;
    }
    if let Some(apprentices) = args.apprentices {
        settings.population.apprentices = apprentices;
    }
    if let Some(staff) = args.staff {
        settings.population.staff = staff;
    }
    if let Some(days) = args.operating_days {
        settings.operating_days = days;
    }
    if let Some(budget) = args.budget {
        settings.budget_t_per_capita = budget;
    }
    if let Some(price) = args.shadow_price {
        settings.shadow_price = price;
    }

    let settings = session.settings().clone();
    store.save(&session)?;
    println!("{}", settings.entity_name);
    println!(
        "- Population: {} students, {} apprentices, {} staff",
        settings.population.students, settings.population.apprentices, settings.population.staff
    );
    println!("- Operating days: {}", settings.operating_days);
    println!(
        "- Budget: {} t/person ({})",
        settings.budget_t_per_capita,
        settings.ambition().label()
    );
    println!("- Shadow price: {} EUR/t", settings.shadow_price);
    Ok(())
}

pub(crate) fn run_record(store: &SessionStore, command: RecordCommand) -> Result<(), AppError> {
    let mut session = store.load()?;
    let drafts = record_drafts(&session, command)?;
    let count = session.record_drafts(drafts, store.today())?;
    store.save(&session)?;

    let recorded = &session.ledger().entries()[session.ledger().len() - count..];
    for entry in recorded {
        println!(
            "+ [{}] {}: {} -> {:.2} kgCO2e (±{:.2})",
            entry.category(),
            entry.item(),
            entry.quantity_label(),
            entry.impact_kgco2(),
            entry.margin_kgco2()
        );
    }
    println!("Ledger now holds {} entries", session.ledger().len());
    Ok(())
}

fn record_drafts(session: &CarbonSession, command: RecordCommand) -> Result<Vec<EntryDraft>, AppError> {
    let factors = session.factors();
    let settings = session.settings();
    let drafts = match command {
        RecordCommand::Entry(args) => {
            let factor = match args.factor {
                Some(factor) => factor,
                None => factors.get(args.factor_key.as_deref().unwrap_or_default())?,
            };
            let unit = args
                .unit
                .or_else(|| {
                    args.factor_key
                        .as_deref()
                        .and_then(default_unit)
                        .map(str::to_string)
                })
                .unwrap_or_default();
            vec![EntryDraft::new(args.category, args.item, args.quantity, unit, factor)
                .with_uncertainty(args.uncertainty)
                .with_detail(args.detail)]
        }
        RecordCommand::Commute(args) => {
            let flow = CommuteFlow {
                profile: args.profile(),
                mode: args.mode.into(),
                round_trip_km: args.round_trip_km,
                travellers: args.travellers,
                uncertainty_pct: args.uncertainty,
            };
            vec![flow.draft(factors, settings)?]
        }
        RecordCommand::Heating(args) => {
            let source = match args.source {
                HeatingArg::Gas => HeatingSource::Gas,
                HeatingArg::Electric => HeatingSource::Electric,
                HeatingArg::DistrictNetwork => HeatingSource::DistrictNetwork,
            };
            let surface = HeatedSurface {
                surface_m2: args.surface_m2,
                source,
                kwh_per_m2_year: args.kwh_per_m2,
            };
            vec![surface.draft(factors)?]
        }
        RecordCommand::Consumable(args) => {
            let consumable = match args.kind {
                ConsumableArg::BeefMeal => Consumable::BeefMeal,
                ConsumableArg::VegetarianMeal => Consumable::VegetarianMeal,
                ConsumableArg::Coffee => Consumable::Coffee,
                ConsumableArg::Paper => Consumable::Paper,
                ConsumableArg::Goodies => Consumable::Goodies,
            };
            vec![consumable
                .draft(args.quantity, factors)?
                .with_uncertainty(args.uncertainty)]
        }
        RecordCommand::Fleet(args) => {
            let device = match args.device {
                DeviceArg::Laptop => Device::Laptop,
                DeviceArg::Desktop => Device::Desktop,
                DeviceArg::Screen => Device::Screen,
                DeviceArg::Smartphone => Device::Smartphone,
                DeviceArg::Projector => Device::Projector,
            };
            let fleet = DeviceFleet {
                device,
                units: args.units,
                lifespan_years: args.lifespan_years,
            };
            vec![fleet.draft(factors)?]
        }
        RecordCommand::Inventory { path } => {
            let raw = std::fs::read_to_string(path)?;
            let rows: Vec<InventoryRow> =
                serde_json::from_str(&raw).map_err(std::io::Error::from)?;
            inventory_drafts(&rows, factors, settings)?
        }
    };
    Ok(drafts)
}

pub(crate) fn run_kpis(store: &SessionStore, json: bool) -> Result<(), AppError> {
    let session = store.load()?;
    let kpis = session.kpis();
    if json {
        print_json(&kpis);
    } else {
        render_kpis(&session.settings().entity_name, &kpis);
    }
    Ok(())
}

fn render_kpis(entity_name: &str, kpis: &KpiSet) {
    println!("Carbon footprint: {entity_name}");
    println!(
        "- Total: {:.2} t CO2e ({:.2} to {:.2} t), {} entries",
        kpis.total_kgco2 / 1000.0,
        kpis.band_low_kgco2 / 1000.0,
        kpis.band_high_kgco2 / 1000.0,
        kpis.entry_count
    );
    println!(
        "- Per person: {:.2} t for {} people (budget {:.1} t, {})",
        kpis.per_capita_t,
        kpis.population,
        kpis.budget_t_per_capita,
        if kpis.on_target { "on target" } else { "over budget" }
    );
    println!("- Shadow cost: {:.0} EUR", kpis.shadow_cost_eur);
    println!("- Daily intensity: {:.1} kg CO2e/day", kpis.daily_intensity_kg);
    println!("- Scope 3 share: {:.0}%", kpis.scope3_share_pct);
    println!("- Data quality index: {:.1}/10", kpis.data_quality_index);
    println!("- Ambition: {}", kpis.ambition_label);
}

pub(crate) fn run_simulate(store: &SessionStore, args: SimulateArgs) -> Result<(), AppError> {
    let session = store.load()?;
    let params = args.parameters()?;
    let result = session.simulate(&params)?;

    if args.json {
        print_json(&result);
        return Ok(());
    }

    render_simulation(&result);
    if args.plan {
        render_plan(&result);
    }
    Ok(())
}

fn render_simulation(result: &SimulationResult) {
    println!("Scenario projection");
    println!(
        "- Baseline {:.2} t -> projected {:.2} t (gain {:.2} t)",
        result.total_ref_kgco2 / 1000.0,
        result.total_final_kgco2 / 1000.0,
        result.total_gain_kgco2 / 1000.0
    );
    println!(
        "- Per person: {:.2} t for {:.0} people (budget {:.1} t, {})",
        result.ratio_final_t_per_capita,
        result.projected_population,
        result.budget_t_per_capita,
        if result.on_target { "on target" } else { "over budget" }
    );
    if result.unassigned_entries > 0 {
        println!(
            "- {} entries ({:.2} t) match no lever domain and stay at baseline",
            result.unassigned_entries,
            result.unassigned_projected_kgco2 / 1000.0
        );
    }

    println!("\nWaterfall (t CO2e)");
    for bar in result.waterfall() {
        println!("- {}: {:+.2}", bar.label, bar.value_t);
    }
}

fn render_plan(result: &SimulationResult) {
    println!("\nLever trace");
    for outcome in &result.domains {
        println!(
            "- {}: {:.1} -> {:.1} kg",
            outcome.domain_label, outcome.projected_baseline_kgco2, outcome.final_kgco2
        );
        for step in outcome.steps.iter().filter(|step| step.before_kgco2 != step.after_kgco2) {
            println!(
                "    {}: {:.1} -> {:.1}",
                step.lever_label, step.before_kgco2, step.after_kgco2
            );
        }
    }

    println!("\nAction plan");
    for row in result.action_plan() {
        println!(
            "- [{}] {} / {}: {}",
            row.status_label, row.domain_label, row.lever_label, row.configuration
        );
    }
}

pub(crate) fn run_report(store: &SessionStore, args: ReportArgs) -> Result<(), AppError> {
    let session = store.load()?;
    let report = session.report();

    if args.json {
        print_json(&report);
    } else {
        render_kpis(&report.entity_name, &report.kpis);

        println!("\nScopes");
        for row in &report.scopes.rows {
            println!(
                "- {}: {:.2} t ({:.0}%, {} entries)",
                row.scope_label, row.impact_t, row.share_pct, row.entries
            );
        }

        println!("\nPareto of items");
        for row in &report.pareto {
            println!(
                "- {}: {:.1} kg (cumulative {:.0}%)",
                row.item, row.impact_kgco2, row.cumulative_pct
            );
        }

        println!("\nTop emitters");
        for emitter in &report.top_emitters {
            println!(
                "- {} / {}: {:.1} kg",
                emitter.category, emitter.item, emitter.impact_kgco2
            );
        }

        if !report.insights.is_empty() {
            println!("\nInsights");
            for insight in &report.insights {
                println!("- {}: {}", insight.kind_label, insight.message);
            }
        }
    }

    if let Some(path) = args.export_csv {
        export_ledger_to_path(&path, session.ledger())?;
        eprintln!("ledger exported to {}", path.display());
    }
    Ok(())
}

pub(crate) fn run_import(store: &SessionStore, args: ImportArgs) -> Result<(), AppError> {
    let mut session = store.load()?;
    let import = LedgerCsvImporter::from_path(&args.path, store.today())?;

    println!(
        "{} rows imported, {} rejected",
        import.imported,
        import.rejected.len()
    );
    for row in &import.rejected {
        println!("- line {}: {}", row.line, row.reason);
    }

    if args.dry_run {
        println!("Dry run: ledger left unchanged");
        return Ok(());
    }

    session.replace_ledger(import.ledger);
    store.save(&session)?;
    println!("Ledger replaced; saved to {}", store.path().display());
    Ok(())
}

pub(crate) fn run_calendar(store: &SessionStore, command: CalendarCommand) -> Result<(), AppError> {
    let (days, apply) = match command {
        CalendarCommand::Estimate {
            start,
            end,
            vacation_weeks,
            days_per_week,
            apply,
        } => {
            let days = operating_days_between(start, end, vacation_weeks, days_per_week)?;
            println!(
                "{start} -> {end}: {} weeks, minus {vacation_weeks} vacation weeks, {days_per_week} days/week",
                (end - start).num_days() / 7
            );
            (days, apply)
        }
        CalendarCommand::Import { path, apply } => {
            let calendar = CalendarCsvImporter::from_path(path)?;
            println!("{} rows read", calendar.rows);
            for (kind, count) in &calendar.tally {
                println!("- {kind}: {count}");
            }
            (calendar.operating_days(), apply)
        }
    };

    println!("Operating days: {days}");
    if apply {
        let mut session = store.load()?;
        session.settings_mut().operating_days = days;
        store.save(&session)?;
        println!("Applied to {}", session.settings().entity_name);
    }
    Ok(())
}

pub(crate) fn run_clear(store: &SessionStore) -> Result<(), AppError> {
    let mut session = store.load()?;
    session.clear_ledger();
    store.save(&session)?;
    println!("Ledger cleared");
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to render JSON: {err}"),
    }
}
