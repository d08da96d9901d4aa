use clap::{Parser, Subcommand, ValueEnum};
use glimind_core::history::{latest_reading, Period};
use glimind_core::ingest::{Confirmation, FoodSelection, PreparedReading, ReadingDraft};
use glimind_core::stats::{critical_alert, needs_check};
use glimind_core::wal::{read_readings, READINGS_FILE};
use glimind_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "glimind")]
#[command(about = "Glucose log and insulin advisory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where the midday flag comes from
    #[arg(long, global = true, value_enum)]
    timing: Option<TimingArg>,

    /// Recommendation text style
    #[arg(long, global = true, value_enum)]
    wording: Option<WordingArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimingArg {
    Clock,
    MealTag,
}

impl From<TimingArg> for TimingPolicy {
    fn from(arg: TimingArg) -> Self {
        match arg {
            TimingArg::Clock => TimingPolicy::Clock,
            TimingArg::MealTag => TimingPolicy::MealTag,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WordingArg {
    Generic,
    Dosed,
}

impl From<WordingArg> for Wording {
    fn from(arg: WordingArg) -> Self {
        match arg {
            WordingArg::Generic => Wording::Generic,
            WordingArg::Dosed => Wording::Dosed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the advisory for a glucose value without saving anything
    Classify {
        /// Glucose value in mg/dL
        #[arg(long, allow_hyphen_values = true)]
        glucose: String,

        /// Measurement time (YYYY-MM-DDTHH:mm); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Meal context (fasting, pre_lunch, ...)
        #[arg(long)]
        meal_type: Option<String>,

        /// Print the alert as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a glucose reading
    Log {
        /// Glucose value in mg/dL
        #[arg(long, allow_hyphen_values = true)]
        glucose: String,

        /// Measurement time (YYYY-MM-DDTHH:mm); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Meal context (fasting, pre_lunch, ...)
        #[arg(long, default_value = "fasting")]
        meal_type: String,

        /// Food eaten: NAME@CATEGORY, NAME@CATEGORY! (high glycemic) or custom:NAME
        #[arg(long = "food")]
        foods: Vec<String>,

        /// Free-text note
        #[arg(long)]
        notes: Option<String>,

        /// Insulin was applied with the suggested units
        #[arg(long, conflicts_with = "no_insulin")]
        insulin_applied: bool,

        /// Insulin units actually applied (implies --insulin-applied)
        #[arg(long, conflicts_with = "no_insulin")]
        units: Option<u32>,

        /// No insulin was applied
        #[arg(long)]
        no_insulin: bool,

        /// Skip the prompt; records no insulin unless --insulin-applied or --units is given
        #[arg(long, short = 'y')]
        yes: bool,

        /// Show the advisory without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// List recent readings with their advisories
    History {
        /// 24h, 7d or 30d
        #[arg(long, default_value = "7d")]
        period: String,
    },

    /// Summary statistics for a period
    Stats {
        /// 24h, 7d or 30d
        #[arg(long, default_value = "7d")]
        period: String,
    },

    /// Export readings to CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,

        /// 24h, 7d or 30d
        #[arg(long, default_value = "30d")]
        period: String,
    },
}

fn main() -> Result<()> {
    glimind_core::logging::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if matches!(e, Error::InvalidGlucose(_) | Error::InvalidTimestamp(_)) {
            eprintln!("Informe um valor válido. {}", e);
        }
        return Err(e);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(timing) = cli.timing {
        config.advisory.timing = timing.into();
    }
    if let Some(wording) = cli.wording {
        config.advisory.wording = wording.into();
    }

    let errors = DosageTable::standard().validate();
    if !errors.is_empty() {
        eprintln!("Dosage table validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid dosage table".into()));
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let advisor = config.advisory.advisor();
    tracing::debug!(?advisor, data_dir = %data_dir.display(), "Resolved configuration");

    match cli.command {
        Commands::Classify {
            glucose,
            at,
            meal_type,
            json,
        } => cmd_classify(&advisor, &config, glucose, at, meal_type, json),
        Commands::Log {
            glucose,
            at,
            meal_type,
            foods,
            notes,
            insulin_applied,
            units,
            no_insulin,
            yes,
            dry_run,
        } => {
            let foods = foods
                .iter()
                .map(|f| f.parse::<FoodSelection>())
                .collect::<Result<Vec<_>>>()?;
            let draft = ReadingDraft {
                glucose,
                measured_at: at.unwrap_or_else(now_string),
                meal_type: meal_type.parse()?,
                foods,
                notes,
            };
            let decision = InsulinDecision {
                insulin_applied,
                units,
                no_insulin,
                yes,
            };
            cmd_log(&data_dir, &advisor, &config, draft, decision, dry_run)
        }
        Commands::History { period } => cmd_history(&data_dir, &advisor, period.parse()?),
        Commands::Stats { period } => {
            cmd_stats(&data_dir, &advisor, &config, period.parse()?)
        }
        Commands::Export { out, period } => {
            cmd_export(&data_dir, &advisor, &out, period.parse()?)
        }
    }
}

fn now() -> MeasuredAt {
    chrono::Local::now().naive_local()
}

fn now_string() -> String {
    now().format(classifier::MEASURED_AT_FORMAT).to_string()
}

fn readings_path(data_dir: &Path) -> PathBuf {
    data_dir.join(READINGS_FILE)
}

fn cmd_classify(
    advisor: &Advisor,
    config: &Config,
    glucose: String,
    at: Option<String>,
    meal_type: Option<String>,
    json: bool,
) -> Result<()> {
    let glucose_mg_dl = ingest::parse_glucose(&glucose, &config.validation)?;
    let measured_at = match at {
        Some(at) => parse_measured_at(&at)?,
        None => now(),
    };

    let mut measurement = Measurement::new(glucose_mg_dl, measured_at);
    if let Some(meal_type) = meal_type {
        measurement = measurement.with_meal_type(meal_type.parse()?);
    }

    let alert = advisor.classify(&measurement);

    if json {
        println!("{}", serde_json::to_string_pretty(&alert)?);
    } else {
        display_alert(&alert);
    }
    Ok(())
}

struct InsulinDecision {
    insulin_applied: bool,
    units: Option<u32>,
    no_insulin: bool,
    yes: bool,
}

fn cmd_log(
    data_dir: &Path,
    advisor: &Advisor,
    config: &Config,
    draft: ReadingDraft,
    decision: InsulinDecision,
    dry_run: bool,
) -> Result<()> {
    let prepared = prepare(draft, advisor, &config.validation)?;

    display_alert(&prepared.advisory);
    if prepared.has_high_glycemic_food() {
        println!("  ⚠ Refeição com alimentos de alto índice glicêmico");
        println!();
    }

    if dry_run {
        println!("[Dry run - reading not saved]");
        return Ok(());
    }

    let confirmation = if let Some(units) = decision.units {
        Confirmation::applied(units)
    } else if decision.insulin_applied {
        Confirmation::accept_suggestion()
    } else if decision.no_insulin || decision.yes {
        Confirmation::not_applied()
    } else {
        prompt_confirmation(&prepared)?
    };

    let reading = prepared.confirm(confirmation)?;

    let mut sink = JsonlSink::new(readings_path(data_dir));
    sink.append(&reading)?;

    match reading.insulin_units {
        Some(units) => println!("✓ Reading saved ({} mg/dL, {} units)", reading.glucose_mg_dl, units),
        None => println!("✓ Reading saved ({} mg/dL)", reading.glucose_mg_dl),
    }
    Ok(())
}

fn prompt_confirmation(prepared: &PreparedReading) -> Result<Confirmation> {
    println!("─────────────────────────────────────────");
    let suggested = prepared.suggested_units().filter(|&u| u > 0);
    match suggested {
        Some(units) => {
            println!("Suggested insulin: {} units", units);
            println!("Press Enter to confirm the suggestion");
            println!("  a number + Enter to record a different dose");
            println!("  'n' + Enter if no insulin was applied");
        }
        None => {
            println!("No insulin suggested");
            println!("Press Enter if no insulin was applied");
            println!("  a number + Enter to record the units applied");
        }
    }
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();

    let confirmation = match input.as_str() {
        "n" => Confirmation::not_applied(),
        "" if suggested.is_some() => Confirmation::accept_suggestion(),
        "" => Confirmation::not_applied(),
        other => {
            let units = other.parse::<u32>().map_err(|_| {
                Error::Ingestion(format!("'{}' is not a valid unit count", other))
            })?;
            Confirmation::applied(units)
        }
    };

    Ok(confirmation)
}

fn cmd_history(data_dir: &Path, advisor: &Advisor, period: Period) -> Result<()> {
    let readings = load_recent_readings(&readings_path(data_dir), now(), period.days())?;

    if readings.is_empty() {
        println!("No readings in the last {} days.", period.days());
        return Ok(());
    }

    for entry in with_advisories(readings, advisor) {
        let reading = &entry.reading;
        let insulin = match (reading.insulin_applied, reading.insulin_units) {
            (true, Some(units)) => format!(" • {} unidades de insulina", units),
            _ => String::new(),
        };
        println!(
            "{}  {:>4} mg/dL  {:<15} [{}] {}{}",
            reading.measured_at.format("%d/%m/%Y %H:%M"),
            reading.glucose_mg_dl,
            reading.meal_type.label(),
            entry.advisory.severity.as_str().to_uppercase(),
            entry.advisory.message,
            insulin
        );
        for item in &reading.food_items {
            let marker = if item.high_glycemic { " (Alto IG)" } else { "" };
            println!("      • {}{}", item.name, marker);
        }
        if let Some(ref notes) = reading.notes {
            println!("      Obs: {}", notes);
        }
    }

    Ok(())
}

fn cmd_stats(data_dir: &Path, advisor: &Advisor, config: &Config, period: Period) -> Result<()> {
    let path = readings_path(data_dir);
    let current = now();
    let readings = load_recent_readings(&path, current, period.days())?;
    let stats = GlucoseStats::from_readings(&readings);

    println!("Last {} days", period.days());
    println!("  Readings:       {}", stats.total);
    if stats.total > 0 {
        println!("  Average:        {} mg/dL", stats.average);
        println!("  Lowest:         {} mg/dL", stats.min);
        println!("  Highest:        {} mg/dL", stats.max);
        println!(
            "  In range:       {} ({}%)",
            stats.in_range,
            stats.time_in_range_percent()
        );
        println!("  Total insulin:  {} units", stats.total_insulin);
        println!();
        println!("  Distribution");
        println!("    Muito Baixa (<54):   {}", stats.distribution.very_low);
        println!("    Baixa (54-69):       {}", stats.distribution.low);
        println!("    Normal (70-180):     {}", stats.distribution.normal);
        println!("    Alta (181-250):      {}", stats.distribution.high);
        println!("    Muito Alta (>250):   {}", stats.distribution.very_high);
        println!();
        println!("  By meal");
        for (meal, meal_stats) in &stats.by_meal_type {
            println!(
                "    {:<16} {:>4} mg/dL ({} readings)",
                meal.label(),
                meal_stats.average,
                meal_stats.count
            );
        }
    }

    let all = read_readings(&path)?;
    let latest = latest_reading(&all);
    if let Some(reading) = latest {
        if let Some(alert) = critical_alert(reading, advisor) {
            println!();
            println!(
                "🚨 Última glicemia em nível crítico: {} mg/dL ({})",
                reading.glucose_mg_dl,
                reading.measured_at.format("%d/%m/%Y %H:%M")
            );
            println!("   {}", alert.message);
            if let Some(ref recommendation) = alert.recommendation {
                println!("   {}", recommendation);
            }
        }
    }

    if needs_check(
        latest,
        current,
        config.monitoring.recheck_after_hours,
    ) {
        println!();
        println!(
            "⏰ Time for a new measurement (none in the last {} hours)",
            config.monitoring.recheck_after_hours
        );
    }

    Ok(())
}

fn cmd_export(data_dir: &Path, advisor: &Advisor, out: &Path, period: Period) -> Result<()> {
    let mut readings = load_recent_readings(&readings_path(data_dir), now(), period.days())?;
    readings.reverse();

    let count = export_csv(&readings, advisor, out)?;
    println!("✓ Exported {} readings", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn display_alert(alert: &AlertResult) {
    let marker = match alert.severity {
        Severity::Danger => "✖",
        Severity::Warning => "⚠",
        Severity::Success => "✓",
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} {}", marker, alert.message);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Severity: {}", alert.severity.as_str());
    if let Some(ref recommendation) = alert.recommendation {
        println!("  {}", recommendation);
    }
    if let Some(units) = alert.insulin_units {
        println!("  Suggested insulin: {} units", units);
    }
    println!();
}
