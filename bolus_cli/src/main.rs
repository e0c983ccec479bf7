use bolus_core::*;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

const NUTRIENT_HEADERS: [&str; 5] = ["Food", "Calories", "Fat", "Carbohydrates", "Protein"];
const DOSE_HEADERS: [&str; 3] = ["Type", "Insulin Amount", "For Amount of Carbohydrates"];
const INJECTION_HEADERS: [&str; 3] = ["Type", "Amount", "Date and Time"];

#[derive(Parser)]
#[command(name = "bolus")]
#[command(about = "Personal insulin dosing assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable ANSI colours in output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a meal's nutrients and suggest a short-acting dose
    Calculate {
        /// Free-text meal description, e.g. "200g potatoes and orange juice"
        food: String,
    },

    /// View the configured insulin doses
    Doses,

    /// Update one insulin dose ratio
    Update {
        /// Insulin type (short, long)
        kind: String,

        /// Units of insulin to inject
        #[arg(long)]
        insulin_amount: u32,

        /// Grams of carbohydrate the units cover (short doses only)
        #[arg(long, default_value_t = 0)]
        carbs_amount: u32,
    },

    /// Record a new injection
    Add {
        /// Insulin type (short, long)
        #[arg(long)]
        kind: String,

        /// Units injected
        #[arg(long)]
        amount: u32,

        /// Timestamp "YYYY-MM-DD HH:MM"; defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// View today's injections
    View,
}

fn main() -> Result<()> {
    bolus_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    let style = Style {
        color: !cli.no_color,
    };

    match cli.command {
        Commands::Calculate { food } => cmd_calculate(&config, &food, style),
        Commands::Doses => cmd_doses(&config, style),
        Commands::Update {
            kind,
            insulin_amount,
            carbs_amount,
        } => cmd_update(&config, &kind, insulin_amount, carbs_amount, style),
        Commands::Add { kind, amount, at } => cmd_add(&config, &kind, amount, at.as_deref(), style),
        Commands::View => cmd_view(&config, style),
    }
}

fn dose_store(config: &Config) -> Result<DoseStore> {
    let (short, long) = config.doses.seed_doses()?;
    Ok(DoseStore::with_seed(config.dose_store_path(), short, long))
}

fn cmd_calculate(config: &Config, food: &str, style: Style) -> Result<()> {
    let lookup_config = NutritionConfig::new(config.lookup.resolve_api_key()?)
        .with_base_url(config.lookup.base_url.as_str())
        .with_timeout(Duration::from_secs(config.lookup.timeout_secs));
    let client = NutritionClient::new(lookup_config)?;

    // Lookup failures degrade to the no-data message; retrying is the
    // user's call, not ours.
    let items = match client.lookup(food) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Nutrition lookup failed: {}", e);
            println!(
                "{}",
                style.warn("Could not retrieve nutrition data for this food.")
            );
            return Ok(());
        }
    };

    let totals = aggregate(&items);
    let rows = match format_report(&items, &totals) {
        Some(rows) => rows,
        None => {
            println!("{}", style.warn("Unknown food - nothing to calculate."));
            return Ok(());
        }
    };

    println!();
    print_table(&NUTRIENT_HEADERS, &rows, style);

    let ratio = dose_store(config)?.get(InsulinKind::Short)?;
    let units = suggest_insulin(&totals, &ratio)?;

    println!();
    println!(
        "{}",
        style.ok(&format!(
            "Suggested short-acting insulin: {} units (ratio {}u/{}g)",
            units,
            ratio.insulin_amount(),
            ratio.carbs_amount()
        ))
    );
    Ok(())
}

fn cmd_doses(config: &Config, style: Style) -> Result<()> {
    let doses = dose_store(config)?.load()?;

    let rows: Vec<Vec<String>> = doses
        .values()
        .map(|dose| {
            vec![
                capitalize(dose.kind().as_str()),
                dose.insulin_amount().to_string(),
                dose.carbs_amount().to_string(),
            ]
        })
        .collect();

    println!();
    print_table(&DOSE_HEADERS, &rows, style);
    Ok(())
}

fn cmd_update(
    config: &Config,
    kind: &str,
    insulin_amount: u32,
    carbs_amount: u32,
    style: Style,
) -> Result<()> {
    let kind: InsulinKind = kind.parse()?;
    let dose = Dose::new(kind, insulin_amount, carbs_amount)?;

    dose_store(config)?.upsert(&dose)?;

    match kind {
        InsulinKind::Short => println!(
            "{}",
            style.ok(&format!(
                "Saved short dose: {} units per {} g of carbohydrates.",
                dose.insulin_amount(),
                dose.carbs_amount()
            ))
        ),
        InsulinKind::Long => println!(
            "{}",
            style.ok(&format!("Saved long dose: {} units.", dose.insulin_amount()))
        ),
    }
    Ok(())
}

fn cmd_add(
    config: &Config,
    kind: &str,
    amount: u32,
    at: Option<&str>,
    style: Style,
) -> Result<()> {
    let kind: InsulinKind = kind.parse()?;
    let timestamp = match at {
        Some(s) => Injection::parse_timestamp(s)?,
        None => Injection::timestamp_now(),
    };
    let injection = Injection::new(kind, amount, timestamp)?;

    InjectionStore::new(config.injection_log_path()).append(&injection)?;

    println!(
        "{}",
        style.ok(&format!(
            "Recorded {} injection of {} units at {}.",
            injection.kind(),
            injection.amount(),
            injection.timestamp_string()
        ))
    );
    Ok(())
}

fn cmd_view(config: &Config, style: Style) -> Result<()> {
    let store = InjectionStore::new(config.injection_log_path());
    let today = Local::now().date_naive();

    match store.list_for_date(today)? {
        None => println!("{}", style.warn("No injections recorded today.")),
        Some(injections) => {
            let rows: Vec<Vec<String>> = injections
                .iter()
                .map(|injection| {
                    vec![
                        capitalize(injection.kind().as_str()),
                        injection.amount().to_string(),
                        injection.timestamp_string(),
                    ]
                })
                .collect();

            println!();
            print_table(&INJECTION_HEADERS, &rows, style);
        }
    }
    Ok(())
}

/// Stateless output styling handed to the renderer
#[derive(Clone, Copy)]
struct Style {
    color: bool,
}

impl Style {
    fn header(&self, s: &str) -> String {
        self.paint("1", s)
    }

    fn ok(&self, s: &str) -> String {
        self.paint("92", s)
    }

    fn warn(&self, s: &str) -> String {
        self.paint("93", s)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        } else {
            s.to_string()
        }
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>], style: Style) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", style.header(header_line.trim_end()));

    let rule = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", rule);

    for row in rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
