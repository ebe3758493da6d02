use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use eco_rank::config::{expand_home, load_config, validate_config, Config};
use eco_rank::filter::FilterSet;
use eco_rank::output::{
    format_breakdown, format_comparison, format_page_table, format_profile, format_vehicle, should_use_colors, to_json,
    write_json,
};
use eco_rank::query::{
    compare, rank, search, show, Comparison, Paging, RankPage, RankQuery, SearchQuery, SortMode, VehicleSelector,
    DEFAULT_PAGE,
};
use eco_rank::scoring::{validate_profiles, weights, ScoredVehicle, PROFILES};
use eco_rank::table::{load_table, Table};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_TABLE: i32 = 2;
const EXIT_SCHEMA: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Args, Debug, Default)]
struct PageArgs {
    /// Weight profile 1-5 (1 Subcompact .. 5 SUV); others fall back to 1
    #[arg(long)]
    profile: Option<i64>,

    /// Page number, 1-based
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    page: usize,

    /// Results per page (1-200)
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank vehicles matching structured filters (default if no subcommand)
    Rank {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        engine: Option<String>,
        #[arg(long)]
        transmission: Option<String>,
        /// "sim", "s", "true" or "1" to require air conditioning
        #[arg(long)]
        air_conditioning: Option<String>,
        #[arg(long)]
        power_steering: Option<String>,
        #[arg(long)]
        fuel: Option<String>,

        /// Order by the table's "Final Score" column instead
        #[arg(long)]
        precomputed: bool,

        #[command(flatten)]
        paging: PageArgs,
    },
    /// Free-text search over brand, model and year with fuzzy fallback
    Search {
        #[arg(required = true)]
        text: Vec<String>,

        #[command(flatten)]
        paging: PageArgs,
    },
    /// Show one vehicle with its score within the whole table
    Show {
        /// Vehicle code, or BRAND/MODEL[/YEAR]
        vehicle: VehicleSelector,

        #[arg(long)]
        profile: Option<i64>,
    },
    /// Compare two vehicles metric by metric
    Compare {
        /// Vehicle code, or BRAND/MODEL[/YEAR]
        left: VehicleSelector,
        right: VehicleSelector,

        #[arg(long)]
        profile: Option<i64>,
    },
    /// Show effective weights of one or all profiles
    Profiles {
        #[arg(long)]
        profile: Option<i64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "eco-rank")]
#[command(about = "Rank vehicles by emissions and efficiency", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/eco-rank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Vehicle table (CSV); overrides `table` in the config
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    /// Also write the results as JSON to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &eco_rank::Error) -> i32 {
    match err {
        eco_rank::Error::NotFound { .. } | eco_rank::Error::Parse { .. } => EXIT_TABLE,
        eco_rank::Error::Schema { .. } => EXIT_SCHEMA,
        eco_rank::Error::VehicleNotFound { .. } => EXIT_FAILURE,
    }
}

fn open_table(cli_table: Option<PathBuf>, config: &Config) -> Table {
    let Some(path) = cli_table.or_else(|| config.table.clone()) else {
        eprintln!("No vehicle table given. Pass --table or set `table` in the config file.");
        std::process::exit(EXIT_TABLE);
    };
    let path = expand_home(&path);

    let start = Instant::now();
    match load_table(&path, &config.load_options()) {
        Ok(table) => {
            debug!(rows = table.len(), elapsed = ?start.elapsed(), "table loaded");
            table
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(exit_code(&e));
        }
    }
}

fn resolve_paging(args: &PageArgs, config: &Config) -> (i64, Paging) {
    let profile = args.profile.unwrap_or(i64::from(config.profile));
    let page_size = args.page_size.unwrap_or(config.page_size);
    (profile, Paging::new(args.page, page_size))
}

/// What a command produced
enum Outcome {
    Page(RankPage),
    Vehicle(Box<ScoredVehicle>),
    Comparison(Box<Comparison>),
}

impl Outcome {
    fn to_json(&self) -> anyhow::Result<String> {
        match self {
            Outcome::Page(page) => to_json(page),
            Outcome::Vehicle(scored) => to_json(scored),
            Outcome::Comparison(cmp) => to_json(cmp),
        }
    }

    fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        match self {
            Outcome::Page(page) => write_json(path, page),
            Outcome::Vehicle(scored) => write_json(path, scored),
            Outcome::Comparison(cmp) => write_json(path, cmp),
        }
    }

    fn to_text(&self, use_colors: bool) -> String {
        match self {
            Outcome::Page(page) => format_page_table(page, use_colors),
            Outcome::Vehicle(scored) => format_vehicle(scored),
            Outcome::Comparison(cmp) => format_comparison(cmp, use_colors),
        }
    }
}

fn emit(outcome: &Outcome, format: Format, output: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", outcome.to_json()?),
        Format::Table => {
            println!("{}", outcome.to_text(should_use_colors()));
            if let (true, Outcome::Page(page)) = (verbose, outcome) {
                for scored in &page.results {
                    eprintln!("{}", format_breakdown(scored));
                }
            }
        }
    }

    if let Some(path) = output {
        outcome.write_json(path)?;
        debug!(path = %path.display(), "results written");
    }
    Ok(())
}

fn lookup_failed(e: eco_rank::Error) -> ! {
    eprintln!("{}", e);
    std::process::exit(exit_code(&e));
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Rank {
        year: None,
        category: None,
        brand: None,
        engine: None,
        transmission: None,
        air_conditioning: None,
        power_steering: None,
        fuel: None,
        precomputed: false,
        paging: PageArgs {
            page: DEFAULT_PAGE,
            ..PageArgs::default()
        },
    });

    // Weight tables are compiled in; a broken one is a configuration error
    if let Err(errors) = validate_profiles() {
        eprintln!("Weight profile errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let config = match load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let outcome = match command {
        Commands::Profiles { profile } => {
            let text = match profile {
                Some(p) => format_profile(weights(p)),
                None => PROFILES
                    .iter()
                    .map(format_profile)
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            };
            println!("{}", text);
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Rank {
            year,
            category,
            brand,
            engine,
            transmission,
            air_conditioning,
            power_steering,
            fuel,
            precomputed,
            paging: page_args,
        } => {
            let table = open_table(cli.table, &config);
            let (profile, paging) = resolve_paging(&page_args, &config);
            let query = RankQuery {
                filters: FilterSet {
                    year,
                    category,
                    brand,
                    engine,
                    transmission,
                    air_conditioning,
                    power_steering,
                    fuel,
                },
                profile,
                paging,
                sort: if precomputed {
                    SortMode::Precomputed
                } else {
                    SortMode::Composite
                },
            };
            Outcome::Page(rank(&table, &query))
        }
        Commands::Search {
            text,
            paging: page_args,
        } => {
            let table = open_table(cli.table, &config);
            let (profile, paging) = resolve_paging(&page_args, &config);
            let query = SearchQuery {
                text: text.join(" "),
                profile,
                paging,
                threshold: config.fuzzy_threshold,
            };
            Outcome::Page(search(&table, &query))
        }
        Commands::Show { vehicle, profile } => {
            let table = open_table(cli.table, &config);
            let profile = profile.unwrap_or(i64::from(config.profile));
            match show(&table, &vehicle, profile) {
                Ok(scored) => Outcome::Vehicle(Box::new(scored)),
                Err(e) => lookup_failed(e),
            }
        }
        Commands::Compare { left, right, profile } => {
            let table = open_table(cli.table, &config);
            let profile = profile.unwrap_or(i64::from(config.profile));
            match compare(&table, &left, &right, profile) {
                Ok(cmp) => Outcome::Comparison(Box::new(cmp)),
                Err(e) => lookup_failed(e),
            }
        }
    };

    if let Err(e) = emit(&outcome, cli.format, cli.output.as_deref(), cli.verbose) {
        eprintln!("Error: {:#}", e);
        std::process::exit(EXIT_FAILURE);
    }

    std::process::exit(EXIT_SUCCESS);
}
