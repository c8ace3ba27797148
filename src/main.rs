//! Range Bar - command line entry point
//!
//! Resolves dashboard addresses into committed ranges and replays scripted
//! interaction against the top-bar controller.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use range_bar::{
    config::Config,
    controller::{ControllerOptions, RangeController},
    display::{
        describe_transition, display_presets, display_snapshot, print_section_simple, Snapshot,
    },
    error::Result,
    location::PageLocation,
    preset::{Clock, FixedClock, PresetCatalog, SystemClock},
    query::parse_day,
    script::parse_script,
};

#[derive(Parser)]
#[command(name = "range-bar")]
#[command(author, version, about = "Dashboard date-range controller")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Treat this day as today (YYYY-MM-DD)
    #[arg(long, global = true, env = "RANGE_BAR_TODAY", value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the preset catalog
    Presets,

    /// Seed a controller from an address and show the result
    Resolve {
        /// Page address, e.g. "/dashboard?from=2026-01-01&to=2026-01-03"
        url: String,
    },

    /// Replay interaction events against a controller
    Simulate {
        /// Page address the controller is seeded from
        url: String,

        /// Events such as open, pick:2026-01-10..2026-01-12, preset:today, escape
        #[arg(required = true)]
        events: Vec<String>,
    },

    /// Show or edit configuration
    Config {
        /// Print current configuration
        #[arg(long)]
        show: bool,

        /// Create default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn parse_today(input: &str) -> std::result::Result<NaiveDate, String> {
    parse_day(input).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load and validate configuration
    let config = if let Some(ref path) = cli.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };
    config.validate()?;

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.general.log_level.to_lowercase()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let clock = FixedClock(cli.today.unwrap_or_else(|| SystemClock.today()));

    match cli.command {
        Some(Commands::Presets) | None => run_presets(clock, cli.json),

        Some(Commands::Resolve { url }) => run_resolve(&config, clock, &url, cli.json),

        Some(Commands::Simulate { url, events }) => {
            run_simulate(&config, clock, &url, &events, cli.json)
        }

        Some(Commands::Config { show, init }) => {
            if init {
                let default_config = Config::default();
                default_config.save()?;
                println!(
                    "Created default configuration at {}",
                    Config::config_path()?.display()
                );
            } else if show {
                let contents = toml::to_string_pretty(&config)?;
                println!("{contents}");
            } else {
                println!("Configuration path: {}", Config::config_path()?.display());
            }
            Ok(())
        }
    }
}

fn run_presets(clock: FixedClock, json: bool) -> Result<()> {
    let catalog = PresetCatalog::new(clock.today());

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.presets())?);
        return Ok(());
    }

    print_section_simple(&format!("PRESETS FOR {}", catalog.anchor()));
    display_presets(&catalog, None);
    Ok(())
}

fn build_controller(
    config: &Config,
    clock: FixedClock,
    url: &str,
) -> Result<RangeController<PageLocation, FixedClock>> {
    let location = PageLocation::parse(url, config.query.clone())?;
    Ok(RangeController::with_clock(
        location,
        clock,
        ControllerOptions::from(config),
    ))
}

fn run_resolve(config: &Config, clock: FixedClock, url: &str, json: bool) -> Result<()> {
    let controller = build_controller(config, clock, url)?;
    let snapshot = Snapshot::capture(&controller, controller.port().href());

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    print_section_simple("RANGE");
    display_snapshot(&snapshot);
    print_section_simple("PRESETS");
    display_presets(controller.catalog(), Some(controller.committed()));
    Ok(())
}

fn run_simulate(
    config: &Config,
    clock: FixedClock,
    url: &str,
    tokens: &[String],
    json: bool,
) -> Result<()> {
    let events = parse_script(tokens)?;
    let mut controller = build_controller(config, clock, url)?;

    let mut steps = Vec::with_capacity(events.len());
    if !json {
        print_section_simple("INITIAL");
        display_snapshot(&Snapshot::capture(&controller, controller.port().href()));
    }

    for (token, event) in tokens.iter().zip(events) {
        let transition = controller.handle(event);
        let snapshot = Snapshot::capture(&controller, controller.port().href());

        if json {
            steps.push(serde_json::json!({
                "event": token,
                "transition": describe_transition(&transition),
                "state": snapshot,
            }));
        } else {
            print_section_simple(&format!("{token} -> {}", describe_transition(&transition)));
            display_snapshot(&snapshot);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&steps)?);
    } else {
        println!(
            "\nAddress rewrites: {}, history entries: {}",
            controller.port().replacements(),
            controller.port().history_len()
        );
    }
    Ok(())
}
