// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;

use dispensary_finder::{
    company_message, dispensary_message, logging, DataArgs, Finder, LocationSelection,
    ReferenceData,
};

#[derive(Debug, Parser)]
#[command(name = "dispensary-finder", version, about = "Dispensary and Company Information Finder")]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// List the cities available for filtering
    Cities,
    /// List the state selector labels
    States,
    /// Find dispensaries by city or state
    Find(FindArgs),
    /// Search companies by state and name
    Companies(CompanyArgs),
}

#[derive(Debug, Args)]
struct FindArgs {
    /// City name (whole-word match against the address)
    #[arg(long, conflicts_with = "state", required_unless_present = "state")]
    city: Option<String>,

    /// State abbreviation or label, e.g. OH or "OH - Ohio"
    #[arg(long)]
    state: Option<String>,

    /// Show details for this dispensary
    #[arg(long)]
    name: Option<String>,

    /// Print JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct CompanyArgs {
    /// State abbreviation or label
    #[arg(long)]
    state: Option<String>,

    /// Part of the company legal name
    #[arg(long, default_value = "")]
    name: String,

    /// Print JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.data.verbose);

    let data = ReferenceData::load(&cli.data.to_config())?;
    let finder = Finder::new(Arc::new(data));

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => run_ui_mode(finder)?,
        Command::Cities => {
            for city in finder.cities() {
                println!("{}", city);
            }
        }
        Command::States => {
            for label in finder.state_labels() {
                println!("{}", label);
            }
        }
        Command::Find(args) => run_find(&finder, args)?,
        Command::Companies(args) => run_companies(&finder, args)?,
    }

    Ok(())
}

fn run_find(finder: &Finder, args: FindArgs) -> Result<()> {
    let selection = match (args.city, args.state) {
        (Some(city), _) => LocationSelection::City(city),
        (None, state) => LocationSelection::State(state.unwrap_or_default()),
    };

    if let Some(name) = args.name {
        match finder.dispensary_detail(&selection, &name) {
            Ok(detail) if args.json => println!("{}", serde_json::to_string_pretty(&detail)?),
            Ok(detail) => {
                println!("Name:         {}", detail.name);
                println!("Address:      {}", detail.address);
                println!("Phone Number: {}", detail.phone_number);
                println!("Map:          {}", detail.map_link);
            }
            Err(e) => println!("{}", dispensary_message(&selection, &e)),
        }
        return Ok(());
    }

    match finder.find_dispensaries(&selection) {
        Ok(records) if args.json => println!("{}", serde_json::to_string_pretty(&records)?),
        Ok(records) => {
            println!("{} dispensaries in {}", records.len(), selection);
            for record in records {
                println!("  {:<32} {:<48} {}", record.name, record.address, record.phone_number);
            }
        }
        Err(e) => println!("{}", dispensary_message(&selection, &e)),
    }

    Ok(())
}

fn run_companies(finder: &Finder, args: CompanyArgs) -> Result<()> {
    let state = args.state.as_deref();

    match finder.find_companies(state, &args.name) {
        Ok(records) if args.json => println!("{}", serde_json::to_string_pretty(&records)?),
        Ok(records) => {
            for company in records {
                println!(
                    "  {:<36} {:<36} {}",
                    company.legal_name.as_deref().unwrap_or("-"),
                    company.emails,
                    company.phone
                );
            }
        }
        Err(e) => println!("{}", company_message(state, &args.name, &e)),
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(finder: Finder) -> Result<()> {
    let mut app = ui::App::new(finder);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_finder: Finder) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI: dispensary-finder find --state OH");
    std::process::exit(1);
}
