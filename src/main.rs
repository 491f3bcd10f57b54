mod cmd;
mod domain;
mod money;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "importc",
    version,
    about = "Landed-cost calculator for importing vehicles into southern Africa"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the landed cost of a vehicle
    Estimate(cmd::estimate::EstimateCommand),
    /// Show duty, VAT and fee presets per destination
    Countries(cmd::countries::CountriesCommand),
    /// Check which paid content tier an identity holds
    Access(cmd::access::AccessCommand),
    /// List saved calculations
    History(cmd::history::HistoryCommand),
    /// Export a saved calculation as an HTML document
    Export(cmd::export::ExportCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Estimate(cmd) => cmd.exec(),
        Command::Countries(cmd) => cmd.exec(),
        Command::Access(cmd) => cmd.exec(),
        Command::History(cmd) => cmd.exec(),
        Command::Export(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
