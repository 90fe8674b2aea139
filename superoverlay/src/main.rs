mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Show information about a raster: size, bands, extent, pyramid depth
	Probe(tools::probe::Subcommand),

	/// Generate the tile pyramid of a raster
	Tiles(tools::tiles::Subcommand),

	/// Generate the KML metadata tree of a raster
	Kml(tools::kml::Subcommand),

	#[clap(alias = "generate")]
	/// Generate tiles and metadata tree in one run
	Build(tools::build::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Probe(arguments) => tools::probe::run(arguments),
		Commands::Tiles(arguments) => tools::tiles::run(arguments),
		Commands::Kml(arguments) => tools::kml::run(arguments),
		Commands::Build(arguments) => tools::build::run(arguments),
	}
}
