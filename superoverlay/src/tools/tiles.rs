use crate::tools::{SourceArgs, TilingArgs};
use anyhow::Result;
use std::path::Path;
use superoverlay::progress::get_progress_bar;
use superoverlay::tiler::generate_tiles;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	source: SourceArgs,

	/// directory the tiles are written into
	#[arg()]
	output_dir: String,

	#[command(flatten)]
	tiling: TilingArgs,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("tiles from {:?} to {:?}", arguments.source.input, arguments.output_dir);

	let mut raster = arguments.source.open()?;
	let options = arguments.tiling.to_options()?;

	let progress = get_progress_bar("tiles", 0);
	generate_tiles(&mut raster, &options, Path::new(&arguments.output_dir), &*progress)?;

	Ok(())
}
