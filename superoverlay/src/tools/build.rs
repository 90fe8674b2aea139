use crate::tools::{SourceArgs, TilingArgs, base_name};
use anyhow::Result;
use std::path::Path;
use superoverlay::kml::generate_metadata_tree;
use superoverlay::progress::get_progress_bar;
use superoverlay::tiler::generate_tiles;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	source: SourceArgs,

	/// directory the tiles and metadata documents are written into
	#[arg()]
	output_dir: String,

	#[command(flatten)]
	tiling: TilingArgs,

	/// base name of the root document; defaults to the input's file stem
	#[arg(long, value_name = "name")]
	name: Option<String>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!(
		"build pyramid from {:?} to {:?}",
		arguments.source.input, arguments.output_dir
	);

	let mut raster = arguments.source.open()?;
	let options = arguments.tiling.to_options()?;
	let out_dir = Path::new(&arguments.output_dir);

	let progress = get_progress_bar("tiles", 0);
	generate_tiles(&mut raster, &options, out_dir, &*progress)?;

	// the tile run left the raster with exactly the overviews the tree
	// enumeration needs
	let name = base_name(&arguments.source.input, arguments.name.as_deref());
	generate_metadata_tree(&raster, arguments.tiling.tile_size, out_dir, &name)?;

	Ok(())
}
