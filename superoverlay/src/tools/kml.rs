use crate::tools::{SourceArgs, base_name};
use anyhow::Result;
use std::path::Path;
use superoverlay::kml::generate_metadata_tree;
use superoverlay::{RasterSource, plan_pyramid, pyramid};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	source: SourceArgs,

	/// directory the metadata documents are written into
	#[arg()]
	output_dir: String,

	/// edge length of the square tiles in pixels, a power of two
	#[arg(long, value_name = "int", default_value = "256")]
	tile_size: u32,

	/// base name of the root document; defaults to the input's file stem
	#[arg(long, value_name = "name")]
	name: Option<String>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("kml from {:?} to {:?}", arguments.source.input, arguments.output_dir);

	let mut raster = arguments.source.open()?;

	let level_count = plan_pyramid(arguments.tile_size, raster.width(), raster.height())?;
	pyramid::reconcile_overviews(&mut raster, level_count)?;

	let name = base_name(&arguments.source.input, arguments.name.as_deref());
	generate_metadata_tree(&raster, arguments.tile_size, Path::new(&arguments.output_dir), &name)?;

	Ok(())
}
