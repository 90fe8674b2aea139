use crate::tools::SourceArgs;
use anyhow::Result;
use std::path::Path;
use superoverlay::kml::image_bbox;
use superoverlay::{MemoryRaster, PixelType, RasterSource, plan_pyramid};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	source: SourceArgs,

	/// tile size used when computing the pyramid depth
	#[arg(long, value_name = "int", default_value = "256")]
	tile_size: u32,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	eprintln!("probe {:?}", arguments.source.input);

	let raster = arguments.source.open()?;
	println!("{}", describe(&raster, &arguments.source.input, arguments.tile_size)?);
	Ok(())
}

fn describe(raster: &MemoryRaster, input: &str, tile_size: u32) -> Result<String> {
	let transform = raster.geo_transform();
	let bbox = image_bbox(raster)?;
	let levels = plan_pyramid(tile_size, raster.width(), raster.height())?;
	let projection = raster.projection();

	let pixel_type = match raster.pixel_type() {
		PixelType::Byte => "Byte",
		PixelType::UInt16 => "UInt16",
	};

	let mut out = String::new();
	out.push_str("Source\n");
	out.push_str(&format!("  Path {input}\n"));
	out.push_str(&format!(
		"  Name {}\n",
		Path::new(input).file_name().map_or_else(String::new, |n| n.to_string_lossy().to_string())
	));
	out.push_str("Raster\n");
	out.push_str(&format!("  Size X/Y {}/{}\n", raster.width(), raster.height()));
	out.push_str(&format!(
		"  Resolution X/Y {:.4}/{:.4}\n",
		transform.pixel_width(),
		-transform.pixel_height()
	));
	out.push_str(&format!("  Number Bands {}\n", raster.band_count()));
	out.push_str(&format!("  Type {pixel_type}\n"));
	out.push_str("Extent\n");
	out.push_str(&format!("  North {:.4}\n", bbox.north));
	out.push_str(&format!("  West {:.4}\n", bbox.west));
	out.push_str(&format!("  South {:.4}\n", bbox.south));
	out.push_str(&format!("  East {:.4}\n", bbox.east));
	out.push_str("Spatial Reference\n");
	out.push_str(&format!(
		"  {} Geodesic WGS84 (EPSG:4326)\n",
		if projection == "EPSG:4326" { "It is" } else { "It is not" }
	));
	out.push_str(&format!(
		"  {}\n",
		if projection.is_empty() { "(none)" } else { projection.as_str() }
	));
	out.push_str("Pyramid\n");
	out.push_str(&format!("  Levels {levels}\n"));
	out.push_str(&format!("  Tile size {tile_size}"));
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use superoverlay::GeoTransform;

	#[test]
	fn describe_lists_raster_facts() {
		let mut raster = MemoryRaster::from_bands(
			600,
			300,
			vec![vec![0u8; 180_000]; 3],
			GeoTransform::new([-60.0, 0.25, 0.0, 10.0, 0.0, -0.25]),
			"EPSG:4326".to_string(),
		)
		.unwrap();
		raster.set_projection("EPSG:4326");

		let text = describe(&raster, "/data/scene.tif", 256).unwrap();
		assert!(text.contains("Name scene.tif"));
		assert!(text.contains("Size X/Y 600/300"));
		assert!(text.contains("Resolution X/Y 0.2500/0.2500"));
		assert!(text.contains("Number Bands 3"));
		assert!(text.contains("North 10.0000"));
		assert!(text.contains("South -65.0000"));
		assert!(text.contains("It is Geodesic WGS84"));
		assert!(text.contains("Levels 2"));
	}

	#[test]
	fn describe_handles_missing_georeferencing() {
		let raster =
			MemoryRaster::from_bands(64, 64, vec![vec![0u8; 4096]], GeoTransform::new([0.0; 6]), String::new())
				.unwrap();
		let text = describe(&raster, "plain.png", 64).unwrap();
		// the canonical default transform keeps envelope math alive
		assert!(text.contains("North 1000.5000"));
		assert!(text.contains("West 999.5000"));
		assert!(text.contains("(none)"));
	}
}
