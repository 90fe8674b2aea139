//! CLI subcommands and the option plumbing they share.

pub mod build;
pub mod kml;
pub mod probe;
pub mod tiles;

use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::Path;
use superoverlay::tiler::StretchMode;
use superoverlay::{GeoBBox, GeoTransform, MemoryRaster, RasterSource, TilingOptions};

/// Source raster arguments shared by every subcommand.
#[derive(Args, Debug)]
pub struct SourceArgs {
	/// raster image to read (any format the raster reader recognizes)
	#[arg()]
	pub input: String,

	/// georeference the raster with this extent when the file carries none
	#[arg(long, value_name = "west,south,east,north", allow_hyphen_values = true)]
	pub bounds: Option<String>,

	/// spatial reference identifier of the raster, e.g. "EPSG:4326"
	#[arg(long, value_name = "ident")]
	pub projection: Option<String>,
}

impl SourceArgs {
	pub fn open(&self) -> Result<MemoryRaster> {
		let mut raster = MemoryRaster::open(Path::new(&self.input))?;

		if let Some(bounds) = &self.bounds {
			let bbox = parse_bounds(bounds)?;
			raster.set_geo_transform(transform_from_bounds(&bbox, raster.width(), raster.height()));
		}
		if let Some(projection) = &self.projection {
			raster.set_projection(projection.clone());
		}
		Ok(raster)
	}
}

/// Tiling options shared by the `tiles` and `build` subcommands.
#[derive(Args, Debug)]
pub struct TilingArgs {
	/// edge length of the square tiles in pixels, a power of two
	#[arg(long, value_name = "int", default_value = "256", display_order = 1)]
	pub tile_size: u32,

	/// source band for each output position, comma-separated 1-based band
	/// numbers, e.g. "3,2,1"
	#[arg(long, value_name = "b1,b2,..", display_order = 2)]
	pub band_order: Option<String>,

	/// stretch each band linearly over mean ± N standard deviations
	#[arg(long, value_name = "int", conflicts_with = "stretch_min_max", display_order = 3)]
	pub stretch_sd: Option<u32>,

	/// stretch each band linearly between its minimum and maximum
	#[arg(long, display_order = 3)]
	pub stretch_min_max: bool,

	/// pixel value meaning "no data"
	#[arg(long, value_name = "int", display_order = 4)]
	pub nodata: Option<u8>,

	/// synthesize an alpha band; opaque pixels get this value
	#[arg(
		long,
		value_name = "int",
		num_args = 0..=1,
		default_missing_value = "255",
		display_order = 4
	)]
	pub alpha: Option<u8>,
}

impl TilingArgs {
	pub fn to_options(&self) -> Result<TilingOptions> {
		let mut options = TilingOptions::new(self.tile_size)?;

		if let Some(order) = &self.band_order {
			options = options.with_band_order(parse_band_order(order)?);
		}
		if let Some(n_sd) = self.stretch_sd {
			options = options.with_stretch(StretchMode::StdDev(n_sd));
		} else if self.stretch_min_max {
			options = options.with_stretch(StretchMode::MinMax);
		}
		if let Some(nodata) = self.nodata {
			options = options.with_nodata(nodata);
		}
		if let Some(alpha) = self.alpha {
			options = options.with_alpha_value(alpha);
		}
		Ok(options)
	}
}

/// Parses "west,south,east,north".
fn parse_bounds(text: &str) -> Result<GeoBBox> {
	let values: Vec<f64> = text
		.split(',')
		.map(|v| v.trim().parse::<f64>().with_context(|| format!("invalid bounds value {v:?}")))
		.collect::<Result<_>>()?;
	if values.len() != 4 {
		bail!("bounds need 4 values (west,south,east,north), got {}", values.len());
	}
	Ok(GeoBBox::new(values[0], values[1], values[2], values[3])?)
}

/// North-up transform spanning `bbox` over a raster of the given pixel
/// size.
fn transform_from_bounds(bbox: &GeoBBox, width: u32, height: u32) -> GeoTransform {
	GeoTransform::new([
		bbox.west,
		bbox.width() / f64::from(width),
		0.0,
		bbox.north,
		0.0,
		-bbox.height() / f64::from(height),
	])
}

/// Parses comma-separated 1-based band numbers into zero-based indices.
fn parse_band_order(text: &str) -> Result<Vec<usize>> {
	text
		.split(',')
		.map(|v| {
			let band: usize = v
				.trim()
				.parse()
				.with_context(|| format!("invalid band number {v:?}"))?;
			if band == 0 {
				bail!("band numbers are 1-based, got 0");
			}
			Ok(band - 1)
		})
		.collect()
}

/// Base name for the metadata tree: an explicit name, or the input's file
/// stem.
pub fn base_name(input: &str, name: Option<&str>) -> String {
	match name {
		Some(name) => name.to_string(),
		None => Path::new(input)
			.file_stem()
			.map_or_else(|| "tiles".to_string(), |stem| stem.to_string_lossy().to_string()),
	}
}
