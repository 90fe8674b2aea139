//! Tile generation engine.
//!
//! Walks the pyramid from the original resolution down to the coarsest
//! overview, partitions every level into a grid of fixed-size tiles and
//! materializes each tile as a PNG named `{level}_{gridX}_{gridY}.png`.
//!
//! Each tile's pipeline: read the source window (original or overview
//! band, honoring an optional band permutation), optionally stretch it,
//! pad edge windows into the full tile buffer, optionally synthesize an
//! alpha band from the nodata value, mark nodata and persist. Tiles are
//! processed strictly one after another; the engine owns each tile's
//! buffers only until the tile is written.

mod dataset;
mod encode;
mod stretch;

pub use dataset::{TileDataset, tile_transform};
pub use encode::{encode_png, write_png};
pub use stretch::{StretchMode, populate_alpha_pixels, stretch_min_max, stretch_std_dev};

use std::fs;
use std::path::Path;
use superoverlay_core::progress::ProgressTrait;
use superoverlay_core::{
	PixelType, PyramidLevel, RasterSource, TileGrid, TileSize, TileWindow, TilingError, TilingResult, pyramid,
};

/// Immutable configuration of one generation run.
#[derive(Clone, Debug)]
pub struct TilingOptions {
	pub tile_size: TileSize,
	/// Source band to read for each output band position.
	pub band_order: Option<Vec<usize>>,
	pub stretch: Option<StretchMode>,
	/// Sentinel pixel value meaning "no data".
	pub nodata: Option<u8>,
	/// Opaque fill of the synthesized alpha band; `None` disables alpha
	/// synthesis.
	pub alpha_value: Option<u8>,
}

impl TilingOptions {
	pub fn new(tile_size: u32) -> TilingResult<TilingOptions> {
		Ok(TilingOptions {
			tile_size: TileSize::new(tile_size)?,
			band_order: None,
			stretch: None,
			nodata: None,
			alpha_value: None,
		})
	}

	#[must_use]
	pub fn with_band_order(mut self, order: Vec<usize>) -> TilingOptions {
		self.band_order = Some(order);
		self
	}

	#[must_use]
	pub fn with_stretch(mut self, stretch: StretchMode) -> TilingOptions {
		self.stretch = Some(stretch);
		self
	}

	#[must_use]
	pub fn with_nodata(mut self, value: u8) -> TilingOptions {
		self.nodata = Some(value);
		self
	}

	#[must_use]
	pub fn with_alpha_value(mut self, value: u8) -> TilingOptions {
		self.alpha_value = Some(value);
		self
	}

	/// Checks the options against the raster they will be applied to.
	fn validate(&self, band_count: usize) -> TilingResult<()> {
		if let Some(order) = &self.band_order {
			if order.len() != band_count {
				return Err(TilingError::configuration(format!(
					"band order lists {} bands, raster has {band_count}",
					order.len()
				)));
			}
			for &band in order {
				if band >= band_count {
					return Err(TilingError::configuration(format!(
						"band order references band {band}, raster has {band_count}"
					)));
				}
			}
		}
		Ok(())
	}
}

/// Name of one tile's raster file.
pub fn tile_file_name(level: u32, grid_x: u32, grid_y: u32) -> String {
	format!("{level}_{grid_x}_{grid_y}.png")
}

/// Generates the complete tile pyramid of `raster` into `out_dir`.
///
/// Validates configuration and overview preconditions before anything is
/// written. A failing tile write aborts the whole run: the output
/// directory must then be treated as invalid and regenerated from scratch.
pub fn generate_tiles(
	raster: &mut dyn RasterSource,
	options: &TilingOptions,
	out_dir: &Path,
	progress: &dyn ProgressTrait,
) -> TilingResult<()> {
	options.validate(raster.band_count())?;
	if raster.pixel_type() != PixelType::Byte {
		return Err(TilingError::configuration(
			"only 8-bit rasters can be rendered into PNG tiles",
		));
	}

	let level_count = pyramid::compute_level_count(options.tile_size.size(), raster.width(), raster.height())?;
	pyramid::reconcile_overviews(raster, level_count)?;

	fs::create_dir_all(out_dir).map_err(|e| TilingError::tile_io(out_dir.display().to_string(), e))?;

	log::info!(
		"generating {} pyramid levels into {:?}",
		level_count + 1,
		out_dir
	);
	for level in pyramid::plan_levels(level_count) {
		write_level(raster, &level, options, out_dir, progress)?;
	}
	progress.finish();
	Ok(())
}

fn write_level(
	raster: &dyn RasterSource,
	level: &PyramidLevel,
	options: &TilingOptions,
	out_dir: &Path,
	progress: &dyn ProgressTrait,
) -> TilingResult<()> {
	let (width, height) = raster.level_size(level.overview)?;
	let grid = TileGrid::new(width, height, options.tile_size);
	let size = options.tile_size.size();

	progress.message(&format!(
		"Level {} TileX 0->{} TileY 0->{} ...",
		level.level,
		grid.full_count_x(),
		grid.full_count_y()
	));
	progress.init(&format!("Level {}", level.level), grid.tile_count());

	for window in grid.windows() {
		// status lines at the pass boundaries of the grid enumeration
		if window.width < size && window.height == size && window.grid_y == 0 {
			progress.message(&format!(
				"Level {} remainder TileX 0->{} ...",
				level.level,
				grid.full_count_y()
			));
		} else if window.height < size && window.width == size && window.grid_x == 0 {
			progress.message(&format!(
				"Level {} remainder TileY 0->{} ...",
				level.level,
				grid.full_count_x()
			));
		} else if window.width < size && window.height < size {
			progress.message("Remainder TileX & TileY ...");
		}

		write_tile(raster, level, &window, options, out_dir)?;
		progress.inc(1);
	}
	Ok(())
}

fn write_tile(
	raster: &dyn RasterSource,
	level: &PyramidLevel,
	window: &TileWindow,
	options: &TilingOptions,
	out_dir: &Path,
) -> TilingResult<()> {
	let tile_size = options.tile_size;
	let (xoff, yoff) = window.pixel_offset(tile_size);
	let band_count = raster.band_count();
	let out_band_count = band_count + usize::from(options.alpha_value.is_some());

	let transform = tile_transform(&raster.geo_transform(), level, window, tile_size);
	let mut tile = TileDataset::new(tile_size, out_band_count, transform, raster.projection());
	let mut alpha = options.alpha_value.map(|_| vec![0u8; tile_size.area()]);

	for out_band in 0..band_count {
		let source_band = options.band_order.as_ref().map_or(out_band, |order| order[out_band]);

		let mut pixels = raster.read_window(source_band, level.overview, xoff, yoff, window.width, window.height)?;

		if let Some(stretch) = &options.stretch {
			let stats = raster.band_statistics(source_band, level.overview)?;
			stretch.apply(&stats, &mut pixels);
		}

		tile.write_window(out_band, &pixels, window.width, window.height)?;

		if let Some(alpha) = alpha.as_mut() {
			merge_alpha_window(
				&pixels,
				window,
				tile_size,
				options.nodata.unwrap_or(0),
				options.alpha_value.unwrap_or(255),
				alpha,
			);
		}
	}

	if let Some(alpha) = alpha {
		tile.write_band(band_count, &alpha)?;
	}

	if let Some(nodata) = options.nodata {
		mark_no_data(&mut tile, nodata);
	}

	let path = out_dir.join(tile_file_name(level.level, window.grid_x, window.grid_y));
	write_png(&tile, &path)
}

/// Applies the alpha rule over the valid window only, at the tile's row
/// stride. Padding outside the window keeps its transparent fill.
fn merge_alpha_window(
	pixels: &[u8],
	window: &TileWindow,
	tile_size: TileSize,
	nodata: u8,
	opaque: u8,
	alpha: &mut [u8],
) {
	let stride = tile_size.size() as usize;
	let width = window.width as usize;
	for row in 0..window.height as usize {
		let src = row * width;
		let dst = row * stride;
		populate_alpha_pixels(&pixels[src..src + width], &mut alpha[dst..dst + width], nodata, opaque);
	}
}

// Band index 0 is skipped when marking nodata; downstream consumers rely
// on the established behavior.
fn mark_no_data(tile: &mut TileDataset, value: u8) {
	for band in 1..tile.band_count() {
		tile.set_no_data_value(band, value);
	}
}
