//! In-memory staging dataset for one output tile.
//!
//! Bands are zero-filled at the nominal tile size; windows smaller than the
//! tile (edge and corner tiles) are copied in row by row, leaving the
//! padding at zero. The dataset carries the per-tile georeferencing and the
//! per-band nodata markers until the tile is encoded.

use superoverlay_core::{GeoTransform, PyramidLevel, TileSize, TileWindow, TilingError, TilingResult};

pub struct TileDataset {
	size: TileSize,
	bands: Vec<Vec<u8>>,
	nodata: Vec<Option<u8>>,
	transform: GeoTransform,
	projection: String,
}

/// Georeferencing of one tile: the base transform scaled to the tile's
/// pyramid level and shifted to the tile's pixel window.
pub fn tile_transform(
	base: &GeoTransform,
	level: &PyramidLevel,
	window: &TileWindow,
	tile_size: TileSize,
) -> GeoTransform {
	let (xoff, yoff) = window.pixel_offset(tile_size);
	level
		.level_transform(base)
		.with_pixel_offset(f64::from(xoff), f64::from(yoff))
}

impl TileDataset {
	pub fn new(size: TileSize, band_count: usize, transform: GeoTransform, projection: String) -> TileDataset {
		TileDataset {
			size,
			bands: vec![vec![0u8; size.area()]; band_count],
			nodata: vec![None; band_count],
			transform,
			projection,
		}
	}

	pub fn tile_size(&self) -> TileSize {
		self.size
	}

	pub fn band_count(&self) -> usize {
		self.bands.len()
	}

	pub fn band(&self, index: usize) -> &[u8] {
		&self.bands[index]
	}

	pub fn geo_transform(&self) -> GeoTransform {
		self.transform
	}

	pub fn projection(&self) -> &str {
		&self.projection
	}

	pub fn no_data_value(&self, band: usize) -> Option<u8> {
		self.nodata[band]
	}

	pub fn set_no_data_value(&mut self, band: usize, value: u8) {
		self.nodata[band] = Some(value);
	}

	/// Writes a pixel window into a band. A full-size window replaces the
	/// band buffer outright; a smaller window is copied row by row at the
	/// band's row stride, leaving rows beyond the window height and columns
	/// beyond the window width at their zero fill.
	pub fn write_window(&mut self, band: usize, pixels: &[u8], width: u32, height: u32) -> TilingResult<()> {
		let size = self.size.size();
		if band >= self.bands.len() {
			return Err(TilingError::configuration(format!(
				"band {band} out of range (tile has {})",
				self.bands.len()
			)));
		}
		if width > size || height > size {
			return Err(TilingError::configuration(format!(
				"window {width}x{height} exceeds tile size {size}"
			)));
		}
		if pixels.len() != (width as usize) * (height as usize) {
			return Err(TilingError::configuration(format!(
				"window buffer holds {} samples, window is {width}x{height}",
				pixels.len()
			)));
		}

		let target = &mut self.bands[band];
		if width == size && height == size {
			target.copy_from_slice(pixels);
		} else {
			for row in 0..height as usize {
				let src = row * width as usize;
				let dst = row * size as usize;
				target[dst..dst + width as usize].copy_from_slice(&pixels[src..src + width as usize]);
			}
		}
		Ok(())
	}

	/// Replaces a band with an already full-size buffer (the synthesized
	/// alpha band).
	pub fn write_band(&mut self, band: usize, pixels: &[u8]) -> TilingResult<()> {
		let size = self.size.size();
		self.write_window(band, pixels, size, size)
	}
}
