//! PNG encoding of a staged tile dataset.
//!
//! Band planes are interleaved back into a pixel buffer and written with
//! the `image` PNG encoder. One to four bands map onto Grey, GreyA, RGB
//! and RGBA; anything else cannot be expressed as a PNG tile.

use crate::tiler::TileDataset;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs;
use std::path::Path;
use superoverlay_core::{TilingError, TilingResult};

/// Encodes the dataset into PNG bytes.
pub fn encode_png(dataset: &TileDataset) -> TilingResult<Vec<u8>> {
	let color_type = match dataset.band_count() {
		1 => ExtendedColorType::L8,
		2 => ExtendedColorType::La8,
		3 => ExtendedColorType::Rgb8,
		4 => ExtendedColorType::Rgba8,
		n => {
			return Err(TilingError::configuration(format!(
				"{n} bands cannot be encoded as PNG (1-4 supported)"
			)));
		}
	};

	let size = dataset.tile_size().size();
	let samples = interleave(dataset);

	let mut buffer = Vec::new();
	PngEncoder::new(&mut buffer)
		.write_image(&samples, size, size, color_type)
		.map_err(|e| TilingError::configuration(format!("png encoding failed: {e}")))?;
	Ok(buffer)
}

/// Encodes the dataset and persists it at `path`. Any filesystem failure is
/// fatal to the run.
pub fn write_png(dataset: &TileDataset, path: &Path) -> TilingResult<()> {
	let bytes = encode_png(dataset)?;
	fs::write(path, bytes).map_err(|e| TilingError::tile_io(path.display().to_string(), e))
}

fn interleave(dataset: &TileDataset) -> Vec<u8> {
	let band_count = dataset.band_count();
	let pixel_count = dataset.tile_size().area();
	let mut samples = Vec::with_capacity(pixel_count * band_count);
	for i in 0..pixel_count {
		for band in 0..band_count {
			samples.push(dataset.band(band)[i]);
		}
	}
	samples
}
