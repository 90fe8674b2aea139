//! Raster access seam.
//!
//! The pyramid engine consumes rasters through the [`RasterSource`] trait:
//! dimensions, bands, georeferencing, windowed band reads and
//! reduced-resolution overviews. Anything that can answer these questions
//! can feed the tiler; reprojection and exotic formats stay behind this
//! seam and are not the engine's concern.
//!
//! [`MemoryRaster`] is the bundled implementation: it decodes any image
//! format the `image` crate recognizes into per-band planes and computes
//! overviews in memory. Tests build it directly from band buffers.

use crate::{GeoTransform, TilingError, TilingResult};
use image::DynamicImage;
use std::path::Path;

/// Sample type of a raster band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelType {
	Byte,
	UInt16,
}

/// Resampling kernel used when building overviews. Tile pyramids default to
/// nearest-neighbor so categorical pixel values are not blended at coarser
/// zooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resampling {
	Nearest,
	Average,
}

/// Whole-band statistics, the input of the contrast stretches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandStatistics {
	pub min: f64,
	pub max: f64,
	pub mean: f64,
	pub std_dev: f64,
}

pub trait RasterSource {
	fn width(&self) -> u32;
	fn height(&self) -> u32;
	fn band_count(&self) -> usize;
	fn pixel_type(&self) -> PixelType;
	fn geo_transform(&self) -> GeoTransform;
	fn projection(&self) -> String;

	/// Number of reduced-resolution overviews available.
	fn overview_count(&self) -> usize;

	/// Pixel dimensions of one overview.
	fn overview_size(&self, overview: usize) -> TilingResult<(u32, u32)>;

	/// Builds one overview per reduction factor, replacing any existing
	/// ones.
	fn build_overviews(&mut self, resampling: Resampling, factors: &[u32]) -> TilingResult<()>;

	/// Reads a pixel window of one band, row-major. `overview = None` reads
	/// the original resolution.
	fn read_window(
		&self,
		band: usize,
		overview: Option<usize>,
		xoff: u32,
		yoff: u32,
		width: u32,
		height: u32,
	) -> TilingResult<Vec<u8>>;

	/// Whole-band min/max/mean/standard deviation at the given level.
	fn band_statistics(&self, band: usize, overview: Option<usize>) -> TilingResult<BandStatistics>;

	/// Pixel dimensions of a pyramid level: the raster itself for `None`,
	/// otherwise the overview.
	fn level_size(&self, overview: Option<usize>) -> TilingResult<(u32, u32)> {
		match overview {
			None => Ok((self.width(), self.height())),
			Some(index) => self.overview_size(index),
		}
	}
}

#[derive(Debug)]
struct OverviewPlane {
	width: u32,
	height: u32,
	bands: Vec<Vec<u8>>,
}

/// An in-memory raster of 8-bit band planes with optional overviews.
#[derive(Debug)]
pub struct MemoryRaster {
	width: u32,
	height: u32,
	bands: Vec<Vec<u8>>,
	transform: GeoTransform,
	projection: String,
	overviews: Vec<OverviewPlane>,
}

impl MemoryRaster {
	/// Opens an image file and splits it into band planes. Fails with
	/// [`TilingError::UnreadableRaster`] when the file is missing or not a
	/// recognized raster format.
	pub fn open(path: &Path) -> TilingResult<MemoryRaster> {
		let unreadable = |reason: String| TilingError::UnreadableRaster {
			path: path.display().to_string(),
			reason,
		};

		let decoded = image::open(path).map_err(|e| unreadable(e.to_string()))?;
		let (width, height) = (decoded.width(), decoded.height());
		let bands = split_bands(&decoded);

		MemoryRaster::from_bands(width, height, bands, GeoTransform::new([0.0; 6]), String::new())
	}

	/// True when the file looks like an image format the raster reader
	/// recognizes. Cheap header sniff, no full decode.
	pub fn can_open(path: &Path) -> bool {
		image::ImageReader::open(path)
			.and_then(|reader| reader.with_guessed_format())
			.map(|reader| reader.format().is_some())
			.unwrap_or(false)
	}

	/// Builds a raster directly from band planes. Every plane must hold
	/// exactly `width * height` samples.
	pub fn from_bands(
		width: u32,
		height: u32,
		bands: Vec<Vec<u8>>,
		transform: GeoTransform,
		projection: String,
	) -> TilingResult<MemoryRaster> {
		if bands.is_empty() {
			return Err(TilingError::configuration("raster needs at least one band"));
		}
		let expected = (width as usize) * (height as usize);
		for (index, band) in bands.iter().enumerate() {
			if band.len() != expected {
				return Err(TilingError::configuration(format!(
					"band {index} holds {} samples, raster is {width}x{height}",
					band.len()
				)));
			}
		}
		Ok(MemoryRaster {
			width,
			height,
			bands,
			transform,
			projection,
			overviews: Vec::new(),
		})
	}

	pub fn set_geo_transform(&mut self, transform: GeoTransform) {
		self.transform = transform;
	}

	pub fn set_projection(&mut self, projection: impl Into<String>) {
		self.projection = projection.into();
	}

	fn plane(&self, overview: Option<usize>) -> TilingResult<(u32, u32, &Vec<Vec<u8>>)> {
		match overview {
			None => Ok((self.width, self.height, &self.bands)),
			Some(index) => {
				let plane = self.overviews.get(index).ok_or_else(|| {
					TilingError::pyramid_mismatch(format!(
						"overview {index} is missing, raster has {}",
						self.overviews.len()
					))
				})?;
				Ok((plane.width, plane.height, &plane.bands))
			}
		}
	}
}

impl RasterSource for MemoryRaster {
	fn width(&self) -> u32 {
		self.width
	}

	fn height(&self) -> u32 {
		self.height
	}

	fn band_count(&self) -> usize {
		self.bands.len()
	}

	fn pixel_type(&self) -> PixelType {
		PixelType::Byte
	}

	fn geo_transform(&self) -> GeoTransform {
		self.transform
	}

	fn projection(&self) -> String {
		self.projection.clone()
	}

	fn overview_count(&self) -> usize {
		self.overviews.len()
	}

	fn overview_size(&self, overview: usize) -> TilingResult<(u32, u32)> {
		let (width, height, _) = self.plane(Some(overview))?;
		Ok((width, height))
	}

	fn build_overviews(&mut self, resampling: Resampling, factors: &[u32]) -> TilingResult<()> {
		let mut overviews = Vec::with_capacity(factors.len());
		for &factor in factors {
			if factor == 0 {
				return Err(TilingError::configuration("overview factor 0 is not usable"));
			}
			let width = self.width.div_ceil(factor);
			let height = self.height.div_ceil(factor);
			let bands = self
				.bands
				.iter()
				.map(|band| reduce_band(band, self.width, self.height, factor, resampling))
				.collect();
			overviews.push(OverviewPlane { width, height, bands });
		}
		self.overviews = overviews;
		Ok(())
	}

	fn read_window(
		&self,
		band: usize,
		overview: Option<usize>,
		xoff: u32,
		yoff: u32,
		width: u32,
		height: u32,
	) -> TilingResult<Vec<u8>> {
		let (level_width, level_height, bands) = self.plane(overview)?;
		let plane = bands
			.get(band)
			.ok_or_else(|| TilingError::configuration(format!("band {band} out of range (raster has {})", bands.len())))?;

		if xoff + width > level_width || yoff + height > level_height {
			return Err(TilingError::GeometryDegenerate(format!(
				"window {width}x{height}+{xoff}+{yoff} exceeds level size {level_width}x{level_height}"
			)));
		}

		let mut out = Vec::with_capacity((width as usize) * (height as usize));
		for row in yoff..yoff + height {
			let start = (row as usize) * (level_width as usize) + (xoff as usize);
			out.extend_from_slice(&plane[start..start + width as usize]);
		}
		Ok(out)
	}

	fn band_statistics(&self, band: usize, overview: Option<usize>) -> TilingResult<BandStatistics> {
		let (width, height, bands) = self.plane(overview)?;
		let plane = bands
			.get(band)
			.ok_or_else(|| TilingError::configuration(format!("band {band} out of range (raster has {})", bands.len())))?;

		let count = (width as usize) * (height as usize);
		let mut min = f64::INFINITY;
		let mut max = f64::NEG_INFINITY;
		let mut sum = 0.0;
		for &v in plane {
			let v = f64::from(v);
			min = min.min(v);
			max = max.max(v);
			sum += v;
		}
		let mean = sum / count as f64;
		let variance = plane.iter().map(|&v| (f64::from(v) - mean).powi(2)).sum::<f64>() / count as f64;

		Ok(BandStatistics {
			min,
			max,
			mean,
			std_dev: variance.sqrt(),
		})
	}
}

fn split_bands(image: &DynamicImage) -> Vec<Vec<u8>> {
	// keep the channel layout, but normalize every sample to 8 bit
	match image.color().channel_count() {
		1 => deinterleave(image.to_luma8().as_raw(), 1),
		2 => deinterleave(image.to_luma_alpha8().as_raw(), 2),
		4 => deinterleave(image.to_rgba8().as_raw(), 4),
		_ => deinterleave(image.to_rgb8().as_raw(), 3),
	}
}

fn deinterleave(samples: &[u8], channels: usize) -> Vec<Vec<u8>> {
	let mut bands = vec![Vec::with_capacity(samples.len() / channels); channels];
	for chunk in samples.chunks_exact(channels) {
		for (band, &sample) in bands.iter_mut().zip(chunk) {
			band.push(sample);
		}
	}
	bands
}

fn reduce_band(band: &[u8], width: u32, height: u32, factor: u32, resampling: Resampling) -> Vec<u8> {
	let out_width = width.div_ceil(factor);
	let out_height = height.div_ceil(factor);
	let mut out = Vec::with_capacity((out_width as usize) * (out_height as usize));

	for oy in 0..out_height {
		for ox in 0..out_width {
			let sample = match resampling {
				Resampling::Nearest => {
					let sx = (ox * factor).min(width - 1);
					let sy = (oy * factor).min(height - 1);
					band[(sy as usize) * (width as usize) + (sx as usize)]
				}
				Resampling::Average => {
					let x0 = ox * factor;
					let y0 = oy * factor;
					let x1 = (x0 + factor).min(width);
					let y1 = (y0 + factor).min(height);
					let mut sum = 0u32;
					for sy in y0..y1 {
						for sx in x0..x1 {
							sum += u32::from(band[(sy as usize) * (width as usize) + (sx as usize)]);
						}
					}
					(sum / ((x1 - x0) * (y1 - y0))) as u8
				}
			};
			out.push(sample);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn gradient_raster(width: u32, height: u32) -> MemoryRaster {
		let band: Vec<u8> = (0..width * height).map(|i| (i % 251) as u8).collect();
		MemoryRaster::from_bands(
			width,
			height,
			vec![band],
			GeoTransform::new([0.0, 1.0, 0.0, f64::from(height), 0.0, -1.0]),
			"EPSG:4326".to_string(),
		)
		.unwrap()
	}

	#[test]
	fn from_bands_validates_plane_length() {
		let err = MemoryRaster::from_bands(4, 4, vec![vec![0u8; 15]], GeoTransform::default(), String::new());
		assert!(matches!(err.unwrap_err(), TilingError::Configuration(_)));
		assert!(matches!(
			MemoryRaster::from_bands(4, 4, vec![], GeoTransform::default(), String::new()).unwrap_err(),
			TilingError::Configuration(_)
		));
	}

	#[test]
	fn read_window_is_row_major() {
		let band = vec![
			0, 1, 2, 3, //
			4, 5, 6, 7, //
			8, 9, 10, 11, //
		];
		let raster = MemoryRaster::from_bands(4, 3, vec![band], GeoTransform::default(), String::new()).unwrap();
		let window = raster.read_window(0, None, 1, 1, 2, 2).unwrap();
		assert_eq!(window, vec![5, 6, 9, 10]);
	}

	#[test]
	fn read_window_outside_level_is_degenerate() {
		let raster = gradient_raster(8, 8);
		let err = raster.read_window(0, None, 4, 4, 8, 8).unwrap_err();
		assert!(matches!(err, TilingError::GeometryDegenerate(_)));
	}

	#[test]
	fn missing_overview_is_a_pyramid_mismatch() {
		let raster = gradient_raster(8, 8);
		let err = raster.read_window(0, Some(0), 0, 0, 1, 1).unwrap_err();
		assert!(matches!(err, TilingError::PyramidMismatch(_)));
	}

	#[test]
	fn nearest_overviews_pick_grid_samples() {
		let band = vec![
			10, 20, 30, 40, //
			50, 60, 70, 80, //
			90, 100, 110, 120, //
			130, 140, 150, 160, //
		];
		let mut raster = MemoryRaster::from_bands(4, 4, vec![band], GeoTransform::default(), String::new()).unwrap();
		raster.build_overviews(Resampling::Nearest, &[2, 4]).unwrap();

		assert_eq!(raster.overview_count(), 2);
		assert_eq!(raster.overview_size(0).unwrap(), (2, 2));
		assert_eq!(raster.overview_size(1).unwrap(), (1, 1));
		assert_eq!(raster.read_window(0, Some(0), 0, 0, 2, 2).unwrap(), vec![10, 30, 90, 110]);
		assert_eq!(raster.read_window(0, Some(1), 0, 0, 1, 1).unwrap(), vec![10]);
	}

	#[test]
	fn odd_sizes_round_overview_dimensions_up() {
		let mut raster = gradient_raster(5, 3);
		raster.build_overviews(Resampling::Nearest, &[2]).unwrap();
		assert_eq!(raster.overview_size(0).unwrap(), (3, 2));
	}

	#[test]
	fn average_overviews_box_filter() {
		let band = vec![
			0, 100, //
			100, 0, //
		];
		let mut raster = MemoryRaster::from_bands(2, 2, vec![band], GeoTransform::default(), String::new()).unwrap();
		raster.build_overviews(Resampling::Average, &[2]).unwrap();
		assert_eq!(raster.read_window(0, Some(0), 0, 0, 1, 1).unwrap(), vec![50]);
	}

	#[test]
	fn statistics_match_hand_computation() {
		let band = vec![60, 140, 100, 100];
		let raster = MemoryRaster::from_bands(2, 2, vec![band], GeoTransform::default(), String::new()).unwrap();
		let stats = raster.band_statistics(0, None).unwrap();
		assert_eq!(stats.min, 60.0);
		assert_eq!(stats.max, 140.0);
		assert_eq!(stats.mean, 100.0);
		assert!((stats.std_dev - 28.284271247461902).abs() < 1e-9);
	}

	#[test]
	fn open_decodes_image_files_into_bands() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("raster.png");
		let mut img = image::RgbImage::new(4, 2);
		img.put_pixel(0, 0, image::Rgb([1, 2, 3]));
		img.save(&path).unwrap();

		let raster = MemoryRaster::open(&path).unwrap();
		assert_eq!(raster.band_count(), 3);
		assert_eq!((raster.width(), raster.height()), (4, 2));
		assert_eq!(raster.read_window(0, None, 0, 0, 1, 1).unwrap(), vec![1]);
		assert_eq!(raster.read_window(2, None, 0, 0, 1, 1).unwrap(), vec![3]);
		// a plain png has no georeferencing: canonical default transform
		assert_eq!(raster.geo_transform().0, crate::DEFAULT_GEO_TRANSFORM);
		assert!(MemoryRaster::can_open(&path));
	}

	#[test]
	fn open_rejects_missing_and_non_raster_files() {
		let dir = tempfile::tempdir().unwrap();
		let err = MemoryRaster::open(&dir.path().join("missing.png")).unwrap_err();
		assert!(matches!(err, TilingError::UnreadableRaster { .. }));

		let text = dir.path().join("notes.txt");
		std::fs::write(&text, "not a raster").unwrap();
		assert!(MemoryRaster::open(&text).is_err());
		assert!(!MemoryRaster::can_open(&text));
	}

	#[test]
	fn level_size_dispatches_on_overview() {
		let mut raster = gradient_raster(600, 600);
		raster.build_overviews(Resampling::Nearest, &[2, 4]).unwrap();
		assert_eq!(raster.level_size(None).unwrap(), (600, 600));
		assert_eq!(raster.level_size(Some(0)).unwrap(), (300, 300));
		assert_eq!(raster.level_size(Some(1)).unwrap(), (150, 150));
	}
}
