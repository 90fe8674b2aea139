//! Pyramid depth planning and overview reconciliation.
//!
//! The original resolution is the deepest, most detailed level and carries
//! the highest level index; each overview halves the resolution and sits
//! one level above it, down to level 0 whose grid is at most one tile.

use crate::{GeoTransform, RasterSource, Resampling, TileSize, TilingError, TilingResult};

/// One level of the pyramid: its index in the metadata tree and the
/// overview it reads from (`None` for the original resolution).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PyramidLevel {
	pub level: u32,
	pub overview: Option<usize>,
}

impl PyramidLevel {
	/// Resolution reduction relative to the original raster: 1 for the
	/// original, `2^(overview_index + 1)` for overviews.
	pub fn reduction_factor(&self) -> f64 {
		match self.overview {
			None => 1.0,
			Some(index) => f64::powi(2.0, index as i32 + 1),
		}
	}

	/// The base transform scaled to this level's resolution.
	pub fn level_transform(&self, base: &GeoTransform) -> GeoTransform {
		base.scaled_by(self.reduction_factor())
	}
}

/// Number of reduced-resolution levels a raster needs so that the coarsest
/// level fits in a single tile. Computed independently for both axes, the
/// larger wins.
pub fn compute_level_count(tile_size: u32, width: u32, height: u32) -> TilingResult<u32> {
	let tile_size = TileSize::new(tile_size)?;

	let levels_for = |dimension: u32| -> u32 {
		let ratio = f64::from(dimension) / f64::from(tile_size.size());
		let levels = ratio.log2().ceil();
		if levels > 0.0 { levels as u32 } else { 0 }
	};

	Ok(levels_for(width).max(levels_for(height)))
}

/// Reduction factors of the overviews a pyramid of `level_count` levels
/// needs: `[2, 4, ..., 2^level_count]`.
pub fn overview_factors(level_count: u32) -> Vec<u32> {
	(1..=level_count).map(|i| 2u32.pow(i)).collect()
}

/// The levels of a pyramid in generation order: the original resolution
/// first (as the deepest level), then each overview at decreasing level
/// index.
pub fn plan_levels(level_count: u32) -> Vec<PyramidLevel> {
	let mut levels = Vec::with_capacity(level_count as usize + 1);
	levels.push(PyramidLevel {
		level: level_count,
		overview: None,
	});
	for index in 0..level_count {
		levels.push(PyramidLevel {
			level: level_count - (index + 1),
			overview: Some(index as usize),
		});
	}
	levels
}

/// Ensures the raster carries exactly the overviews the pyramid needs.
///
/// A raster with no overviews gets them built with nearest-neighbor
/// resampling. A raster with a different overview count than the pyramid
/// depth is rejected: partially built overviews of unknown provenance are
/// not trusted and never auto-repaired.
pub fn reconcile_overviews(raster: &mut dyn RasterSource, level_count: u32) -> TilingResult<()> {
	let existing = raster.overview_count();
	if existing == 0 {
		let factors = overview_factors(level_count);
		log::debug!("building {} overviews, factors {:?}", factors.len(), factors);
		raster.build_overviews(Resampling::Nearest, &factors)
	} else if existing as u32 == level_count {
		Ok(())
	} else {
		Err(TilingError::pyramid_mismatch(format!(
			"raster has {existing} overviews, pyramid needs {level_count}"
		)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MemoryRaster;
	use rstest::rstest;

	#[rstest]
	#[case(256, 1000, 1000, 2)]
	#[case(256, 256, 256, 0)]
	#[case(256, 600, 600, 2)]
	#[case(256, 512, 512, 1)]
	#[case(256, 100, 80, 0)]
	#[case(512, 600, 5000, 4)]
	#[case(256, 600, 300, 2)]
	fn level_counts(#[case] tile_size: u32, #[case] width: u32, #[case] height: u32, #[case] expected: u32) {
		assert_eq!(compute_level_count(tile_size, width, height).unwrap(), expected);
	}

	#[test]
	fn non_power_of_two_tile_size_is_a_configuration_error() {
		let err = compute_level_count(100, 1000, 1000).unwrap_err();
		assert!(matches!(err, TilingError::Configuration(_)));
	}

	#[test]
	fn factors_double_per_level() {
		assert_eq!(overview_factors(3), vec![2, 4, 8]);
		assert_eq!(overview_factors(0), Vec::<u32>::new());
	}

	#[test]
	fn generation_order_starts_at_the_original() {
		assert_eq!(
			plan_levels(2),
			vec![
				PyramidLevel {
					level: 2,
					overview: None
				},
				PyramidLevel {
					level: 1,
					overview: Some(0)
				},
				PyramidLevel {
					level: 0,
					overview: Some(1)
				},
			]
		);
	}

	#[test]
	fn reduction_factors_per_level() {
		let levels = plan_levels(2);
		assert_eq!(levels[0].reduction_factor(), 1.0);
		assert_eq!(levels[1].reduction_factor(), 2.0);
		assert_eq!(levels[2].reduction_factor(), 4.0);
	}

	#[test]
	fn level_transform_scales_resolution_only() {
		let base = GeoTransform::new([-60.0, 0.5, 0.0, 10.0, 0.0, -0.5]);
		let level = PyramidLevel {
			level: 0,
			overview: Some(1),
		};
		let scaled = level.level_transform(&base);
		assert_eq!(scaled.pixel_width(), 2.0);
		assert_eq!(scaled.origin_x(), -60.0);
	}

	fn raster(width: u32, height: u32) -> MemoryRaster {
		let band = vec![0u8; (width as usize) * (height as usize)];
		MemoryRaster::from_bands(width, height, vec![band], GeoTransform::default(), String::new()).unwrap()
	}

	#[test]
	fn reconcile_builds_missing_overviews() {
		let mut r = raster(600, 600);
		reconcile_overviews(&mut r, 2).unwrap();
		assert_eq!(r.overview_count(), 2);
		assert_eq!(r.overview_size(0).unwrap(), (300, 300));
		assert_eq!(r.overview_size(1).unwrap(), (150, 150));
	}

	#[test]
	fn reconcile_accepts_matching_overviews() {
		let mut r = raster(600, 600);
		r.build_overviews(Resampling::Nearest, &[2, 4]).unwrap();
		assert!(reconcile_overviews(&mut r, 2).is_ok());
	}

	#[test]
	fn reconcile_rejects_foreign_overview_counts() {
		let mut r = raster(600, 600);
		r.build_overviews(Resampling::Nearest, &[2, 4, 8]).unwrap();
		let err = reconcile_overviews(&mut r, 2).unwrap_err();
		assert!(matches!(err, TilingError::PyramidMismatch(_)));
	}
}
