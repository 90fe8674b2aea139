//! Per-band pixel transforms applied between reading a window and writing
//! it into the output tile.
//!
//! Both stretches work from whole-band statistics, not from the window
//! being processed, so every tile of a band is stretched identically.

use superoverlay_core::BandStatistics;

/// Contrast stretch applied to each band buffer after reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StretchMode {
	/// Linear stretch of the band's min..max onto 1..254.
	MinMax,
	/// Linear stretch of `mean ± n * std_dev` (clamped to the band's
	/// min/max) onto 0..255.
	StdDev(u32),
}

impl StretchMode {
	pub fn apply(&self, stats: &BandStatistics, pixels: &mut [u8]) {
		match self {
			StretchMode::MinMax => stretch_min_max(stats, pixels),
			StretchMode::StdDev(n_sd) => stretch_std_dev(stats, *n_sd, pixels),
		}
	}
}

/// Maps the band's value range linearly onto 1..254.
///
/// `DN' = cF * (DN - min)` with `cF = 255 / (max - min)`; a flat band
/// (min == max) uses `cF = 255`.
pub fn stretch_min_max(stats: &BandStatistics, pixels: &mut [u8]) {
	let c_f = if stats.min == stats.max {
		255.0
	} else {
		255.0 / (stats.max - stats.min)
	};

	for pixel in pixels {
		*pixel = scale_clamped(*pixel, c_f, stats.min, 1, 254);
	}
}

/// Maps `mean ± n_sd * std_dev` linearly onto 0..255.
///
/// The stretch window is clamped to the band's actual min/max; values
/// below the window become 0, values above become 255.
pub fn stretch_std_dev(stats: &BandStatistics, n_sd: u32, pixels: &mut [u8]) {
	let n_sd = f64::from(n_sd);
	let min = (stats.mean - n_sd * stats.std_dev).max(stats.min);
	let max = (stats.mean + n_sd * stats.std_dev).min(stats.max);

	let c_f = if stats.min == stats.max { 255.0 } else { 255.0 / (max - min) };

	for pixel in pixels {
		let value = f64::from(*pixel);
		*pixel = if value < min {
			0
		} else if value > max {
			255
		} else {
			scale_clamped(*pixel, c_f, min, 0, 255)
		};
	}
}

/// One explicit nodata-aware alpha rule, shared by every alpha path:
/// a pixel different from the nodata value becomes opaque, everything
/// else keeps the alpha it already has (transparent by default).
pub fn populate_alpha_pixels(pixels: &[u8], alpha: &mut [u8], nodata: u8, opaque: u8) {
	for (pixel, alpha) in pixels.iter().zip(alpha) {
		if *pixel != nodata {
			*alpha = opaque;
		}
	}
}

fn scale_clamped(pixel: u8, c_f: f64, min: f64, lim_min: u8, lim_max: u8) -> u8 {
	let value = c_f * (f64::from(pixel) - min);
	if value < f64::from(lim_min) {
		lim_min
	} else if value > f64::from(lim_max) {
		lim_max
	} else {
		value.round() as u8
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn stats(min: f64, max: f64, mean: f64, std_dev: f64) -> BandStatistics {
		BandStatistics {
			min,
			max,
			mean,
			std_dev,
		}
	}

	#[rstest]
	#[case(60, 0)]
	#[case(140, 255)]
	#[case(100, 128)]
	fn std_dev_stretch_single_values(#[case] input: u8, #[case] expected: u8) {
		// mean 100, sd 20, 2 sd: 60 maps to 0, 140 to 255, 100 to mid
		let stats = stats(0.0, 255.0, 100.0, 20.0);
		let mut pixels = vec![input];
		stretch_std_dev(&stats, 2, &mut pixels);
		assert!((i16::from(pixels[0]) - i16::from(expected)).abs() <= 1);
	}

	#[test]
	fn std_dev_stretch_maps_window_onto_full_range() {
		// mean 100, sd 20, 2 sd -> window 60..140
		let stats = stats(0.0, 255.0, 100.0, 20.0);
		let mut pixels = vec![60, 140, 100, 50, 200];
		stretch_std_dev(&stats, 2, &mut pixels);
		assert_eq!(pixels[0], 0);
		assert_eq!(pixels[1], 255);
		assert!((i16::from(pixels[2]) - 128).abs() <= 1);
		// outside the window clamps hard
		assert_eq!(pixels[3], 0);
		assert_eq!(pixels[4], 255);
	}

	#[test]
	fn std_dev_window_is_clamped_to_band_range() {
		// mean 10, sd 20: lower edge would be -30, clamps to band min 5
		let stats = stats(5.0, 50.0, 10.0, 20.0);
		let mut pixels = vec![5];
		stretch_std_dev(&stats, 2, &mut pixels);
		assert_eq!(pixels[0], 0);
	}

	#[test]
	fn min_max_stretch_uses_soft_limits() {
		let stats = stats(50.0, 150.0, 100.0, 25.0);
		let mut pixels = vec![50, 150, 100];
		stretch_min_max(&stats, &mut pixels);
		// limits are 1 and 254, not 0 and 255
		assert_eq!(pixels[0], 1);
		assert_eq!(pixels[1], 254);
		assert!((i16::from(pixels[2]) - 128).abs() <= 1);
	}

	#[test]
	fn flat_band_does_not_divide_by_zero() {
		let stats = stats(7.0, 7.0, 7.0, 0.0);
		let mut pixels = vec![7, 7];
		stretch_min_max(&stats, &mut pixels);
		assert_eq!(pixels, vec![1, 1]);
	}

	#[test]
	fn alpha_synthesis_marks_non_nodata_opaque() {
		let pixels = vec![0, 5, 0, 200];
		let mut alpha = vec![0u8; 4];
		populate_alpha_pixels(&pixels, &mut alpha, 0, 255);
		assert_eq!(alpha, vec![0, 255, 0, 255]);
	}

	#[test]
	fn alpha_synthesis_honors_configured_nodata() {
		let pixels = vec![5, 9, 5, 0];
		let mut alpha = vec![0u8; 4];
		populate_alpha_pixels(&pixels, &mut alpha, 5, 255);
		assert_eq!(alpha, vec![0, 255, 0, 255]);
	}

	#[test]
	fn alpha_synthesis_never_clears_earlier_bands() {
		// band 1 marked a pixel opaque, band 2 is nodata there
		let mut alpha = vec![255u8, 0, 0, 0];
		populate_alpha_pixels(&[0, 0, 7, 0], &mut alpha, 0, 255);
		assert_eq!(alpha, vec![255, 0, 255, 0]);
	}
}
