use crate::{TilingError, TilingResult};
use std::fmt::Debug;

/// Edge length of the square output tiles, in pixels.
///
/// Must be a power of two: the pyramid halves each level, and any other
/// size would break the alignment between overview grids.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TileSize(u32);

impl TileSize {
	pub fn new(size: u32) -> TilingResult<Self> {
		if size == 0 || !size.is_power_of_two() {
			return Err(TilingError::configuration(format!(
				"tile size {size} is not a power of two"
			)));
		}
		Ok(TileSize(size))
	}

	/// Edge length in pixels.
	pub fn size(&self) -> u32 {
		self.0
	}

	/// Pixel count of one full tile band buffer.
	pub fn area(&self) -> usize {
		(self.0 as usize) * (self.0 as usize)
	}
}

impl Debug for TileSize {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "TileSize({})", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(64)]
	#[case(256)]
	#[case(512)]
	#[case(1024)]
	fn accepts_powers_of_two(#[case] size: u32) {
		assert_eq!(TileSize::new(size).unwrap().size(), size);
	}

	#[rstest]
	#[case(0)]
	#[case(100)]
	#[case(255)]
	#[case(300)]
	fn rejects_other_sizes(#[case] size: u32) {
		let err = TileSize::new(size).unwrap_err();
		assert!(matches!(err, TilingError::Configuration(_)));
	}

	#[test]
	fn area_is_squared_edge() {
		assert_eq!(TileSize::new(256).unwrap().area(), 65536);
	}
}
