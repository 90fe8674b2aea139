//! Address of one tile within the pyramid.
//!
//! Grid coordinates are zero-based in raster pixel-grid order: row-major
//! with the origin at the raster's top-left corner. This is NOT the
//! web-mercator "XYZ" convention; the `mercator` module converts to that
//! separately, on demand.

use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
	pub level: u32,
	pub grid_x: u32,
	pub grid_y: u32,
}

impl TileAddress {
	pub fn new(level: u32, grid_x: u32, grid_y: u32) -> TileAddress {
		TileAddress { level, grid_x, grid_y }
	}

	/// Address of the tile one level coarser that contains this tile.
	/// Each coarser tile covers a 2x2 block of finer tiles.
	pub fn parent(&self) -> Option<TileAddress> {
		if self.level == 0 {
			return None;
		}
		Some(TileAddress {
			level: self.level - 1,
			grid_x: self.grid_x / 2,
			grid_y: self.grid_y / 2,
		})
	}

	/// True when `self` sits at the next-finer level inside the 2x2 block
	/// under `coarser`.
	pub fn is_child_of(&self, coarser: &TileAddress) -> bool {
		if self.level != coarser.level + 1 {
			return false;
		}
		let ini_x = 2 * coarser.grid_x;
		let ini_y = 2 * coarser.grid_y;
		self.grid_x >= ini_x && self.grid_x <= ini_x + 1 && self.grid_y >= ini_y && self.grid_y <= ini_y + 1
	}
}

/// Ascending by level, then grid X, then grid Y. The metadata tree relies
/// on this order to keep each level's records in one contiguous run.
impl Ord for TileAddress {
	fn cmp(&self, other: &Self) -> Ordering {
		self
			.level
			.cmp(&other.level)
			.then(self.grid_x.cmp(&other.grid_x))
			.then(self.grid_y.cmp(&other.grid_y))
	}
}

impl PartialOrd for TileAddress {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Display for TileAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}_{}", self.level, self.grid_x, self.grid_y)
	}
}

impl Debug for TileAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileAddress({}, [{}, {}])", self.level, self.grid_x, self.grid_y)
	}
}
