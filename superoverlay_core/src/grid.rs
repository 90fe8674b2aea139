//! Tile grid enumeration for one pyramid level.
//!
//! A level's raster is partitioned into full tiles plus up to three groups
//! of remainder tiles. The iteration order is part of the contract: the
//! tile writer and the metadata tree builder enumerate the grid
//! independently and must agree on which cells exist and in which order
//! they appear.
//!
//! Passes, in order:
//! 1. all full tiles, grid X outer, grid Y inner;
//! 2. the remainder column at `grid_x = full_count_x` (width remainder);
//! 3. the remainder row at `grid_y = full_count_y` (height remainder);
//! 4. the single remainder corner, when both remainders are nonzero.

use crate::TileSize;

/// The tile grid of one pyramid level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
	width: u32,
	height: u32,
	tile_size: u32,
}

/// One grid cell: its grid coordinates and its valid pixel size, which is
/// smaller than the tile size only for remainder cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileWindow {
	pub grid_x: u32,
	pub grid_y: u32,
	pub width: u32,
	pub height: u32,
}

impl TileWindow {
	/// Pixel offset of this cell in the level's raster.
	pub fn pixel_offset(&self, tile_size: TileSize) -> (u32, u32) {
		(self.grid_x * tile_size.size(), self.grid_y * tile_size.size())
	}
}

impl TileGrid {
	pub fn new(width: u32, height: u32, tile_size: TileSize) -> TileGrid {
		TileGrid {
			width,
			height,
			tile_size: tile_size.size(),
		}
	}

	/// Number of full-size tile columns.
	pub fn full_count_x(&self) -> u32 {
		self.width / self.tile_size
	}

	/// Number of full-size tile rows.
	pub fn full_count_y(&self) -> u32 {
		self.height / self.tile_size
	}

	/// Width in pixels of the remainder column, 0 when the width divides
	/// evenly.
	pub fn remainder_x(&self) -> u32 {
		self.width % self.tile_size
	}

	/// Height in pixels of the remainder row, 0 when the height divides
	/// evenly.
	pub fn remainder_y(&self) -> u32 {
		self.height % self.tile_size
	}

	/// Total number of cells the iterator will yield.
	pub fn tile_count(&self) -> u64 {
		let mut count = u64::from(self.full_count_x()) * u64::from(self.full_count_y());
		if self.remainder_x() > 0 {
			count += u64::from(self.full_count_y());
		}
		if self.remainder_y() > 0 {
			count += u64::from(self.full_count_x());
		}
		if self.remainder_x() > 0 && self.remainder_y() > 0 {
			count += 1;
		}
		count
	}

	pub fn windows(&self) -> TileGridIterator {
		TileGridIterator {
			grid: *self,
			pass: Pass::Full,
			x: 0,
			y: 0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
	Full,
	EdgeColumn,
	EdgeRow,
	Corner,
	Done,
}

/// Iterator over all cells of a [`TileGrid`] in the documented pass order.
#[derive(Clone, Debug)]
pub struct TileGridIterator {
	grid: TileGrid,
	pass: Pass,
	x: u32,
	y: u32,
}

impl Iterator for TileGridIterator {
	type Item = TileWindow;

	fn next(&mut self) -> Option<TileWindow> {
		let full_x = self.grid.full_count_x();
		let full_y = self.grid.full_count_y();
		let rem_x = self.grid.remainder_x();
		let rem_y = self.grid.remainder_y();
		let size = self.grid.tile_size;

		loop {
			match self.pass {
				Pass::Full => {
					if self.x < full_x && self.y < full_y {
						let window = TileWindow {
							grid_x: self.x,
							grid_y: self.y,
							width: size,
							height: size,
						};
						self.y += 1;
						if self.y == full_y {
							self.y = 0;
							self.x += 1;
						}
						return Some(window);
					}
					self.pass = Pass::EdgeColumn;
					self.x = 0;
					self.y = 0;
				}
				Pass::EdgeColumn => {
					if rem_x > 0 && self.y < full_y {
						let window = TileWindow {
							grid_x: full_x,
							grid_y: self.y,
							width: rem_x,
							height: size,
						};
						self.y += 1;
						return Some(window);
					}
					self.pass = Pass::EdgeRow;
					self.y = 0;
				}
				Pass::EdgeRow => {
					if rem_y > 0 && self.x < full_x {
						let window = TileWindow {
							grid_x: self.x,
							grid_y: full_y,
							width: size,
							height: rem_y,
						};
						self.x += 1;
						return Some(window);
					}
					self.pass = Pass::Corner;
					self.x = 0;
				}
				Pass::Corner => {
					self.pass = Pass::Done;
					if rem_x > 0 && rem_y > 0 {
						return Some(TileWindow {
							grid_x: full_x,
							grid_y: full_y,
							width: rem_x,
							height: rem_y,
						});
					}
				}
				Pass::Done => return None,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn grid(width: u32, height: u32) -> TileGrid {
		TileGrid::new(width, height, TileSize::new(256).unwrap())
	}

	#[test]
	fn grid_counts_600() {
		let g = grid(600, 600);
		assert_eq!(g.full_count_x(), 2);
		assert_eq!(g.full_count_y(), 2);
		assert_eq!(g.remainder_x(), 88);
		assert_eq!(g.remainder_y(), 88);
		assert_eq!(g.tile_count(), 9);
	}

	#[test]
	fn enumeration_order_is_full_then_column_then_row_then_corner() {
		let windows: Vec<TileWindow> = grid(600, 300).windows().collect();
		let coords: Vec<(u32, u32, u32, u32)> = windows
			.iter()
			.map(|w| (w.grid_x, w.grid_y, w.width, w.height))
			.collect();
		assert_eq!(
			coords,
			vec![
				// full tiles, x outer, y inner
				(0, 0, 256, 256),
				(1, 0, 256, 256),
				// remainder column
				(2, 0, 88, 256),
				// remainder row
				(0, 1, 256, 44),
				(1, 1, 256, 44),
				// corner
				(2, 1, 88, 44),
			]
		);
	}

	#[test]
	fn exact_division_has_no_remainder_passes() {
		let windows: Vec<TileWindow> = grid(512, 256).windows().collect();
		assert_eq!(windows.len(), 2);
		assert!(windows.iter().all(|w| w.width == 256 && w.height == 256));
	}

	#[test]
	fn raster_smaller_than_one_tile_yields_only_the_corner() {
		let windows: Vec<TileWindow> = grid(100, 80).windows().collect();
		assert_eq!(
			windows,
			vec![TileWindow {
				grid_x: 0,
				grid_y: 0,
				width: 100,
				height: 80,
			}]
		);
	}

	#[test]
	fn partition_covers_raster_exactly_once() {
		// the union of all windows covers [0,w)x[0,h) with no overlap
		for (w, h) in [(600, 600), (1000, 700), (256, 256), (100, 900), (513, 511)] {
			let g = grid(w, h);
			let mut covered = vec![false; (w as usize) * (h as usize)];
			for window in g.windows() {
				let (xoff, yoff) = window.pixel_offset(TileSize::new(256).unwrap());
				for y in yoff..yoff + window.height {
					for x in xoff..xoff + window.width {
						let i = (y as usize) * (w as usize) + (x as usize);
						assert!(!covered[i], "pixel ({x}, {y}) covered twice in {w}x{h}");
						covered[i] = true;
					}
				}
			}
			assert!(covered.iter().all(|c| *c), "gap in coverage for {w}x{h}");
			assert_eq!(g.windows().count() as u64, g.tile_count());
		}
	}

	#[test]
	fn window_pixel_offsets() {
		let size = TileSize::new(256).unwrap();
		let window = TileWindow {
			grid_x: 2,
			grid_y: 1,
			width: 88,
			height: 256,
		};
		assert_eq!(window.pixel_offset(size), (512, 256));
	}
}
