//! Ground-space geometry of a single tile.
//!
//! `tie_x`/`tie_y` anchor the tile's upper-left corner; `res_x`/`res_y` are
//! the per-axis ground size of one pixel at the tile's level (both stored
//! positive, the north-south sign is applied when edges are derived). The
//! valid pixel size equals the nominal tile size for full tiles and is
//! smaller for edge and corner tiles.

use crate::{GeoBBox, GeoTransform, TilingError, TilingResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGeometry {
	pub tie_x: f64,
	pub tie_y: f64,
	pub res_x: f64,
	pub res_y: f64,
	pub tile_size: u32,
	pub valid_x: u32,
	pub valid_y: u32,
}

impl TileGeometry {
	/// Builds the geometry of one tile from the per-tile transform (the base
	/// transform already scaled to the tile's level and offset to its pixel
	/// window).
	pub fn new(
		tile_transform: &GeoTransform,
		tile_size: u32,
		valid_x: u32,
		valid_y: u32,
	) -> TilingResult<TileGeometry> {
		let geometry = TileGeometry {
			tie_x: tile_transform.origin_x(),
			tie_y: tile_transform.origin_y(),
			res_x: tile_transform.pixel_width(),
			res_y: -tile_transform.pixel_height(),
			tile_size,
			valid_x,
			valid_y,
		};
		geometry.checked()
	}

	/// Footprint of the full nominal tile, including the zero-filled padding
	/// of edge tiles. This is the box an image overlay is stretched over.
	pub fn overlay_bbox(&self) -> GeoBBox {
		self.bbox_for(self.tile_size, self.tile_size)
	}

	/// Footprint of the valid pixels only. This is the box that decides when
	/// a viewer should load this tile and its children; it differs from the
	/// overlay box only at edge tiles.
	pub fn region_bbox(&self) -> GeoBBox {
		self.bbox_for(self.valid_x, self.valid_y)
	}

	fn bbox_for(&self, size_x: u32, size_y: u32) -> GeoBBox {
		GeoBBox {
			west: self.tie_x,
			south: self.tie_y - self.res_y * f64::from(size_y),
			east: self.tie_x + self.res_x * f64::from(size_x),
			north: self.tie_y,
		}
	}

	fn checked(self) -> TilingResult<Self> {
		if self.valid_x == 0 || self.valid_y == 0 {
			return Err(TilingError::GeometryDegenerate(format!(
				"tile has no valid pixels ({} x {})",
				self.valid_x, self.valid_y
			)));
		}
		if self.valid_x > self.tile_size || self.valid_y > self.tile_size {
			return Err(TilingError::configuration(format!(
				"valid pixel size {}x{} exceeds tile size {}",
				self.valid_x, self.valid_y, self.tile_size
			)));
		}
		Ok(self)
	}
}
