//! One metadata record per generated tile.

use std::cmp::Ordering;
use superoverlay_core::{TileAddress, TileGeometry};

/// Metadata of one tile: its address in the pyramid and its ground-space
/// geometry. Records are ordered ascending by (level, grid X, grid Y) so
/// each level forms one contiguous run in a sorted collection.
#[derive(Clone, Debug, PartialEq)]
pub struct KmlTileRecord {
	pub address: TileAddress,
	pub geometry: TileGeometry,
}

impl KmlTileRecord {
	pub fn new(address: TileAddress, geometry: TileGeometry) -> KmlTileRecord {
		KmlTileRecord { address, geometry }
	}

	/// File name of this tile's raster, `{level}_{gridX}_{gridY}.png`.
	pub fn raster_file_name(&self) -> String {
		crate::tiler::tile_file_name(self.address.level, self.address.grid_x, self.address.grid_y)
	}

	/// File name of this tile's KML document, `{level}_{gridY}_{gridX}.kml`.
	/// Grid X and Y are swapped relative to the raster file name; viewers in
	/// the field rely on the established layout, so it is kept as is.
	pub fn document_file_name(&self) -> String {
		format!(
			"{}_{}_{}.kml",
			self.address.level, self.address.grid_y, self.address.grid_x
		)
	}

	/// Display name used inside the KML documents, matching the document
	/// file's base name.
	pub fn display_name(&self) -> String {
		format!(
			"{}_{}_{}",
			self.address.level, self.address.grid_y, self.address.grid_x
		)
	}

	pub fn is_child_of(&self, coarser: &KmlTileRecord) -> bool {
		self.address.is_child_of(&coarser.address)
	}
}

impl Eq for KmlTileRecord {}

impl Ord for KmlTileRecord {
	fn cmp(&self, other: &Self) -> Ordering {
		self.address.cmp(&other.address)
	}
}

impl PartialOrd for KmlTileRecord {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
