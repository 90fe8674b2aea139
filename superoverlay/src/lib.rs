//! # superoverlay
//!
//! Converts a georeferenced raster into a multi-resolution pyramid of
//! square PNG tiles plus a linked tree of KML metadata documents
//! (superoverlay-style), suitable for progressive-detail map viewers.
//!
//! The three driver-facing operations:
//! - [`plan_pyramid`] computes how many reduced-resolution levels a raster
//!   needs for a given tile size;
//! - [`tiler::generate_tiles`] materializes every tile of every level;
//! - [`kml::generate_metadata_tree`] writes the matching metadata tree.

pub mod kml;
pub mod tiler;

pub use superoverlay_core::{
	BandStatistics, GeoBBox, GeoTransform, MemoryRaster, PixelType, PyramidLevel, RasterSource, Resampling,
	TileAddress, TileGeometry, TileGrid, TileSize, TileWindow, TilingError, TilingResult, grid, mercator,
	progress, pyramid, raster, types,
};

pub use kml::generate_metadata_tree;
pub use tiler::{StretchMode, TilingOptions, generate_tiles};

/// Number of reduced-resolution levels a raster of the given pixel size
/// needs so its coarsest level fits one tile.
pub fn plan_pyramid(tile_size: u32, width: u32, height: u32) -> TilingResult<u32> {
	pyramid::compute_level_count(tile_size, width, height)
}
