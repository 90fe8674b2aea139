//! # superoverlay_core
//!
//! Core building blocks for turning a georeferenced raster into a
//! multi-resolution pyramid of square tiles: affine pixel/ground mapping,
//! global web-mercator tiling math, pyramid depth planning, per-level grid
//! enumeration, the raster access seam and progress reporting.
//!
//! The tile generation engine and the KML metadata tree builder that sit
//! on top of these types live in the `superoverlay` crate.

mod error;

pub mod grid;

pub mod mercator;

pub mod progress;

pub mod pyramid;

pub mod raster;

pub mod types;

pub use error::{TilingError, TilingResult};
pub use grid::{TileGrid, TileGridIterator, TileWindow};
pub use pyramid::PyramidLevel;
pub use raster::{BandStatistics, MemoryRaster, PixelType, RasterSource, Resampling};
pub use types::*;
