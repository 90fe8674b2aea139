//! Error taxonomy for pyramid and tile generation.
//!
//! Every failure a caller can observe falls into one of five categories.
//! Configuration and precondition problems are raised before any output is
//! written; per-tile I/O problems abort the whole run, since a missing tile
//! would break the child linkage of the metadata tree.

use std::io;
use thiserror::Error;

/// Result type used throughout the crate.
pub type TilingResult<T> = Result<T, TilingError>;

#[derive(Debug, Error)]
pub enum TilingError {
	/// Invalid tile size or an invalid combination of tiling options.
	/// Raised eagerly, before any I/O.
	#[error("configuration error: {0}")]
	Configuration(String),

	/// The overviews present on the raster disagree with the computed
	/// pyramid depth. Never auto-repaired: partially built overviews of
	/// unknown provenance cannot be trusted.
	#[error("pyramid mismatch: {0}")]
	PyramidMismatch(String),

	/// The source cannot be opened or is not a recognized raster format.
	#[error("unreadable raster {path:?}: {reason}")]
	UnreadableRaster { path: String, reason: String },

	/// Failure writing a tile file or metadata document mid-run.
	#[error("tile i/o error at {path:?}: {source}")]
	TileIo {
		path: String,
		#[source]
		source: io::Error,
	},

	/// A computed tile or image footprint has zero width or height.
	/// Best-effort preview paths recover from this by returning no result.
	#[error("degenerate geometry: {0}")]
	GeometryDegenerate(String),
}

impl TilingError {
	pub fn configuration(msg: impl Into<String>) -> TilingError {
		TilingError::Configuration(msg.into())
	}

	pub fn pyramid_mismatch(msg: impl Into<String>) -> TilingError {
		TilingError::PyramidMismatch(msg.into())
	}

	pub fn tile_io(path: impl Into<String>, source: io::Error) -> TilingError {
		TilingError::TileIo {
			path: path.into(),
			source,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_carries_category_and_detail() {
		let e = TilingError::configuration("tile size 100 is not a power of two");
		assert_eq!(
			e.to_string(),
			"configuration error: tile size 100 is not a power of two"
		);

		let e = TilingError::pyramid_mismatch("raster has 3 overviews, pyramid needs 2");
		assert_eq!(e.to_string(), "pyramid mismatch: raster has 3 overviews, pyramid needs 2");
	}

	#[test]
	fn tile_io_preserves_source() {
		let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
		let e = TilingError::tile_io("/tiles/2_0_0.png", io_err);
		assert!(e.to_string().contains("2_0_0.png"));
		assert!(std::error::Error::source(&e).is_some());
	}
}
