//! A rectangular ground-space extent in the raster's coordinate system.
//!
//! Unlike a lat/lon bounding box this carries no world-range clamping: the
//! same type describes extents in geographic degrees and in projected
//! meters. Only the ordering of the edges is validated.

use crate::{TilingError, TilingResult};
use std::fmt::Debug;

#[derive(Clone, Copy, PartialEq)]
pub struct GeoBBox {
	pub west: f64,
	pub south: f64,
	pub east: f64,
	pub north: f64,
}

impl GeoBBox {
	pub fn new(west: f64, south: f64, east: f64, north: f64) -> TilingResult<GeoBBox> {
		GeoBBox {
			west,
			south,
			east,
			north,
		}
		.checked()
	}

	/// Box edges as `[north, south, west, east]`, the order the KML root
	/// document consumes.
	pub fn as_nswe(&self) -> [f64; 4] {
		[self.north, self.south, self.west, self.east]
	}

	pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
		(self.west, self.south, self.east, self.north)
	}

	pub fn width(&self) -> f64 {
		self.east - self.west
	}

	pub fn height(&self) -> f64 {
		self.north - self.south
	}

	fn checked(self) -> TilingResult<Self> {
		for v in [self.west, self.south, self.east, self.north] {
			if !v.is_finite() {
				return Err(TilingError::GeometryDegenerate(format!(
					"bbox edge {v} is not finite"
				)));
			}
		}
		if self.west > self.east || self.south > self.north {
			return Err(TilingError::GeometryDegenerate(format!(
				"bbox edges are inverted: ({}, {}, {}, {})",
				self.west, self.south, self.east, self.north
			)));
		}
		Ok(self)
	}
}

impl Debug for GeoBBox {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"GeoBBox({}, {}, {}, {})",
			self.west, self.south, self.east, self.north
		)
	}
}
