//! Global spherical-mercator tiling math.
//!
//! Conversion routines between WGS84 lat/lon, spherical-mercator meters
//! (EPSG:3857), pyramid pixel coordinates and TMS tile addresses, plus the
//! Microsoft quadtree ("quadkey") encoding of tile addresses. Derived from
//! the maptiler tile scheme notes
//! <https://www.maptiler.com/google-maps-coordinates-tile-bounds-projection/>.
//!
//! Tile addresses here follow the TMS convention (row 0 at the southern
//! edge). [`MercatorTile::flipped`] converts to and from the "XYZ"
//! convention used by most slippy-map URLs; the flip is its own inverse.

use crate::{GeoBBox, TilingError, TilingResult};
use itertools::iproduct;
use std::f64::consts::PI;

pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Pixel edge of one mercator grid cell. Fixed by the tile scheme, not by
/// the output tile size of the pyramid engine.
const TILE_SIZE: f64 = 256.0;

const INITIAL_RESOLUTION: f64 = 2.0 * PI * EARTH_RADIUS / TILE_SIZE;
const ORIGIN_SHIFT: f64 = PI * EARTH_RADIUS;

/// A TMS tile address at a given zoom level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MercatorTile {
	pub x: i64,
	pub y: i64,
	pub zoom: u8,
}

impl MercatorTile {
	pub fn new(x: i64, y: i64, zoom: u8) -> MercatorTile {
		MercatorTile { x, y, zoom }
	}

	/// Converts between TMS and XYZ row numbering. Involutive.
	pub fn flipped(&self) -> MercatorTile {
		MercatorTile {
			x: self.x,
			y: (1i64 << self.zoom) - 1 - self.y,
			zoom: self.zoom,
		}
	}

	/// Encodes this TMS address as a Microsoft quadtree key, one digit per
	/// zoom level.
	pub fn to_quadkey(&self) -> String {
		let ty = (1i64 << self.zoom) - 1 - self.y;
		let mut key = String::with_capacity(self.zoom as usize);
		for i in (1..=self.zoom).rev() {
			let mask = 1i64 << (i - 1);
			let mut digit = 0u8;
			if self.x & mask != 0 {
				digit += 1;
			}
			if ty & mask != 0 {
				digit += 2;
			}
			key.push(char::from(b'0' + digit));
		}
		key
	}

	/// Decodes a quadtree key back into a TMS address. The zoom level is the
	/// key length.
	pub fn from_quadkey(quadkey: &str) -> TilingResult<MercatorTile> {
		let zoom = u8::try_from(quadkey.len())
			.ok()
			.filter(|z| *z <= 31)
			.ok_or_else(|| TilingError::configuration(format!("quadkey {quadkey:?} is too long")))?;

		let mut tx = 0i64;
		let mut ty = 0i64;
		for (pos, ch) in quadkey.chars().enumerate() {
			let digit = ch
				.to_digit(10)
				.filter(|d| *d <= 3)
				.ok_or_else(|| TilingError::configuration(format!("invalid quadkey digit {ch:?} in {quadkey:?}")))?;
			let mask = 1i64 << (zoom as usize - 1 - pos);
			if digit & 1 != 0 {
				tx += mask;
			}
			if digit & 2 != 0 {
				ty += mask;
			}
		}
		ty = (1i64 << zoom) - 1 - ty;

		Ok(MercatorTile { x: tx, y: ty, zoom })
	}

	/// Bounds of this tile in EPSG:3857 meters.
	pub fn bounds(&self) -> TilingResult<GeoBBox> {
		let (west, south) = pixels_to_meters(self.x * 256, self.y * 256, self.zoom);
		let (east, north) = pixels_to_meters((self.x + 1) * 256, (self.y + 1) * 256, self.zoom);
		GeoBBox::new(west, south, east, north)
	}

	/// Bounds of this tile in WGS84 degrees.
	pub fn lat_lon_bounds(&self) -> TilingResult<GeoBBox> {
		let meters = self.bounds()?;
		let (south, west) = meters_to_lat_lon(meters.west, meters.south);
		let (north, east) = meters_to_lat_lon(meters.east, meters.north);
		GeoBBox::new(west, south, east, north)
	}
}

/// WGS84 lat/lon in degrees to EPSG:3857 meters.
pub fn lat_lon_to_meters(lat: f64, lon: f64) -> (f64, f64) {
	let mx = lon * ORIGIN_SHIFT / 180.0;
	let my = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
	(mx, my * ORIGIN_SHIFT / 180.0)
}

/// EPSG:3857 meters to WGS84 `(lat, lon)` in degrees.
pub fn meters_to_lat_lon(mx: f64, my: f64) -> (f64, f64) {
	let lon = (mx / ORIGIN_SHIFT) * 180.0;
	let lat = (my / ORIGIN_SHIFT) * 180.0;
	let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
	(lat, lon)
}

/// Ground resolution in meters per pixel at `zoom`, measured at the equator.
pub fn resolution(zoom: u8) -> f64 {
	INITIAL_RESOLUTION / f64::powi(2.0, i32::from(zoom))
}

/// Pyramid pixel coordinates at `zoom` to EPSG:3857 meters.
pub fn pixels_to_meters(px: i64, py: i64, zoom: u8) -> (f64, f64) {
	let res = resolution(zoom);
	(px as f64 * res - ORIGIN_SHIFT, py as f64 * res - ORIGIN_SHIFT)
}

/// EPSG:3857 meters to pyramid pixel coordinates at `zoom`.
pub fn meters_to_pixels(mx: f64, my: f64, zoom: u8) -> (i64, i64) {
	let res = resolution(zoom);
	(((mx + ORIGIN_SHIFT) / res) as i64, ((my + ORIGIN_SHIFT) / res) as i64)
}

/// Flips a pyramid pixel coordinate into raster orientation (row 0 at the
/// top) for the given zoom level.
pub fn pixels_to_raster(px: i64, py: i64, zoom: u8) -> (i64, i64) {
	let map_size = 256i64 << zoom;
	(px, map_size - py)
}

/// TMS tile covering the given pyramid pixel coordinate.
pub fn pixels_to_tile(px: i64, py: i64, zoom: u8) -> MercatorTile {
	MercatorTile {
		x: (px as f64 / TILE_SIZE).ceil() as i64 - 1,
		y: (py as f64 / TILE_SIZE).ceil() as i64 - 1,
		zoom,
	}
}

/// TMS tile covering the given EPSG:3857 coordinate.
pub fn meters_to_tile(mx: f64, my: f64, zoom: u8) -> MercatorTile {
	let (px, py) = meters_to_pixels(mx, my, zoom);
	pixels_to_tile(px, py, zoom)
}

/// TMS tile covering the given WGS84 coordinate.
pub fn lat_lon_to_tile(lat: f64, lon: f64, zoom: u8) -> MercatorTile {
	let (mx, my) = lat_lon_to_meters(lat, lon);
	meters_to_tile(mx, my, zoom)
}

/// Quadkey of the tile covering the given WGS84 coordinate at `zoom`.
pub fn lat_lon_to_quadkey(lat: f64, lon: f64, zoom: u8) -> String {
	lat_lon_to_tile(lat, lon, zoom).to_quadkey()
}

/// Lat/lon bounds of the tile a quadkey names.
pub fn quadkey_to_lat_lon_bounds(quadkey: &str) -> TilingResult<GeoBBox> {
	MercatorTile::from_quadkey(quadkey)?.lat_lon_bounds()
}

/// Maximum zoom level whose resolution is still finer than `pixel_size`.
/// Fails when `pixel_size` is finer than every supported zoom level.
pub fn zoom_for_pixel_size(pixel_size: f64) -> TilingResult<u8> {
	for zoom in 0..30u8 {
		if pixel_size > resolution(zoom) {
			return Ok(if zoom == 0 { 0 } else { zoom - 1 });
		}
	}
	Err(TilingError::GeometryDegenerate(format!(
		"pixel size {pixel_size} is below the resolution of every zoom level"
	)))
}

/// Quadkeys of every tile at `zoom` inside a lat/lon box, row by row from
/// the southern edge. Returns `None` for an inverted (degenerate) box, a
/// best-effort preview path rather than an error.
pub fn quadkeys_in_box(zoom: u8, lat_lon_min: (f64, f64), lat_lon_max: (f64, f64)) -> Option<Vec<String>> {
	if lat_lon_max.0 < lat_lon_min.0 || lat_lon_max.1 < lat_lon_min.1 {
		return None;
	}

	let t_min = lat_lon_to_tile(lat_lon_min.0, lat_lon_min.1, zoom);
	let t_max = lat_lon_to_tile(lat_lon_max.0, lat_lon_max.1, zoom);

	Some(
		iproduct!(t_min.y..=t_max.y, t_min.x..=t_max.x)
			.map(|(ty, tx)| MercatorTile::new(tx, ty, zoom).to_quadkey())
			.collect(),
	)
}
