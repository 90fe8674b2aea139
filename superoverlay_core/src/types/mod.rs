mod geo_bbox;
mod geo_transform;
mod tile_address;
mod tile_geometry;
mod tile_size;

pub use geo_bbox::GeoBBox;
pub use geo_transform::{DEFAULT_GEO_TRANSFORM, GeoTransform};
pub use tile_address::TileAddress;
pub use tile_geometry::TileGeometry;
pub use tile_size::TileSize;
