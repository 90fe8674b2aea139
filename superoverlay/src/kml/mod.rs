//! Superoverlay metadata tree.
//!
//! One KML document per tile plus a root/index document. Each document
//! carries the tile's ground overlay and region, and links up to four
//! documents of the next-finer level; viewers follow the links as their
//! viewport demands more detail.

mod builder;
mod record;
mod writer;

pub use builder::MetadataTreeBuilder;
pub use record::KmlTileRecord;
pub use writer::{render_root_document, render_tile_document};

use itertools::Itertools;
use std::fs;
use std::path::Path;
use superoverlay_core::{GeoBBox, RasterSource, TileSize, TilingError, TilingResult, pyramid};

/// Builds and writes the complete metadata tree of `raster` into
/// `out_dir`: the root document `{base_name}.kml` plus one document per
/// tile at every pyramid level.
///
/// The raster must already carry the overviews the pyramid needs; a
/// mismatch is fatal before anything is written.
pub fn generate_metadata_tree(
	raster: &dyn RasterSource,
	tile_size: u32,
	out_dir: &Path,
	base_name: &str,
) -> TilingResult<()> {
	let tile_size = TileSize::new(tile_size)?;
	let level_count = pyramid::compute_level_count(tile_size.size(), raster.width(), raster.height())?;
	let tree = MetadataTreeBuilder::collect(raster, tile_size, level_count)?;

	fs::create_dir_all(out_dir).map_err(|e| TilingError::tile_io(out_dir.display().to_string(), e))?;

	log::info!(
		"writing {} metadata documents into {:?}",
		tree.records().len() + 1,
		out_dir
	);

	let root_path = out_dir.join(format!("{base_name}.kml"));
	let top_href = out_dir.join(tree.top_record().document_file_name());
	let root = render_root_document(base_name, &image_bbox(raster)?, &top_href.display().to_string());
	fs::write(&root_path, root).map_err(|e| TilingError::tile_io(root_path.display().to_string(), e))?;

	for index in 0..tree.records().len() {
		let record = &tree.records()[index];
		let children = tree.children_of(index)?;
		let children = children.iter().map(|&i| &tree.records()[i]).collect_vec();

		let path = out_dir.join(record.document_file_name());
		let document = render_tile_document(record, &children);
		fs::write(&path, document).map_err(|e| TilingError::tile_io(path.display().to_string(), e))?;
	}
	Ok(())
}

/// Ground extent of the whole raster, from its geotransform.
pub fn image_bbox(raster: &dyn RasterSource) -> TilingResult<GeoBBox> {
	let transform = raster.geo_transform().checked()?;
	let width = f64::from(raster.width());
	let height = f64::from(raster.height());
	GeoBBox::new(
		transform.envelope_left(width, height),
		transform.envelope_bottom(width, height),
		transform.envelope_right(width, height),
		transform.envelope_top(width, height),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use superoverlay_core::{GeoTransform, MemoryRaster};
	use tempfile::TempDir;

	fn raster_with_overviews(width: u32, height: u32) -> MemoryRaster {
		let band = vec![9u8; (width as usize) * (height as usize)];
		let mut raster = MemoryRaster::from_bands(
			width,
			height,
			vec![band],
			GeoTransform::new([-60.0, 0.25, 0.0, 10.0, 0.0, -0.25]),
			"EPSG:4326".to_string(),
		)
		.unwrap();
		let level_count = pyramid::compute_level_count(256, width, height).unwrap();
		pyramid::reconcile_overviews(&mut raster, level_count).unwrap();
		raster
	}

	#[test]
	fn tree_writes_root_and_one_document_per_tile() {
		let raster = raster_with_overviews(600, 600);
		let dir = TempDir::new().unwrap();

		generate_metadata_tree(&raster, 256, dir.path(), "scene").unwrap();

		assert!(dir.path().join("scene.kml").exists());
		// level-major sample across the pyramid, with swapped grid axes
		for name in ["0_0_0.kml", "1_0_0.kml", "1_1_0.kml", "2_0_0.kml", "2_2_2.kml", "2_0_2.kml"] {
			assert!(dir.path().join(name).exists(), "missing {name}");
		}
		assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 15);
	}

	#[test]
	fn root_document_links_the_coarsest_tile() {
		let raster = raster_with_overviews(600, 600);
		let dir = TempDir::new().unwrap();
		generate_metadata_tree(&raster, 256, dir.path(), "scene").unwrap();

		let root = fs::read_to_string(dir.path().join("scene.kml")).unwrap();
		assert!(root.contains("Tiles from scene"));
		assert!(root.contains("0_0_0.kml"));
		// image box from the geotransform: 600 pixels at 0.25 units
		assert!(root.contains("<west>-60</west>"));
		assert!(root.contains("<east>90</east>"));
		assert!(root.contains("<north>10</north>"));
		assert!(root.contains("<south>-140</south>"));
	}

	#[test]
	fn tile_documents_link_their_quad_children() {
		let raster = raster_with_overviews(600, 600);
		let dir = TempDir::new().unwrap();
		generate_metadata_tree(&raster, 256, dir.path(), "scene").unwrap();

		// the coarsest tile links all four level-1 tiles
		let top = fs::read_to_string(dir.path().join("0_0_0.kml")).unwrap();
		assert_eq!(top.matches("<NetworkLink>").count(), 4);

		// the deepest level has no further links
		let leaf = fs::read_to_string(dir.path().join("2_0_0.kml")).unwrap();
		assert_eq!(leaf.matches("<NetworkLink>").count(), 0);
		assert!(leaf.contains("<href>2_0_0.png</href>"));

		// an edge parent links only its existing children
		let edge = fs::read_to_string(dir.path().join("1_1_1.kml")).unwrap();
		assert_eq!(edge.matches("<NetworkLink>").count(), 1);
		assert!(edge.contains("<href>2_2_2.kml</href>"));
	}

	#[test]
	fn image_bbox_spans_the_raster() {
		let raster = raster_with_overviews(600, 300);
		let bbox = image_bbox(&raster).unwrap();
		assert_eq!(bbox.as_tuple(), (-60.0, 10.0 - 75.0, -60.0 + 150.0, 10.0));
	}
}
