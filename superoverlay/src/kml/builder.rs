//! Collects one metadata record per tile across all pyramid levels and
//! resolves the parent/child linkage between adjacent levels.
//!
//! The grid enumeration here is intentionally the same as the tile
//! writer's: both derive their cells from [`TileGrid`], so the metadata
//! tree and the rendered tiles always agree on which cells exist.

use crate::kml::KmlTileRecord;
use crate::tiler::tile_transform;
use std::ops::Range;
use superoverlay_core::{
	RasterSource, TileAddress, TileGeometry, TileGrid, TileSize, TilingError, TilingResult, pyramid,
};

#[derive(Debug)]
pub struct MetadataTreeBuilder {
	records: Vec<KmlTileRecord>,
	/// Record range of each level, indexed by level.
	level_runs: Vec<Range<usize>>,
	max_level: u32,
}

impl MetadataTreeBuilder {
	/// Enumerates every level's grid, builds one record per tile and sorts
	/// them into level-major order. Single pass, no backtracking.
	pub fn collect(raster: &dyn RasterSource, tile_size: TileSize, level_count: u32) -> TilingResult<MetadataTreeBuilder> {
		let base = raster.geo_transform();

		let mut records = Vec::new();
		for level in pyramid::plan_levels(level_count) {
			let (width, height) = raster.level_size(level.overview)?;
			let grid = TileGrid::new(width, height, tile_size);
			for window in grid.windows() {
				let transform = tile_transform(&base, &level, &window, tile_size);
				let geometry = TileGeometry::new(&transform, tile_size.size(), window.width, window.height)?;
				records.push(KmlTileRecord::new(
					TileAddress::new(level.level, window.grid_x, window.grid_y),
					geometry,
				));
			}
		}
		records.sort();

		// locate each level's contiguous run once; child lookup scans only
		// the run of the next level
		let mut level_runs = Vec::with_capacity(level_count as usize + 1);
		for level in 0..=level_count {
			let start = records.partition_point(|r| r.address.level < level);
			let end = records.partition_point(|r| r.address.level <= level);
			level_runs.push(start..end);
		}

		Ok(MetadataTreeBuilder {
			records,
			level_runs,
			max_level: level_count,
		})
	}

	pub fn records(&self) -> &[KmlTileRecord] {
		&self.records
	}

	pub fn max_level(&self) -> u32 {
		self.max_level
	}

	/// The record every viewer enters through: the first in sort order,
	/// which is the coarsest level's origin tile.
	pub fn top_record(&self) -> &KmlTileRecord {
		&self.records[0]
	}

	/// Indices of the up to four records one level finer that sit inside
	/// the given record's footprint. Records at the deepest level have
	/// none.
	pub fn children_of(&self, index: usize) -> TilingResult<Vec<usize>> {
		let record = &self.records[index];
		if record.address.level == self.max_level {
			return Ok(Vec::new());
		}

		let next_run = self
			.level_runs
			.get(record.address.level as usize + 1)
			.filter(|run| !run.is_empty())
			.ok_or_else(|| {
				TilingError::pyramid_mismatch(format!("no records at level {}", record.address.level + 1))
			})?;

		let mut children = Vec::with_capacity(4);
		for candidate in next_run.clone() {
			if children.len() == 4 {
				break;
			}
			if self.records[candidate].is_child_of(record) {
				children.push(candidate);
			}
		}
		Ok(children)
	}
}
