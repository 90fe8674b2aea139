//! KML document rendering.
//!
//! Hand-built XML: the documents are small, their structure is fixed, and
//! the exact element layout is part of the output contract, so a templating
//! or DOM layer would only get in the way.

use crate::kml::KmlTileRecord;
use superoverlay_core::GeoBBox;

/// Pixel threshold at which a viewer switches from a parent overlay to its
/// children. A static viewer hint, not computed from content.
const MIN_LOD_PIXELS: &str = "128";

const XMLNS: &str = "http://earth.google.com/kml/2.2";

/// Minimal indenting XML writer.
struct XmlWriter {
	buffer: String,
	depth: usize,
}

impl XmlWriter {
	fn new() -> XmlWriter {
		XmlWriter {
			buffer: String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"),
			depth: 0,
		}
	}

	fn open(&mut self, tag: &str) {
		self.indent();
		self.buffer.push('<');
		self.buffer.push_str(tag);
		self.buffer.push_str(">\n");
		self.depth += 1;
	}

	fn open_with_attr(&mut self, tag: &str, attr: &str, value: &str) {
		self.indent();
		self.buffer
			.push_str(&format!("<{tag} {attr}=\"{}\">\n", escape(value)));
		self.depth += 1;
	}

	fn close(&mut self, tag: &str) {
		self.depth -= 1;
		self.indent();
		self.buffer.push_str(&format!("</{tag}>\n"));
	}

	fn element(&mut self, tag: &str, text: &str) {
		self.indent();
		self.buffer.push_str(&format!("<{tag}>{}</{tag}>\n", escape(text)));
	}

	fn finish(self) -> String {
		self.buffer
	}

	fn indent(&mut self) {
		for _ in 0..self.depth {
			self.buffer.push_str("  ");
		}
	}
}

fn escape(text: &str) -> String {
	text
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

fn write_box(w: &mut XmlWriter, bbox: &GeoBBox) {
	w.element("north", &bbox.north.to_string());
	w.element("south", &bbox.south.to_string());
	w.element("east", &bbox.east.to_string());
	w.element("west", &bbox.west.to_string());
}

fn write_altitude_zero(w: &mut XmlWriter) {
	w.element("minAltitude", "0");
	w.element("maxAltitude", "0");
}

fn write_lod(w: &mut XmlWriter, with_fade: bool) {
	w.open("Lod");
	w.element("minLodPixels", MIN_LOD_PIXELS);
	w.element("maxLodPixels", "-1");
	if with_fade {
		w.element("minFadeExtent", "0");
		w.element("maxFadeExtent", "0");
	}
	w.close("Lod");
}

// Region of a tile document or child link: the valid-pixel box plus the
// level-of-detail hint.
fn write_tile_region(w: &mut XmlWriter, record: &KmlTileRecord) {
	w.open("Region");
	w.open("LatLonAltBox");
	write_box(w, &record.geometry.region_bbox());
	w.close("LatLonAltBox");
	write_lod(w, false);
	w.close("Region");
}

/// Root/index document: names the pyramid, bounds the whole image and
/// links the top-level tile document.
pub fn render_root_document(base_name: &str, image_box: &GeoBBox, top_document_href: &str) -> String {
	let mut w = XmlWriter::new();
	w.open_with_attr("kml", "xmlns", XMLNS);
	w.open("Document");
	w.element("Name", &format!("Tiles from {base_name}"));

	w.open("Region");
	w.open("LatLonAltBox");
	write_box(&mut w, image_box);
	write_altitude_zero(&mut w);
	w.close("LatLonAltBox");
	w.close("Region");

	w.open("NetworkLink");
	w.element("open", "1");
	w.open("Region");
	w.open("LatLonAltBox");
	write_box(&mut w, image_box);
	write_altitude_zero(&mut w);
	w.close("LatLonAltBox");
	write_lod(&mut w, true);
	w.close("Region");
	w.open("Link");
	w.element("href", top_document_href);
	w.element("viewRefreshMode", "onRegion");
	w.close("Link");
	w.close("NetworkLink");

	w.close("Document");
	w.close("kml");
	w.finish()
}

/// Per-tile document: region, ground overlay over the tile's raster and up
/// to four network links to the next-finer level.
pub fn render_tile_document(record: &KmlTileRecord, children: &[&KmlTileRecord]) -> String {
	let mut w = XmlWriter::new();
	w.open_with_attr("kml", "xmlns", XMLNS);
	w.open("Document");
	w.element("Name", &record.document_file_name());

	write_tile_region(&mut w, record);

	w.open("GroundOverlay");
	w.element("name", &record.display_name());
	w.element("drawOrder", &record.address.level.to_string());
	w.open("Icon");
	w.element("href", &record.raster_file_name());
	w.close("Icon");
	w.open("LatLonBox");
	write_box(&mut w, &record.geometry.overlay_bbox());
	w.close("LatLonBox");
	w.close("GroundOverlay");

	for child in children {
		w.open("NetworkLink");
		w.element("name", &child.display_name());
		write_tile_region(&mut w, child);
		w.open("Link");
		w.element("href", &child.document_file_name());
		w.element("viewRefreshMode", "onRegion");
		w.close("Link");
		w.close("NetworkLink");
	}

	w.close("Document");
	w.close("kml");
	w.finish()
}

#[cfg(test)]
mod tests {
	use super::*;
	use superoverlay_core::{GeoTransform, TileAddress, TileGeometry};

	fn record(level: u32, x: u32, y: u32, valid: u32) -> KmlTileRecord {
		let transform = GeoTransform::new([-60.0, 0.25, 0.0, 10.0, 0.0, -0.25])
			.with_pixel_offset(f64::from(x) * 256.0, f64::from(y) * 256.0);
		KmlTileRecord::new(
			TileAddress::new(level, x, y),
			TileGeometry::new(&transform, 256, valid, 256).unwrap(),
		)
	}

	#[test]
	fn root_document_structure() {
		let bbox = GeoBBox::new(-60.0, -50.0, -30.0, 10.0).unwrap();
		let kml = render_root_document("scene", &bbox, "/out/0_0_0.kml");

		assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
		assert!(kml.contains("<kml xmlns=\"http://earth.google.com/kml/2.2\">"));
		assert!(kml.contains("<Name>Tiles from scene</Name>"));
		assert!(kml.contains("<north>10</north>"));
		assert!(kml.contains("<south>-50</south>"));
		assert!(kml.contains("<minAltitude>0</minAltitude>"));
		assert!(kml.contains("<minFadeExtent>0</minFadeExtent>"));
		assert!(kml.contains("<href>/out/0_0_0.kml</href>"));
		assert!(kml.contains("<viewRefreshMode>onRegion</viewRefreshMode>"));
	}

	#[test]
	fn tile_document_references_raster_and_children() {
		let tile = record(1, 1, 0, 256);
		let child_a = record(2, 2, 0, 256);
		let child_b = record(2, 3, 0, 100);
		let kml = render_tile_document(&tile, &[&child_a, &child_b]);

		assert!(kml.contains("<Name>1_0_1.kml</Name>"));
		assert!(kml.contains("<drawOrder>1</drawOrder>"));
		assert!(kml.contains("<href>1_1_0.png</href>"));
		assert!(kml.contains("<href>2_0_2.kml</href>"));
		assert!(kml.contains("<href>2_0_3.kml</href>"));
		assert_eq!(kml.matches("<NetworkLink>").count(), 2);
	}

	#[test]
	fn region_box_differs_from_overlay_box_at_edge_tiles() {
		let tile = record(0, 0, 0, 88);
		let kml = render_tile_document(&tile, &[]);

		// overlay spans the nominal 256 pixels, the region only the 88 valid
		assert!(kml.contains("<east>4</east>")); // -60 + 256*0.25
		assert!(kml.contains("<east>-38</east>")); // -60 + 88*0.25
	}

	#[test]
	fn leaf_documents_have_no_links() {
		let kml = render_tile_document(&record(2, 0, 0, 256), &[]);
		assert!(!kml.contains("<NetworkLink>"));
	}

	#[test]
	fn text_is_escaped() {
		let bbox = GeoBBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
		let kml = render_root_document("a<b>&c", &bbox, "x.kml");
		assert!(kml.contains("Tiles from a&lt;b&gt;&amp;c"));
	}
}
