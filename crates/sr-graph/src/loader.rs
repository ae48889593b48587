//! CSV street-segment loader and the segment geometry catalog.
//!
//! # CSV format
//!
//! One row per street segment.  Coordinates are planar (projected) metres.
//!
//! ```csv
//! segment_id,length,speed,geometry
//! 1201,,50,"LINESTRING (250100.5 5185200.0, 250180.0 5185260.0)"
//! 1202,87.5,,"250180.0 5185260.0, 250240.0 5185300.0"
//! ```
//!
//! | Column       | Meaning                                                |
//! |--------------|--------------------------------------------------------|
//! | `segment_id` | source `OBJECTID` (u64)                                |
//! | `length`     | optional explicit length; empty = polyline length      |
//! | `speed`      | optional posted speed; informational only              |
//! | `geometry`   | WKT `LINESTRING (x y, ...)` or a bare `x y, x y` list  |
//!
//! Geometry is read with the `wkt` crate; Z and M ordinates are dropped.
//! Rows whose geometry does not parse are logged and skipped; a malformed
//! CSV row is a hard error.

use std::io::Read;
use std::path::Path;

use geo::LineString;
use log::warn;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use wkt::TryFromWkt;

use sr_core::{PlanarPoint, SegmentId};

use crate::network::Segment;
use crate::{GraphError, GraphResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SegmentRecord {
    segment_id: u64,
    length:     Option<f64>,
    speed:      Option<f64>,
    geometry:   String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load street segments from a CSV file.
pub fn load_segments_csv(path: &Path) -> GraphResult<Vec<Segment>> {
    let file = std::fs::File::open(path)?;
    load_segments_reader(file)
}

/// Like [`load_segments_csv`] but accepts any `Read` source.
pub fn load_segments_reader<R: Read>(reader: R) -> GraphResult<Vec<Segment>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut segments = Vec::new();

    for result in csv_reader.deserialize::<SegmentRecord>() {
        let row = result.map_err(|e| GraphError::Parse(e.to_string()))?;
        let id = SegmentId(row.segment_id);
        match parse_linestring(&row.geometry) {
            Ok(vertices) => segments.push(Segment {
                id,
                vertices,
                length: row.length,
                speed:  row.speed,
            }),
            Err(reason) => warn!("skipping segment {id}: {reason}"),
        }
    }

    Ok(segments)
}

/// Parse a WKT `LINESTRING` or a bare comma-separated `x y` vertex list.
///
/// A bare list is wrapped as `LINESTRING (...)` so both forms go through the
/// same WKT reader.  Z and M ordinates are dropped.
pub fn parse_linestring(text: &str) -> Result<Vec<PlanarPoint>, String> {
    let body = text.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let bare = body.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    let parsed = if bare {
        LineString::<f64>::try_from_wkt_str(&format!("LINESTRING ({body})"))
    } else {
        LineString::<f64>::try_from_wkt_str(body)
    };
    let line = parsed.map_err(|e| format!("invalid geometry {text:?}: {e}"))?;

    Ok(line.coords().map(|c| PlanarPoint::new(c.x, c.y)).collect())
}

// ── SegmentCatalog ────────────────────────────────────────────────────────────

/// Full polyline geometry per source segment.
///
/// The graph only keeps segment endpoints; route geometry for display is
/// recovered here through the segment ids of a path.  A repeated id keeps
/// the last geometry seen, matching the graph's duplicate policy.
#[derive(Default)]
pub struct SegmentCatalog {
    by_id: FxHashMap<SegmentId, Vec<PlanarPoint>>,
}

impl SegmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments<'a, I>(segments: I) -> Self
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let mut catalog = Self::new();
        for s in segments {
            catalog.insert(s.id, s.vertices.clone());
        }
        catalog
    }

    pub fn insert(&mut self, id: SegmentId, vertices: Vec<PlanarPoint>) {
        self.by_id.insert(id, vertices);
    }

    pub fn get(&self, id: SegmentId) -> Option<&[PlanarPoint]> {
        self.by_id.get(&id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
