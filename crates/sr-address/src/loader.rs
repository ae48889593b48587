//! CSV address loader.
//!
//! # CSV format
//!
//! One row per civic address, positions in geodetic degrees:
//!
//! ```csv
//! name,lon,lat
//! 1020 RUE SAINT-JEAN,-71.21405,46.81208
//! 1022 RUE SAINT-JEAN,-71.21418,46.81203
//! ```
//!
//! The name column may also be headed `ADRESSE` or `display_name`.  Each
//! position is converted to planar coordinates with the supplied
//! [`Projection`] at load time, so the index itself never sees degrees.
//! Rows the projection rejects ([`Projection::validate_input`]) are logged
//! and skipped.  Under `Identity` the columns already hold planar `x`/`y`
//! and only non-finite values are rejected.

use std::io::Read;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use sr_core::{GeoPoint, Projection};

use crate::index::AddressRecord;
use crate::{AddressError, AddressResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AddressRow {
    #[serde(alias = "ADRESSE", alias = "display_name")]
    name: String,
    lon:  f64,
    lat:  f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load address records from a CSV file.
pub fn load_addresses_csv<P>(path: &Path, projection: &P) -> AddressResult<Vec<AddressRecord>>
where
    P: Projection + ?Sized,
{
    let file = std::fs::File::open(path)?;
    load_addresses_reader(file, projection)
}

/// Like [`load_addresses_csv`] but accepts any `Read` source.
pub fn load_addresses_reader<R, P>(reader: R, projection: &P) -> AddressResult<Vec<AddressRecord>>
where
    R: Read,
    P: Projection + ?Sized,
{
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize::<AddressRow>() {
        let row = result.map_err(|e| AddressError::Parse(e.to_string()))?;
        let geo = GeoPoint::new(row.lon, row.lat);
        match projection.validate_input(geo) {
            Ok(()) => records.push(AddressRecord::new(row.name, projection.to_planar(geo))),
            Err(e) => warn!("skipping address {:?}: {e}", row.name),
        }
    }

    Ok(records)
}
