//! Service configuration.
//!
//! Loaded from TOML by the application; every field has a default so a file
//! only needs the data paths:
//!
//! ```toml
//! segments_path  = "data/streets.csv"
//! addresses_path = "data/addresses.csv"
//! suggest_limit  = 10
//! route_timeout_ms = 2000
//!
//! [projection]
//! kind = "mtm7"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use sr_address::SUGGESTION_LIMIT;
use sr_core::{Identity, Projection, TransverseMercator};

use crate::{QueryError, QueryResult};

/// Which projection converts between source degrees and graph metres.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionConfig {
    /// Coordinates are used as-is (`lon → x`, `lat → y`).
    Identity,
    /// EPSG:32187, NAD83 / MTM zone 7.
    #[default]
    Mtm7,
    /// Any other Transverse Mercator zone.
    TransverseMercator(TransverseMercator),
}

impl ProjectionConfig {
    pub fn build(&self) -> QueryResult<Box<dyn Projection>> {
        Ok(match self {
            ProjectionConfig::Identity => Box::new(Identity),
            ProjectionConfig::Mtm7 => Box::new(TransverseMercator::mtm_zone7()),
            ProjectionConfig::TransverseMercator(tm) => {
                tm.validate()?;
                Box::new(*tm)
            }
        })
    }
}

/// Top-level configuration for a [`RouteService`](crate::RouteService).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Street segment CSV (see `sr_graph::loader`).
    pub segments_path: Option<PathBuf>,

    /// Address CSV (see `sr_address::loader`).
    pub addresses_path: Option<PathBuf>,

    pub projection: ProjectionConfig,

    /// Maximum suggestions returned by `suggest`.  Default: 10.
    pub suggest_limit: usize,

    /// Per-route search deadline.  `None` lets searches run to completion.
    pub route_timeout_ms: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            segments_path:    None,
            addresses_path:   None,
            projection:       ProjectionConfig::default(),
            suggest_limit:    SUGGESTION_LIMIT,
            route_timeout_ms: None,
        }
    }
}

impl ServiceConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> QueryResult<Self> {
        let config: ServiceConfig =
            toml::from_str(text).map_err(|e| QueryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.  Relative data paths are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> QueryResult<Self> {
        let text = std::fs::read_to_string(path).map_err(sr_core::CoreError::Io)?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.segments_path = config.segments_path.map(|p| dir.join(p));
            config.addresses_path = config.addresses_path.map(|p| dir.join(p));
        }
        Ok(config)
    }

    pub fn validate(&self) -> QueryResult<()> {
        if self.suggest_limit == 0 {
            return Err(QueryError::Config("suggest_limit must be at least 1".into()));
        }
        if self.route_timeout_ms == Some(0) {
            return Err(QueryError::Config("route_timeout_ms must be positive".into()));
        }
        if let ProjectionConfig::TransverseMercator(tm) = &self.projection {
            tm.validate()?;
        }
        Ok(())
    }

    pub(crate) fn required_path<'a>(
        path: &'a Option<PathBuf>,
        name: &str,
    ) -> QueryResult<&'a Path> {
        path.as_deref()
            .ok_or_else(|| QueryError::Config(format!("{name} is not set")))
    }
}
