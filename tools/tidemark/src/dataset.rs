//! GeoJSON coastline loader
//!
//! Reads a `FeatureCollection` of `LineString` / `MultiLineString` features
//! into named polylines. Each part of a multi-line becomes its own polyline.
//! Other geometry types are skipped with a warning, as are features whose
//! coordinates do not have the expected shape.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use tidemark_common::Polyline;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Load every usable polyline from a GeoJSON file.
pub fn load(path: &Path) -> Result<Vec<Polyline>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to open coastline file {}", path.display()))?;
    let polylines =
        parse(&text).with_context(|| format!("cannot load coastline {}", path.display()))?;

    debug!(path = %path.display(), polylines = polylines.len(), "coastline file read");
    Ok(polylines)
}

/// Parse polylines from an in-memory GeoJSON document.
pub fn parse(json: &str) -> Result<Vec<Polyline>> {
    let collection: FeatureCollection =
        serde_json::from_str(json).context("coastline document is not valid GeoJSON")?;
    polylines(collection)
}

fn polylines(collection: FeatureCollection) -> Result<Vec<Polyline>> {
    if collection.kind != "FeatureCollection" {
        bail!(
            "expected a GeoJSON FeatureCollection, found '{}'",
            collection.kind
        );
    }

    let mut out = Vec::new();
    for (n, feature) in collection.features.into_iter().enumerate() {
        let name = feature_name(feature.properties.as_ref(), n);
        let Some(geometry) = feature.geometry else {
            warn!(feature = %name, "feature has no geometry, skipped");
            continue;
        };

        let parts = match geometry.kind.as_str() {
            "LineString" => serde_json::from_value::<Vec<Vec<f64>>>(geometry.coordinates)
                .map(|line| vec![line]),
            "MultiLineString" => {
                serde_json::from_value::<Vec<Vec<Vec<f64>>>>(geometry.coordinates)
            }
            other => {
                warn!(feature = %name, geometry = other, "unsupported geometry type, skipped");
                continue;
            }
        };

        let parts = match parts {
            Ok(parts) => parts,
            Err(err) => {
                warn!(feature = %name, error = %err, "malformed coordinates, skipped");
                continue;
            }
        };

        for part in parts {
            match to_lon_lat(&part) {
                Some(coordinates) => out.push(Polyline::new(name.clone(), coordinates)),
                None => warn!(feature = %name, "position with fewer than two values, skipped"),
            }
        }
    }

    Ok(out)
}

/// `properties.name`, then `properties.featurecla`, then `feature-<n>`
fn feature_name(properties: Option<&Map<String, Value>>, n: usize) -> String {
    properties
        .and_then(|props| {
            ["name", "featurecla"]
                .iter()
                .find_map(|key| props.get(*key).and_then(Value::as_str))
        })
        .map(str::to_owned)
        .unwrap_or_else(|| format!("feature-{n}"))
}

// Extra values (elevation) are ignored
fn to_lon_lat(positions: &[Vec<f64>]) -> Option<Vec<(f64, f64)>> {
    positions
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Some((*lon, *lat)),
            _ => None,
        })
        .collect()
}
