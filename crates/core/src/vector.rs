//! GeoJSON persistence for geometry collections
//!
//! The geometry storage backend of the pipeline: polygons go out as a
//! FeatureCollection where every feature carries an `id` attribute, and
//! labeled points come in. The CRS rides along as the legacy `crs`
//! foreign member so round-trips through common GIS tools keep the tag.

use crate::crs::Crs;
use crate::error::{Error, Result};
use geo_types::{Point, Polygon};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue};
use std::fs;
use std::path::Path;

fn geojson_err(e: impl std::fmt::Display) -> Error {
    Error::Geometry(e.to_string())
}

fn crs_member(crs: &Crs) -> JsonObject {
    let mut name = JsonObject::new();
    name.insert("name".to_string(), JsonValue::from(crs.to_string()));

    let mut crs_obj = JsonObject::new();
    crs_obj.insert("type".to_string(), JsonValue::from("name"));
    crs_obj.insert("properties".to_string(), JsonValue::Object(name));

    let mut members = JsonObject::new();
    members.insert("crs".to_string(), JsonValue::Object(crs_obj));
    members
}

/// Write polygons as a GeoJSON FeatureCollection.
///
/// Every feature carries an `id` attribute (its position in the input
/// sequence), the minimum schema downstream consumers rely on.
pub fn write_polygons<P: AsRef<Path>>(
    polygons: &[Polygon<f64>],
    crs: Option<&Crs>,
    path: P,
) -> Result<()> {
    let features = polygons
        .iter()
        .enumerate()
        .map(|(i, polygon)| {
            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), JsonValue::from(i as u64));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(polygon))),
                id: Some(Id::Number(i.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: crs.map(crs_member),
    };

    fs::write(path, GeoJson::from(collection).to_string())?;
    Ok(())
}

/// Read polygons from a GeoJSON FeatureCollection, in feature order.
///
/// Non-polygon features are skipped.
pub fn read_polygons<P: AsRef<Path>>(path: P) -> Result<Vec<Polygon<f64>>> {
    let collection = read_collection(path)?;

    let mut polygons = Vec::new();
    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            continue;
        };
        if let Ok(polygon) = Polygon::<f64>::try_from(geometry.value) {
            polygons.push(polygon);
        }
    }

    Ok(polygons)
}

/// Read labeled points from a GeoJSON FeatureCollection.
///
/// The label is taken from the `id` property, falling back to the
/// feature id, falling back to the feature's position.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Point<f64>)>> {
    let collection = read_collection(path)?;

    let mut points = Vec::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let label = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("id"))
            .map(json_to_label)
            .or_else(|| {
                feature.id.as_ref().map(|id| match id {
                    Id::String(s) => s.clone(),
                    Id::Number(n) => n.to_string(),
                })
            })
            .unwrap_or_else(|| index.to_string());

        let Some(geometry) = feature.geometry else {
            continue;
        };
        if let Ok(point) = Point::<f64>::try_from(geometry.value) {
            points.push((label, point));
        }
    }

    Ok(points)
}

fn json_to_label(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_collection<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let contents = fs::read_to_string(path)?;
    let geojson: GeoJson = contents.parse().map_err(geojson_err)?;
    FeatureCollection::try_from(geojson).map_err(geojson_err)
}
