//! Hotspot map layers as a single GeoJSON `FeatureCollection`.
//!
//! Every feature carries a `layer` property naming the overlay it belongs to.
//! Map-level settings (centre, zoom, basemap, heat gradients) travel in the
//! collection's foreign members.

use geo::Point;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use strum::{Display, IntoStaticStr};

use crate::config::AnalysisConfig;
use crate::metrics::Hotspots;
use crate::models::{Result, TripRecord};
use crate::present::theme::{css, ThemePalette};

pub const ZOOM: u8 = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Layer {
    OriginMarker,
    DestinationMarker,
    OriginHeat,
    DestinationHeat,
    RouteLine,
}

fn position(point: Point) -> Vec<f64> {
    vec![point.x(), point.y()]
}

fn feature(layer: Layer, value: Value, mut properties: JsonObject) -> Feature {
    let name: &'static str = layer.into();
    properties.insert("layer".to_string(), json!(name));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn marker(layer: Layer, point: Point, stop: Option<&str>, route: Option<&str>, color: &str) -> Feature {
    let label = match layer {
        Layer::OriginMarker => "Origin",
        _ => "Destination",
    };
    let mut properties = JsonObject::new();
    properties.insert(
        "tooltip".to_string(),
        json!(format!("{}: {} | Route: {}", label, stop.unwrap_or("-"), route.unwrap_or("-"))),
    );
    properties.insert("color".to_string(), json!(color));
    properties.insert("radius".to_string(), json!(3));
    feature(layer, Value::Point(position(point)), properties)
}

fn endpoints(record: &TripRecord) -> Option<(Point, Point)> {
    Some((record.origin_location?, record.destination_location?))
}

/// Deterministic subset of row positions, in sampling order
fn sample_indices(len: usize, amount: usize, seed: u64) -> Vec<usize> {
    if amount >= len {
        return (0..len).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, len, amount).into_vec()
}

/// Markers for a seeded sample of trips, route lines for the head of that
/// sample, and heat points for every mapped trip.
pub fn hotspot_map(hotspots: &Hotspots<'_>, config: &AnalysisConfig, palette: &ThemePalette) -> FeatureCollection {
    let origin_color = css(palette.origin);
    let destination_color = css(palette.destination);
    let line_color = css(palette.route_line);

    let sample: Vec<&TripRecord> = sample_indices(hotspots.trips.len(), config.map_sample_size, config.sample_seed)
        .into_iter()
        .map(|i| hotspots.trips[i])
        .collect();

    let mut features = Vec::new();
    for record in &sample {
        let Some((origin, destination)) = endpoints(record) else {
            continue;
        };
        let route = record.route.as_ref().map(|r| r.as_str());
        features.push(marker(
            Layer::OriginMarker,
            origin,
            record.origin.as_ref().map(|s| s.as_str()),
            route,
            &origin_color,
        ));
        features.push(marker(
            Layer::DestinationMarker,
            destination,
            record.destination.as_ref().map(|s| s.as_str()),
            route,
            &destination_color,
        ));
    }

    for record in &hotspots.trips {
        let Some((origin, destination)) = endpoints(record) else {
            continue;
        };
        features.push(feature(Layer::OriginHeat, Value::Point(position(origin)), JsonObject::new()));
        features.push(feature(Layer::DestinationHeat, Value::Point(position(destination)), JsonObject::new()));
    }

    for record in sample.iter().take(config.route_line_sample_size) {
        let Some((origin, destination)) = endpoints(record) else {
            continue;
        };
        let mut properties = JsonObject::new();
        properties.insert("color".to_string(), json!(line_color));
        properties.insert("weight".to_string(), json!(0.7));
        properties.insert("opacity".to_string(), json!(0.25));
        features.push(feature(
            Layer::RouteLine,
            Value::LineString(vec![position(origin), position(destination)]),
            properties,
        ));
    }

    let mut members = JsonObject::new();
    members.insert("center".to_string(), json!(position(hotspots.center)));
    members.insert("zoom".to_string(), json!(ZOOM));
    members.insert("tiles".to_string(), json!(palette.basemap));
    members.insert(
        "heat_gradients".to_string(),
        json!({
            "origin_heat": palette.heat_gradient(palette.origin, 5),
            "destination_heat": palette.heat_gradient(palette.destination, 5),
        }),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(members),
    }
}

pub fn to_geojson_string(collection: FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GeoJson::from(collection))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::metrics::hotspots;
    use crate::present::theme::Theme;
    use chrono::NaiveDate;

    fn dataset(n: usize) -> Dataset {
        let month = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let records = (0..n)
            .map(|i| {
                let offset = i as f64 * 0.001;
                TripRecord::new("1", month, 1)
                    .with_stops(format!("Stop {i}"), "Kota")
                    .with_locations((-6.2 + offset, 106.8), (-6.3, 106.9 - offset))
            })
            .collect();
        Dataset::from_records("test.csv", records, true)
    }

    fn count(collection: &FeatureCollection, layer: Layer) -> usize {
        let name: &'static str = layer.into();
        collection
            .features
            .iter()
            .filter(|f| f.property("layer").and_then(|v| v.as_str()) == Some(name))
            .count()
    }

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(3, 10, 42), vec![0, 1, 2]);

        let picked = sample_indices(100, 10, 42);
        assert_eq!(picked.len(), 10);
        assert_eq!(picked, sample_indices(100, 10, 42));
        assert!(picked.iter().all(|&i| i < 100));
    }

    #[test]
    fn test_layers_respect_sample_sizes() {
        let dataset = dataset(50);
        let config = AnalysisConfig {
            map_sample_size: 20,
            route_line_sample_size: 5,
            ..AnalysisConfig::default()
        };
        let spots = hotspots(&dataset.view(), &config).unwrap();
        let collection = hotspot_map(&spots, &config, &Theme::Dark.palette());

        assert_eq!(count(&collection, Layer::OriginMarker), 20);
        assert_eq!(count(&collection, Layer::DestinationMarker), 20);
        assert_eq!(count(&collection, Layer::OriginHeat), 50);
        assert_eq!(count(&collection, Layer::DestinationHeat), 50);
        assert_eq!(count(&collection, Layer::RouteLine), 5);
    }

    #[test]
    fn test_map_settings_follow_theme() {
        let dataset = dataset(3);
        let config = AnalysisConfig::default();
        let spots = hotspots(&dataset.view(), &config).unwrap();

        let collection = hotspot_map(&spots, &config, &Theme::Light.palette());
        let members = collection.foreign_members.as_ref().unwrap();
        assert_eq!(members["tiles"], "CartoDB Positron");
        assert_eq!(members["zoom"], 11);

        let json = to_geojson_string(collection).unwrap();
        assert!(json.contains("\"FeatureCollection\""));
    }

    #[test]
    fn test_marker_tooltip() {
        let feature = marker(Layer::OriginMarker, Point::new(106.8, -6.2), Some("Blok M"), None, "#f97316");
        assert_eq!(
            feature.property("tooltip").and_then(|v| v.as_str()),
            Some("Origin: Blok M | Route: -")
        );
        assert_eq!(feature.property("layer").and_then(|v| v.as_str()), Some("origin_marker"));
    }
}
