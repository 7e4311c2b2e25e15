// keep wire names in sync with the upstream sensor/places APIs
use std::collections::HashMap;

use crate::geo::GeoPoint;

/// A sensor installation as the sensor API reports it. `coordinates` is the
/// upstream's stringly encoding of the two corner points of the location's
/// bounding segment (`"lat1:lng1,lat2:lng2"`).
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorLocation {
    pub location_uid: String,
    pub coordinates: String,
}

/// One raw sensor event. `measures` maps measure names (`pedestrianCount`,
/// `vehicleCount`, ...) to numeric readings.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorEvent {
    pub location_uid: String,
    #[serde(default)]
    pub measures: HashMap<String, f64>,
}

/// One heat-weighted point of the advice response: a location collapsed to
/// the midpoint of its corner coordinates, with the summed event count.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPoint {
    pub coordinates: GeoPoint,
    pub events_count: f64,
}

/// Subset of a nearby-places result the map cares about. The places API
/// uses snake_case wire names, so no renames here.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Place {
    pub name: String,
    pub geometry: PlaceGeometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct PlaceGeometry {
    pub location: GeoPoint,
}

/// Body of a `GET /api/advice` response.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdviceData {
    pub pedestrian_locations: Vec<AggregatedPoint>,
    pub traffic_locations: Vec<AggregatedPoint>,
    pub places: Vec<Place>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_wire_names_are_camel_case() {
        let event: SensorEvent = serde_json::from_str(
            r#"{"locationUid":"loc-1","measures":{"pedestrianCount":4.0}}"#,
        )
        .unwrap();
        assert_eq!(event.location_uid, "loc-1");
        assert_eq!(event.measures["pedestrianCount"], 4.0);

        let location: SensorLocation =
            serde_json::from_str(r#"{"locationUid":"loc-1","coordinates":"10:10,20:20"}"#).unwrap();
        assert_eq!(location.location_uid, "loc-1");
    }

    #[test]
    fn advice_response_shape() {
        let data = AdviceData {
            pedestrian_locations: vec![AggregatedPoint {
                coordinates: GeoPoint::new(15.0, 15.0),
                events_count: 5.0,
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["pedestrianLocations"][0]["eventsCount"], 5.0);
        assert_eq!(json["pedestrianLocations"][0]["coordinates"]["lat"], 15.0);
        assert!(json["trafficLocations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn place_tolerates_missing_optionals() {
        let place: Place = serde_json::from_str(
            r#"{"name":"Cafe","geometry":{"location":{"lat":1.0,"lng":2.0}}}"#,
        )
        .unwrap();
        assert!(place.rating.is_none());
        assert!(place.types.is_empty());
    }
}
