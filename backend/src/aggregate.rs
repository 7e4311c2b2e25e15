//! Joins raw sensor events against their locations and produces one
//! heat-weighted point per location that saw any events.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use common::geo::{midpoint, parse_corner_pair};
use common::req::{AggregatedPoint, SensorEvent, SensorLocation};

/// Sums the `measure` reading of every event over its location and emits,
/// for each location with a non-zero total, the great-circle midpoint of
/// the location's corner coordinates weighted by that total. Output order
/// follows `locations`. Events referencing an unknown location are dropped
/// with a warning; a malformed coordinate string fails the whole call.
pub fn aggregate_events(
    events: &[SensorEvent],
    locations: &[SensorLocation],
    measure: &str,
) -> Result<Vec<AggregatedPoint>> {
    let known: HashSet<&str> = locations
        .iter()
        .map(|location| location.location_uid.as_str())
        .collect();

    let counts: HashMap<&str, f64> = events.iter().fold(HashMap::new(), |mut counts, event| {
        if known.contains(event.location_uid.as_str()) {
            let value = event.measures.get(measure).copied().unwrap_or(0.0);
            *counts.entry(event.location_uid.as_str()).or_insert(0.0) += value;
        } else {
            log::warn!("location {} for event is not found", event.location_uid);
        }
        counts
    });

    locations
        .iter()
        .filter_map(|location| {
            let count = counts
                .get(location.location_uid.as_str())
                .copied()
                .unwrap_or(0.0);
            if count == 0.0 {
                return None;
            }

            Some(
                parse_corner_pair(&location.coordinates).map(|(a, b)| AggregatedPoint {
                    coordinates: midpoint(a, b),
                    events_count: count,
                }),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::geo::GeoPoint;

    fn location(uid: &str, coordinates: &str) -> SensorLocation {
        SensorLocation {
            location_uid: uid.to_string(),
            coordinates: coordinates.to_string(),
        }
    }

    fn event(uid: &str, measure: &str, value: f64) -> SensorEvent {
        SensorEvent {
            location_uid: uid.to_string(),
            measures: [(measure.to_string(), value)].into_iter().collect(),
        }
    }

    #[test]
    fn no_events_yield_no_points() {
        let locations = vec![location("A", "10:10,20:20")];
        assert!(aggregate_events(&[], &locations, "count").unwrap().is_empty());
    }

    #[test]
    fn no_locations_yield_no_points() {
        let events = vec![event("A", "count", 3.0)];
        assert!(aggregate_events(&events, &[], "count").unwrap().is_empty());
    }

    #[test]
    fn sums_matching_events_and_drops_unknown_ones() {
        let locations = vec![location("A", "10:10,20:20")];
        let events = vec![
            event("A", "count", 3.0),
            event("A", "count", 2.0),
            event("B", "count", 99.0),
        ];

        let points = aggregate_events(&events, &locations, "count").unwrap();

        let expected_mid = midpoint(GeoPoint::new(10.0, 10.0), GeoPoint::new(20.0, 20.0));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].events_count, 5.0);
        assert_eq!(points[0].coordinates, expected_mid);
    }

    #[test]
    fn zero_sum_locations_are_omitted() {
        let locations = vec![
            location("A", "10:10,20:20"),
            location("B", "30:30,40:40"),
        ];
        let events = vec![
            event("A", "count", 1.0),
            event("A", "count", -1.0),
            event("B", "count", 2.0),
        ];

        let points = aggregate_events(&events, &locations, "count").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].events_count, 2.0);
    }

    #[test]
    fn output_follows_location_order_not_event_order() {
        let locations = vec![
            location("A", "0:0,2:2"),
            location("B", "4:4,6:6"),
            location("C", "8:8,9:9"),
        ];
        let events = vec![
            event("C", "count", 1.0),
            event("A", "count", 1.0),
            event("B", "count", 1.0),
        ];

        let points = aggregate_events(&events, &locations, "count").unwrap();
        let expected: Vec<GeoPoint> = [("0:0,2:2"), ("4:4,6:6"), ("8:8,9:9")]
            .iter()
            .map(|s| {
                let (a, b) = parse_corner_pair(s).unwrap();
                midpoint(a, b)
            })
            .collect();

        let got: Vec<GeoPoint> = points.iter().map(|p| p.coordinates).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn missing_measure_contributes_nothing() {
        let locations = vec![location("A", "10:10,20:20")];
        let events = vec![event("A", "count", 4.0), event("A", "otherMeasure", 7.0)];

        let points = aggregate_events(&events, &locations, "count").unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].events_count, 4.0);
    }

    #[test]
    fn malformed_coordinates_fail_the_call() {
        let locations = vec![location("A", "not-coordinates")];
        let events = vec![event("A", "count", 1.0)];

        assert!(aggregate_events(&events, &locations, "count").is_err());
    }

    #[test]
    fn malformed_coordinates_of_an_idle_location_are_ignored() {
        let locations = vec![location("A", "not-coordinates"), location("B", "1:1,3:3")];
        let events = vec![event("B", "count", 1.0)];

        let points = aggregate_events(&events, &locations, "count").unwrap();
        assert_eq!(points.len(), 1);
    }
}
