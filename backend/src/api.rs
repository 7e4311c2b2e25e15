//! The advice endpoint: fans out to the sensor, places and asset services
//! and combines their answers into one map-ready payload.

use actix_cors::Cors;
use actix_web::{
    error, get,
    http::header,
    web::{self, Data},
    App, HttpResponse, HttpServer, Responder,
};
use anyhow::Result;
use common::req::{AdviceData, AggregatedPoint};

use crate::aggregate::aggregate_events;
use crate::asset::AssetService;
use crate::cityiq::{CityIq, EventsQuery, LocationsQuery};
use crate::config::Config;
use crate::places::Places;

// The public dataset covers a fixed historical window, so the event queries
// always ask for the same morning. The durations keep each answer under the
// upstream's 1000-event page limit while still catching enough events to
// represent the situation.
const PEDESTRIAN_EVENTS_START: &str = "2017-09-12T08:00:00-08:00";
const PEDESTRIAN_EVENTS_DURATION_MIN: i64 = 10;
const TRAFFIC_EVENTS_START: &str = "2017-09-12T08:00:00-08:00";
const TRAFFIC_EVENTS_DURATION_MIN: i64 = 5;

// maximum quantity of locations to request per search
const MAX_LOCATIONS: u32 = 1000;

pub struct AppState {
    pub config: Config,
    pub cityiq: CityIq,
    pub places: Places,
    pub assets: AssetService,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceQuery {
    /// `"lat1:lng1,lat2:lng2"` corners of the searched area.
    pub bbox: String,
    /// `"lat,lng"` center of the searched area.
    pub location: String,
    /// Search radius around the center, meters.
    pub radius: String,
    /// Place type to look for, e.g. `cafe`.
    pub place_type: String,
}

/// What gets persisted for every served advice.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AdviceRecord<'a> {
    uri: String,
    query: &'a AdviceQuery,
    data: &'a AdviceData,
    /// ms since epoch
    created_at: i64,
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body("advisor")
}

#[get("/api/advice")]
async fn advice(
    query: web::Query<AdviceQuery>,
    state: Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();

    let data = match build_advice(&state, &query).await {
        Ok(data) => data,
        Err(err) => {
            log::error!("advice request failed: {err:#}");
            return Err(error::ErrorInternalServerError("advice request failed"));
        }
    };

    // persist in the background; the response never waits on it
    let state = state.clone();
    let saved = data.clone();
    tokio::spawn(async move {
        match save_advice(&state, &query, &saved).await {
            Ok(()) => log::debug!("advice request saved to asset service"),
            Err(err) => log::warn!("failed to save advice: {err:#}"),
        }
    });

    Ok(web::Json(data))
}

async fn build_advice(state: &AppState, query: &AdviceQuery) -> Result<AdviceData> {
    let (pedestrian_locations, traffic_locations, places) = tokio::try_join!(
        pedestrian_overview(state, &query.bbox),
        traffic_overview(state, &query.bbox),
        state
            .places
            .search_nearby(&query.place_type, &query.location, &query.radius),
    )?;

    Ok(AdviceData {
        pedestrian_locations,
        traffic_locations,
        places,
    })
}

/// Pedestrian counts per walkway location within `bbox`, aggregated over a
/// short fixed window.
async fn pedestrian_overview(state: &AppState, bbox: &str) -> Result<Vec<AggregatedPoint>> {
    let (start_time, end_time) =
        event_window(PEDESTRIAN_EVENTS_START, PEDESTRIAN_EVENTS_DURATION_MIN)?;
    let zone = &state.config.cityiq.pedestrian_zone;

    let locations_query = LocationsQuery {
        q: "locationType:WALKWAY".to_string(),
        bbox: bbox.to_string(),
        size: MAX_LOCATIONS,
    };
    let events_query = EventsQuery {
        location_type: "WALKWAY".to_string(),
        bbox: bbox.to_string(),
        event_type: "PEDEVT".to_string(),
        start_time,
        end_time,
    };

    let (events, locations) = tokio::try_join!(
        state.cityiq.search_events(zone, &events_query),
        state.cityiq.search_locations(zone, &locations_query),
    )?;

    aggregate_events(&events, &locations, "pedestrianCount")
}

/// Vehicle counts per traffic-lane location within `bbox`, aggregated over
/// a short fixed window.
async fn traffic_overview(state: &AppState, bbox: &str) -> Result<Vec<AggregatedPoint>> {
    let (start_time, end_time) = event_window(TRAFFIC_EVENTS_START, TRAFFIC_EVENTS_DURATION_MIN)?;
    let zone = &state.config.cityiq.traffic_zone;

    let locations_query = LocationsQuery {
        q: "locationType:TRAFFIC_LANE".to_string(),
        bbox: bbox.to_string(),
        size: MAX_LOCATIONS,
    };
    let events_query = EventsQuery {
        location_type: "TRAFFIC_LANE".to_string(),
        bbox: bbox.to_string(),
        event_type: "TFEVT".to_string(),
        start_time,
        end_time,
    };

    let (events, locations) = tokio::try_join!(
        state.cityiq.search_events(zone, &events_query),
        state.cityiq.search_locations(zone, &locations_query),
    )?;

    aggregate_events(&events, &locations, "vehicleCount")
}

fn event_window(start: &str, minutes: i64) -> Result<(i64, i64)> {
    let start = chrono::DateTime::parse_from_rfc3339(start)?;
    let end = start + chrono::Duration::minutes(minutes);
    Ok((start.timestamp_millis(), end.timestamp_millis()))
}

async fn save_advice(state: &AppState, query: &AdviceQuery, data: &AdviceData) -> Result<()> {
    let record = AdviceRecord {
        uri: format!("/advice/{}", uuid::Uuid::new_v4()),
        query,
        data,
        created_at: chrono::Utc::now().timestamp_millis(),
    };

    state
        .assets
        .create_assets("advice", serde_json::to_value(record)?)
        .await
}

pub async fn new_http_server(config: Config) -> Result<()> {
    let http = reqwest::Client::new();
    let state = Data::new(AppState {
        cityiq: CityIq::new(http.clone(), config.cityiq.clone()),
        places: Places::new(http.clone(), config.places.clone()),
        assets: AssetService::new(http, config.asset.clone()),
        config: config.clone(),
    });

    let bind_addr = (config.bind_host.clone(), config.bind_port);
    let frontend_origin = config.frontend_origin.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(index)
            .service(advice)
            .wrap(
                Cors::default()
                    .allowed_origin(&frontend_origin)
                    .allowed_methods(vec!["GET"])
                    .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT])
                    .allowed_header(header::CONTENT_TYPE)
                    .max_age(3600),
            )
    })
    .bind((bind_addr.0.as_str(), bind_addr.1))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advice_query_uses_camel_case_parameter_names() {
        let query: AdviceQuery = serde_json::from_str(
            r#"{"bbox":"10:10,20:20","location":"15,15","radius":"500","placeType":"cafe"}"#,
        )
        .unwrap();
        assert_eq!(query.place_type, "cafe");
        assert_eq!(query.radius, "500");
    }

    #[test]
    fn event_window_spans_the_requested_minutes() {
        let (start, end) = event_window(PEDESTRIAN_EVENTS_START, 10).unwrap();
        assert_eq!(end - start, 10 * 60 * 1000);
        // 2017-09-12 08:00 -08:00 == 16:00 UTC
        assert_eq!(start, 1_505_232_000_000);
    }

    #[test]
    fn advice_record_wire_shape() {
        let query = AdviceQuery {
            bbox: "10:10,20:20".into(),
            location: "15,15".into(),
            radius: "500".into(),
            place_type: "cafe".into(),
        };
        let data = AdviceData::default();
        let record = AdviceRecord {
            uri: "/advice/test".into(),
            query: &query,
            data: &data,
            created_at: 42,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["uri"], "/advice/test");
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["query"]["placeType"], "cafe");
        assert!(json["data"]["pedestrianLocations"]
            .as_array()
            .unwrap()
            .is_empty());
    }
}
