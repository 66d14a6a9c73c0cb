//! Yandex Rasp v3 client
//!
//! Implements [`StationDirectory`] over `stations_list/` and [`RouteSearch`]
//! over `search/`. Calls are blocking and bounded by the configured timeout.
//!
//! Search segments that cannot be used (unknown transport type, missing or
//! unparsable timestamps) are skipped with a warning instead of failing the
//! whole search.

use crate::config::RoutesConfig;
use crate::error::RouteError;
use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use voyage_domain::traits::{RouteSearch, StationDirectory};
use voyage_domain::{Country, Region, RouteSegment, Settlement, StationTree, TransportKind};

/// Errors from the transit HTTP API
#[derive(Error, Debug)]
pub enum RaspError {
    /// Request could not be sent or timed out
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Non-success status code
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RaspError> for RouteError {
    fn from(e: RaspError) -> Self {
        RouteError::Service(e.to_string())
    }
}

/// Blocking client for the transit API
pub struct RaspClient {
    base_url: String,
    api_key: Option<String>,
    lang: String,
    client: Client,
}

impl RaspClient {
    /// Create a client
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RaspError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RaspError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            lang: "ru_RU".to_string(),
            client,
        })
    }

    /// Create a client from routes configuration
    pub fn from_config(config: &RoutesConfig, api_key: Option<String>) -> Result<Self, RaspError> {
        Ok(Self::new(config.base_url.clone(), api_key, config.timeout())?.with_lang(&config.lang))
    }

    /// Set the language of search results
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Whether an API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, RaspError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RaspError::Config("transit API key not configured".to_string()))?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        debug!(%url, "Transit API request");

        let response = self
            .client
            .get(&url)
            .query(&[("apikey", api_key), ("format", "json")])
            .query(params)
            .send()
            .map_err(|e| RaspError::Http(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| RaspError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(RaspError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl StationDirectory for RaspClient {
    type Error = RaspError;

    fn list_stations(&self, lang: &str) -> Result<StationTree, Self::Error> {
        let body = self.get("stations_list/", &[("lang", lang.to_string())])?;
        parse_station_tree(&body)
    }
}

impl RouteSearch for RaspClient {
    type Error = RaspError;

    fn search_routes(
        &self,
        from_code: &str,
        to_code: &str,
        date: &str,
        page: u32,
    ) -> Result<Vec<RouteSegment>, Self::Error> {
        let body = self.get(
            "search/",
            &[
                ("from", from_code.to_string()),
                ("to", to_code.to_string()),
                ("date", date.to_string()),
                ("lang", self.lang.clone()),
                ("page", page.to_string()),
            ],
        )?;
        parse_segments(&body)
    }
}

#[derive(Deserialize)]
struct StationsResponse {
    #[serde(default)]
    countries: Vec<CountryDto>,
}

#[derive(Deserialize)]
struct CountryDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    regions: Vec<RegionDto>,
}

#[derive(Deserialize)]
struct RegionDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    settlements: Vec<SettlementDto>,
}

#[derive(Deserialize)]
struct SettlementDto {
    #[serde(default)]
    title: String,
    #[serde(default)]
    codes: CodesDto,
}

#[derive(Deserialize, Default)]
struct CodesDto {
    yandex_code: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    segments: Vec<Value>,
}

#[derive(Deserialize)]
struct SegmentDto {
    thread: ThreadDto,
    departure: String,
    arrival: String,
    from: PointDto,
    to: PointDto,
    duration: Option<f64>,
    distance: Option<f64>,
}

#[derive(Deserialize)]
struct ThreadDto {
    transport_type: String,
    uid: Option<String>,
}

#[derive(Deserialize)]
struct PointDto {
    #[serde(default)]
    title: String,
}

/// Decode a `stations_list/` body
pub fn parse_station_tree(body: &str) -> Result<StationTree, RaspError> {
    let response: StationsResponse =
        serde_json::from_str(body).map_err(|e| RaspError::Decode(e.to_string()))?;

    let countries = response
        .countries
        .into_iter()
        .map(|country| Country {
            title: country.title,
            regions: country
                .regions
                .into_iter()
                .map(|region| Region {
                    title: region.title,
                    settlements: region
                        .settlements
                        .into_iter()
                        .map(|settlement| Settlement {
                            title: settlement.title,
                            code: settlement.codes.yandex_code.unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(StationTree { countries })
}

/// Decode a `search/` body, skipping unusable segments
pub fn parse_segments(body: &str) -> Result<Vec<RouteSegment>, RaspError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| RaspError::Decode(e.to_string()))?;

    let mut segments = Vec::with_capacity(response.segments.len());
    for (idx, raw) in response.segments.into_iter().enumerate() {
        match serde_json::from_value::<SegmentDto>(raw)
            .map_err(|e| e.to_string())
            .and_then(to_segment)
        {
            Ok(segment) => segments.push(segment),
            Err(reason) => warn!(idx, %reason, "Skipping search segment"),
        }
    }
    Ok(segments)
}

fn to_segment(dto: SegmentDto) -> Result<RouteSegment, String> {
    let kind = TransportKind::parse(&dto.thread.transport_type)
        .ok_or_else(|| format!("unknown transport type '{}'", dto.thread.transport_type))?;
    let departure_utc = timestamp(&dto.departure)?;
    let arrival_utc = timestamp(&dto.arrival)?;

    Ok(RouteSegment {
        kind,
        departure_utc,
        arrival_utc,
        origin: dto.from.title,
        destination: dto.to.title,
        ticket_ref: dto.thread.uid.unwrap_or_default(),
        duration_secs: dto
            .duration
            .unwrap_or((arrival_utc - departure_utc) as f64),
        distance_km: dto.distance.unwrap_or(0.0),
    })
}

fn timestamp(value: &str) -> Result<i64, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| format!("bad timestamp '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIONS: &str = r#"{
        "countries": [{
            "title": "Россия",
            "regions": [{
                "title": "Москва и Московская область",
                "settlements": [
                    {"title": "Москва", "codes": {"yandex_code": "c213"}},
                    {"title": "Химки", "codes": {}}
                ]
            }]
        }]
    }"#;

    const SEARCH: &str = r#"{
        "segments": [
            {
                "thread": {"transport_type": "train", "uid": "SU-1"},
                "departure": "2025-05-01T00:35:00+03:00",
                "arrival": "2025-05-01T04:35:00+03:00",
                "from": {"title": "Москва"},
                "to": {"title": "Санкт-Петербург"},
                "duration": 14400.0
            },
            {
                "thread": {"transport_type": "suburban"},
                "departure": "2025-05-01T06:00:00+03:00",
                "arrival": "2025-05-01T07:00:00+03:00",
                "from": {"title": "Москва"},
                "to": {"title": "Тверь"}
            },
            {
                "thread": {"transport_type": "helicopter"},
                "departure": "2025-05-01T06:00:00+03:00",
                "arrival": "2025-05-01T07:00:00+03:00",
                "from": {"title": "A"},
                "to": {"title": "B"}
            },
            {
                "thread": {"transport_type": "bus"},
                "departure": "not a time",
                "arrival": "2025-05-01T07:00:00+03:00",
                "from": {"title": "A"},
                "to": {"title": "B"}
            },
            {"unexpected": true}
        ]
    }"#;

    #[test]
    fn test_parse_station_tree() {
        let tree = parse_station_tree(STATIONS).unwrap();
        assert_eq!(tree.len(), 2);
        let codes: Vec<_> = tree.settlements().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["c213", ""]);
    }

    #[test]
    fn test_parse_segments_skips_unusable() {
        let segments = parse_segments(SEARCH).unwrap();
        assert_eq!(segments.len(), 2);

        let train = &segments[0];
        assert_eq!(train.kind, TransportKind::Train);
        assert_eq!(train.departure_utc, 1746048900);
        assert_eq!(train.arrival_utc, 1746063300);
        assert_eq!(train.ticket_ref, "SU-1");
        assert_eq!(train.destination, "Санкт-Петербург");

        // Missing duration is derived from the timestamps
        assert_eq!(segments[1].kind, TransportKind::Train);
        assert_eq!(segments[1].duration_secs, 3600.0);
        assert_eq!(segments[1].ticket_ref, "");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_segments("<html>"), Err(RaspError::Decode(_))));
        assert!(matches!(parse_station_tree("not json"), Err(RaspError::Decode(_))));
    }

    #[test]
    fn test_empty_search_body() {
        assert!(parse_segments("{}").unwrap().is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = RoutesConfig {
            lang: "en_US".to_string(),
            ..Default::default()
        };
        let client = RaspClient::from_config(&config, Some("key".to_string())).unwrap();
        assert_eq!(client.lang, "en_US");
        assert_eq!(client.base_url, config.base_url);
        assert!(client.is_configured());
    }

    #[test]
    fn test_missing_key_is_a_config_error() {
        let client = RaspClient::new("http://localhost:1/", None, Duration::from_secs(1)).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(client.list_stations("ru_RU"), Err(RaspError::Config(_))));
    }

    #[test]
    fn test_unreachable_service() {
        let client = RaspClient::new(
            "http://localhost:1/",
            Some("key".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let result = client.search_routes("c213", "c2", "2025-05-01", 1);
        assert!(matches!(result, Err(RaspError::Http(_))));

        let route_error: RouteError = result.unwrap_err().into();
        assert!(matches!(route_error, RouteError::Service(_)));
    }
}
