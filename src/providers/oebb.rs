use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

const TICKER_BASE_URL: &str = "https://fahrplan.oebb.at/bin/stboard.exe/dn";
/// Product filter bitmask for the live ticker (all vehicle classes enabled)
const PRODUCTS_FILTER: &str = "1011111111011";

#[derive(Debug, Error)]
pub enum OebbError {
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("API error: {0}")]
    ApiError(String),
}

/// One departure as reported by the live ticker. Every field is optional;
/// the upstream omits whatever it does not know.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJourney {
    /// Planned departure time
    pub ti: Option<String>,
    /// Planned departure date
    pub da: Option<String>,
    /// Line / train name
    pub pr: Option<String>,
    /// Origin station name
    pub st: Option<String>,
    /// Final destination
    #[serde(rename = "lastStop")]
    pub last_stop: Option<String>,
    /// Real-time block; the upstream sends `false` instead of omitting it
    /// when no real-time data exists
    #[serde(default, deserialize_with = "deserialize_rt")]
    pub rt: Option<RawRealtime>,
}

/// Real-time information attached to a raw journey
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRealtime {
    /// Status flag; "Ausfall" marks a cancelled journey
    pub status: Option<String>,
    /// Delay in minutes; encoded as a number or a numeric string
    #[serde(default, deserialize_with = "deserialize_delay")]
    pub dlm: Option<u32>,
    /// Real-time departure time
    pub dlt: Option<String>,
}

fn deserialize_rt<'de, D>(deserializer: D) -> Result<Option<RawRealtime>, D::Error>
where
    D: Deserializer<'de>,
{
    // Anything that is not a well-formed real-time object (`false`, null, a
    // malformed block) degrades to "no real-time data".
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value @ serde_json::Value::Object(_)) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

fn deserialize_delay<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Delay {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Delay>::deserialize(deserializer)? {
        Some(Delay::Number(n)) => u32::try_from(n).ok(),
        Some(Delay::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Default, Deserialize)]
struct TickerPayload {
    journey: Option<Vec<RawJourney>>,
}

/// Client for the ÖBB live-ticker station board
pub struct OebbClient {
    client: Client,
}

impl OebbClient {
    pub fn new() -> Result<Self, OebbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OebbError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Fetch the departure board for a station by its evaId.
    /// Returns the raw journeys in upstream order; an empty board is not an
    /// error.
    pub async fn get_station_board(
        &self,
        eva_id: u64,
        show_journeys: u32,
    ) -> Result<Vec<RawJourney>, OebbError> {
        let url = format!(
            "{}?L=vs_liveticker&evaId={}&boardType=dep&productsFilter={}&dirInput=&tickerID=dep&start=yes&eqstops=false&showJourneys={}&additionalTime=0&outputMode=tickerDataOnly",
            TICKER_BASE_URL, eva_id, PRODUCTS_FILTER, show_journeys
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OebbError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OebbError::ApiError(format!(
                "HTTP error: {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OebbError::NetworkError(e.to_string()))?;

        parse_ticker_body(&body)
    }
}

/// The ticker endpoint wraps its JSON in a JavaScript assignment
/// (`journeysObj = {...}`); everything before the first brace is discarded.
pub(crate) fn parse_ticker_body(body: &str) -> Result<Vec<RawJourney>, OebbError> {
    let start = body
        .find('{')
        .ok_or_else(|| OebbError::ParseError("no JSON object in ticker response".to_string()))?;

    let payload: TickerPayload = serde_json::from_str(&body[start..])
        .map_err(|e| OebbError::ParseError(e.to_string()))?;

    Ok(payload.journey.unwrap_or_default())
}
