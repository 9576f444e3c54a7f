use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::providers::oebb::RawJourney;

/// Real-time status value the upstream uses for cancelled journeys
const CANCELLED_MARKER: &str = "Ausfall";

/// Delay classification derived from a journey's real-time block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DelayStatus {
    OnTime,
    Delayed,
    Cancelled,
}

/// A normalized departure as exposed by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    /// Planned departure time
    pub departure: Option<String>,
    /// Planned departure date
    pub date: Option<String>,
    /// Line / vehicle label
    pub tram: Option<String>,
    /// Origin station name
    pub from: Option<String>,
    /// Final destination
    pub to: Option<String>,
    pub status: DelayStatus,
    /// Delay in minutes, 0 if none
    pub delay_minutes: u32,
    /// Real-time departure, if provided
    pub realtime_time: Option<String>,
}

impl Journey {
    /// Normalize one raw upstream record. Total: missing fields degrade to
    /// defaults, never an error.
    pub fn from_raw(raw: RawJourney) -> Self {
        let rt = raw.rt.unwrap_or_default();

        let status = if rt.status.as_deref() == Some(CANCELLED_MARKER) {
            DelayStatus::Cancelled
        } else if rt.dlm.is_some_and(|d| d > 0) {
            DelayStatus::Delayed
        } else {
            DelayStatus::OnTime
        };

        Journey {
            departure: raw.ti,
            date: raw.da,
            tram: raw.pr,
            from: raw.st,
            to: raw.last_stop,
            status,
            delay_minutes: rt.dlm.unwrap_or(0),
            realtime_time: rt.dlt,
        }
    }
}

/// The latest committed snapshot for one station.
///
/// `journeys` and `last_update` only advance together on a successful fetch;
/// a failed fetch touches `last_error` alone, so the previous snapshot stays
/// readable.
#[derive(Debug, Clone, Default)]
pub struct StationBoard {
    pub journeys: Vec<Journey>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// In-memory store for station boards, keyed by evaId
pub type BoardStore = Arc<RwLock<HashMap<u64, StationBoard>>>;
