//! Background refresh of station boards.
//!
//! One task per configured station fetches the upstream board on a fixed
//! interval and commits the outcome into the shared store. A failed fetch
//! only records the error message; the previous snapshot stays readable
//! until the next successful cycle replaces it.

mod types;

pub use types::{BoardStore, DelayStatus, Journey, StationBoard};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};
use tracing::{error, info};

use crate::config::{Config, Station};
use crate::providers::oebb::{OebbClient, OebbError, RawJourney};

/// Manages the per-station refresh loops and owns the board store
pub struct SyncManager {
    client: OebbClient,
    config: Config,
    boards: BoardStore,
    shutdown_tx: watch::Sender<bool>,
}

impl SyncManager {
    pub fn new(config: Config) -> Result<Self, OebbError> {
        let client = OebbClient::new()?;
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            client,
            config,
            boards: Arc::new(RwLock::new(HashMap::new())),
            shutdown_tx,
        })
    }

    /// Get a reference to the board store for API access
    pub fn board_store(&self) -> BoardStore {
        self.boards.clone()
    }

    /// Run one fetch cycle for every configured station. Called once at
    /// startup, before the listener binds, so the first request already
    /// sees a committed board.
    pub async fn sync_once(&self) {
        let fetches = self.config.stations.iter().map(|s| self.sync_station(s));
        futures::future::join_all(fetches).await;
    }

    /// Spawn one periodic refresh task per station and wait for them.
    /// The loops are independent: a persistently failing station never
    /// affects the others. [`SyncManager::shutdown`] stops all of them.
    pub async fn start(self: Arc<Self>) {
        let interval_secs = self.config.board_sync.interval_secs;
        info!(
            stations = self.config.stations.len(),
            interval_secs, "Starting station board sync"
        );

        let mut handles = Vec::new();
        for station in self.config.stations.clone() {
            let mgr = self.clone();
            let mut shutdown_rx = self.shutdown_tx.subscribe();

            handles.push(tokio::spawn(async move {
                if *shutdown_rx.borrow_and_update() {
                    return;
                }

                let mut interval =
                    tokio::time::interval(tokio::time::Duration::from_secs(interval_secs));
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                // The first tick fires immediately; sync_once already covered it.
                interval.tick().await;

                loop {
                    tokio::select! {
                        _ = interval.tick() => mgr.sync_station(&station).await,
                        _ = shutdown_rx.changed() => break,
                    }
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Stop all refresh loops. A cycle already in flight finishes its
    /// commit first.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// One fetch-transform-commit cycle for a single station. Never fails
    /// outward: the outcome, good or bad, is committed into the store.
    async fn sync_station(&self, station: &Station) {
        let result = self
            .client
            .get_station_board(station.eva_id, self.config.board_sync.show_journeys)
            .await;

        match &result {
            Ok(journeys) => {
                info!(
                    station = %station.label,
                    eva_id = station.eva_id,
                    journeys = journeys.len(),
                    "Updated station board"
                );
            }
            Err(e) => {
                error!(
                    station = %station.label,
                    eva_id = station.eva_id,
                    error = %e,
                    "Failed to fetch station board"
                );
            }
        }

        let mut boards = self.boards.write().await;
        commit(&mut boards, station.eva_id, result, Utc::now());
    }
}

/// Commit one cycle's outcome under the store's write lock.
///
/// Success replaces the snapshot wholesale and clears the error; failure
/// records the message and leaves the previous journeys and timestamp in
/// place, creating an empty errored entry when the station has never been
/// fetched successfully.
fn commit(
    boards: &mut HashMap<u64, StationBoard>,
    eva_id: u64,
    result: Result<Vec<RawJourney>, OebbError>,
    now: DateTime<Utc>,
) {
    match result {
        Ok(raw) => {
            boards.insert(
                eva_id,
                StationBoard {
                    journeys: raw.into_iter().map(Journey::from_raw).collect(),
                    last_update: Some(now),
                    last_error: None,
                },
            );
        }
        Err(e) => {
            let entry = boards.entry(eva_id).or_default();
            entry.last_error = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardSyncConfig;
    use chrono::TimeZone;

    fn raw(tram: &str) -> RawJourney {
        RawJourney {
            ti: Some("08:15".to_string()),
            pr: Some(tram.to_string()),
            ..RawJourney::default()
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn successful_cycle_replaces_snapshot_wholesale() {
        let mut boards = HashMap::new();

        commit(&mut boards, 1, Ok(vec![raw("T1"), raw("T2")]), at(100));
        let board = &boards[&1];
        assert_eq!(board.journeys.len(), 2);
        assert_eq!(board.journeys[0].tram.as_deref(), Some("T1"));
        assert_eq!(board.journeys[1].tram.as_deref(), Some("T2"));
        assert_eq!(board.last_update, Some(at(100)));
        assert_eq!(board.last_error, None);

        // The next success does not merge with the previous snapshot.
        commit(&mut boards, 1, Ok(vec![raw("T3")]), at(200));
        let board = &boards[&1];
        assert_eq!(board.journeys.len(), 1);
        assert_eq!(board.journeys[0].tram.as_deref(), Some("T3"));
        assert_eq!(board.last_update, Some(at(200)));
    }

    #[test]
    fn failed_cycle_preserves_previous_snapshot() {
        let mut boards = HashMap::new();
        commit(&mut boards, 1, Ok(vec![raw("T1")]), at(100));

        commit(
            &mut boards,
            1,
            Err(OebbError::NetworkError("timeout".to_string())),
            at(200),
        );

        let board = &boards[&1];
        assert_eq!(board.journeys.len(), 1);
        assert_eq!(board.journeys[0].tram.as_deref(), Some("T1"));
        assert_eq!(board.last_update, Some(at(100)));
        assert_eq!(board.last_error.as_deref(), Some("Network error: timeout"));
    }

    #[test]
    fn failed_cycle_without_prior_data_creates_errored_entry() {
        let mut boards = HashMap::new();

        commit(
            &mut boards,
            1,
            Err(OebbError::ApiError("HTTP error: 503".to_string())),
            at(100),
        );

        let board = &boards[&1];
        assert!(board.journeys.is_empty());
        assert_eq!(board.last_update, None);
        assert_eq!(board.last_error.as_deref(), Some("API error: HTTP error: 503"));
    }

    #[test]
    fn success_after_failure_clears_error() {
        let mut boards = HashMap::new();
        commit(
            &mut boards,
            1,
            Err(OebbError::NetworkError("timeout".to_string())),
            at(100),
        );

        commit(&mut boards, 1, Ok(vec![raw("T1")]), at(200));

        let board = &boards[&1];
        assert_eq!(board.journeys.len(), 1);
        assert_eq!(board.last_update, Some(at(200)));
        assert_eq!(board.last_error, None);
    }

    #[test]
    fn successful_empty_board_commits_with_no_error() {
        let mut boards = HashMap::new();

        commit(&mut boards, 1, Ok(Vec::new()), at(100));

        let board = &boards[&1];
        assert!(board.journeys.is_empty());
        assert_eq!(board.last_update, Some(at(100)));
        assert_eq!(board.last_error, None);
    }

    #[test]
    fn stations_commit_independently() {
        let mut boards = HashMap::new();
        commit(&mut boards, 1, Ok(vec![raw("T1")]), at(100));
        commit(
            &mut boards,
            2,
            Err(OebbError::NetworkError("timeout".to_string())),
            at(100),
        );

        assert_eq!(boards[&1].last_error, None);
        assert_eq!(boards[&1].journeys.len(), 1);
        assert!(boards[&2].journeys.is_empty());
        assert!(boards[&2].last_error.is_some());
    }

    #[tokio::test]
    async fn shutdown_stops_refresh_loops() {
        let config = Config {
            stations: vec![Station {
                eva_id: 1,
                label: "Test".to_string(),
            }],
            cors_origins: Vec::new(),
            cors_permissive: true,
            port: 0,
            board_sync: BoardSyncConfig::default(),
        };

        let manager = Arc::new(SyncManager::new(config).unwrap());
        let handle = tokio::spawn(manager.clone().start());

        manager.shutdown();
        handle.await.unwrap();
    }
}
