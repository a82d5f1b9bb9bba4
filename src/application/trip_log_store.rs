// Trip log store - Use cases for recording, leg management, clearing and export
use crate::application::clock::Clock;
use crate::application::key_value_store::KeyValueStore;
use crate::domain::estimate::{parse_estimates, ValidationError};
use crate::domain::summary::{LegStats, TripSummary};
use crate::domain::trip::{DataPoint, Leg, TripLog};
use crate::infrastructure::csv_export::render_csv;
use crate::infrastructure::snapshot_mapper::{snapshot_from_json, snapshot_to_json};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::sync::Arc;

/// Storage key the whole log is persisted under.
pub const STORAGE_KEY: &str = "evRangeData";

pub struct TripLogStore {
    log: TripLog,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    last_id: i64,
}

impl TripLogStore {
    /// Restores the log from storage. An absent, unreadable or malformed
    /// snapshot yields the default log; nothing is written until the first
    /// mutation.
    pub fn open(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let restored = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match snapshot_from_json(&raw) {
                Ok(Some(log)) => {
                    tracing::info!(
                        "Restored trip log: {} legs, {} data points",
                        log.legs().len(),
                        log.total_data_points()
                    );
                    Some(log)
                }
                Ok(None) => {
                    tracing::warn!("Snapshot has no legs, starting with an empty log");
                    None
                }
                Err(e) => {
                    tracing::warn!("Discarding malformed snapshot: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not read snapshot, starting with an empty log: {:#}", e);
                None
            }
        };

        let (log, last_id) = match restored {
            Some(log) => {
                let last_id = log.max_id();
                (log, last_id)
            }
            None => {
                let id = clock.now().timestamp_millis();
                (TripLog::new(id), id)
            }
        };

        Self {
            log,
            storage,
            clock,
            last_id,
        }
    }

    pub fn log(&self) -> &TripLog {
        &self.log
    }

    pub fn summary(&self) -> TripSummary {
        TripSummary::from_log(&self.log)
    }

    pub fn leg_stats(&self) -> Vec<LegStats> {
        self.log.legs().iter().map(LegStats::from_leg).collect()
    }

    /// Validates a pair of raw field values and appends the resulting point
    /// to the current leg. Invalid input leaves the log untouched.
    pub fn record_data_point(
        &mut self,
        maps_input: &str,
        ev_input: &str,
    ) -> Result<DataPoint, ValidationError> {
        let (maps, ev) = parse_estimates(maps_input, ev_input)?;
        let (id, timestamp) = self.next_id();
        let point = DataPoint::new(id, timestamp, maps, ev);

        self.log.push_data_point(point.clone());
        tracing::debug!(
            "Recorded data point {} on {}: maps={} ev={} diff={:.2}",
            point.id,
            self.log.current_leg().name,
            point.maps_estimate,
            point.ev_estimate,
            point.difference
        );
        self.persist();

        Ok(point)
    }

    pub fn start_new_leg(&mut self) -> Leg {
        let (id, _) = self.next_id();
        let leg = self.log.push_leg(id).clone();
        tracing::debug!("Started {} (index {})", leg.name, self.log.current_leg_index());
        self.persist();
        leg
    }

    /// Drops every leg and removes the persisted snapshot. Irreversible.
    pub fn clear_all(&mut self) {
        let (id, _) = self.next_id();
        self.log = TripLog::new(id);

        match self.storage.remove(STORAGE_KEY) {
            Ok(()) => tracing::info!("Cleared trip log"),
            Err(e) => tracing::error!("Failed to remove snapshot: {:#}", e),
        }
    }

    /// CSV export with timestamps in the local time zone.
    pub fn export_csv(&self) -> String {
        self.export_csv_in(&Local)
    }

    pub fn export_csv_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        render_csv(&self.log, tz)
    }

    /// UTC calendar date used to name export files.
    pub fn export_date(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    /// Millisecond timestamp id, bumped past the previous one when the clock
    /// has not moved on.
    fn next_id(&mut self) -> (i64, DateTime<Utc>) {
        let now = self.clock.now();
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        let timestamp = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        (id, timestamp)
    }

    fn persist(&self) {
        let result = snapshot_to_json(&self.log)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.storage.set(STORAGE_KEY, &json));

        if let Err(e) = result {
            tracing::error!("Failed to persist trip log: {:#}", e);
        }
    }
}
