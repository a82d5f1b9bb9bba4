// Mapper between the domain trip log and its persisted JSON snapshot
use crate::domain::trip::{DataPoint, Leg, TripLog};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDto {
    // Absent or null both fall back, as a browser-written snapshot may hold either.
    #[serde(default)]
    legs: Option<Vec<LegDto>>,
    #[serde(default)]
    current_leg_index: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegDto {
    id: i64,
    name: String,
    #[serde(default)]
    data_points: Vec<DataPointDto>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataPointDto {
    id: i64,
    timestamp: DateTime<Utc>,
    google_maps_estimate: f64,
    ev_estimate: f64,
    difference: f64,
}

pub fn snapshot_to_json(log: &TripLog) -> serde_json::Result<String> {
    let dto = SnapshotDto {
        legs: Some(log.legs().iter().map(leg_to_dto).collect()),
        current_leg_index: Some(log.current_leg_index()),
    };
    serde_json::to_string(&dto)
}

/// Parses a snapshot. `Ok(None)` means the JSON was well formed but held no
/// legs, which restores as the default log.
pub fn snapshot_from_json(raw: &str) -> serde_json::Result<Option<TripLog>> {
    let dto: SnapshotDto = serde_json::from_str(raw)?;
    let index = dto.current_leg_index.unwrap_or(0);
    let legs: Vec<Leg> = dto
        .legs
        .unwrap_or_default()
        .into_iter()
        .map(leg_from_dto)
        .collect();
    let leg_count = legs.len();

    let log = TripLog::from_parts(legs, index);
    if let Some(log) = &log {
        if log.current_leg_index() != index {
            tracing::warn!(
                "Snapshot current leg index {} out of range for {} legs, using {}",
                index,
                leg_count,
                log.current_leg_index()
            );
        }
    }
    Ok(log)
}

fn leg_to_dto(leg: &Leg) -> LegDto {
    LegDto {
        id: leg.id,
        name: leg.name.clone(),
        data_points: leg.data_points.iter().map(point_to_dto).collect(),
    }
}

fn point_to_dto(point: &DataPoint) -> DataPointDto {
    DataPointDto {
        id: point.id,
        timestamp: point.timestamp,
        google_maps_estimate: point.maps_estimate,
        ev_estimate: point.ev_estimate,
        difference: point.difference,
    }
}

fn leg_from_dto(dto: LegDto) -> Leg {
    Leg {
        id: dto.id,
        name: dto.name,
        data_points: dto.data_points.into_iter().map(point_from_dto).collect(),
    }
}

// The stored difference is kept as-is rather than recomputed.
fn point_from_dto(dto: DataPointDto) -> DataPoint {
    DataPoint {
        id: dto.id,
        timestamp: dto.timestamp,
        maps_estimate: dto.google_maps_estimate,
        ev_estimate: dto.ev_estimate,
        difference: dto.difference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_wire_field_names() {
        let mut log = TripLog::new(1);
        log.push_data_point(DataPoint::new(1_700_000_000_000, ts(1_700_000_000_000), 80.0, 160.0));

        let json: serde_json::Value = serde_json::from_str(&snapshot_to_json(&log).unwrap()).unwrap();
        assert_eq!(json["currentLegIndex"], 0);
        assert_eq!(json["legs"][0]["name"], "Leg 1");
        let point = &json["legs"][0]["dataPoints"][0];
        assert_eq!(point["googleMapsEstimate"], 80.0);
        assert_eq!(point["evEstimate"], 160.0);
        assert_eq!(point["difference"], 80.0);
        assert_eq!(point["timestamp"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_reads_browser_written_snapshot() {
        let raw = r#"{"legs":[{"id":1,"name":"Leg 1","dataPoints":[
            {"id":1760900000123,"timestamp":"2025-10-19T18:53:20.123Z",
             "googleMapsEstimate":80,"evEstimate":160.5,"difference":80.5}]}],
            "currentLegIndex":0}"#;

        let log = snapshot_from_json(raw).unwrap().unwrap();
        let point = &log.legs()[0].data_points[0];
        assert_eq!(point.id, 1_760_900_000_123);
        assert_eq!(point.timestamp, ts(1_760_900_000_123));
        assert_eq!(point.difference, 80.5);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        assert_eq!(snapshot_from_json("{}").unwrap(), None);

        let log = snapshot_from_json(r#"{"legs":[{"id":4,"name":"Leg 1"}]}"#)
            .unwrap()
            .unwrap();
        assert_eq!(log.current_leg_index(), 0);
        assert!(log.current_leg().data_points.is_empty());

        assert_eq!(snapshot_from_json(r#"{"legs":null,"currentLegIndex":2}"#).unwrap(), None);
    }

    #[test]
    fn test_null_index_keeps_legs() {
        let raw = r#"{"legs":[{"id":1,"name":"Leg 1","dataPoints":[
            {"id":2,"timestamp":"2026-10-19T15:45:12.000Z",
             "googleMapsEstimate":80,"evEstimate":160,"difference":80}]}],
            "currentLegIndex":null}"#;

        let log = snapshot_from_json(raw).unwrap().unwrap();
        assert_eq!(log.current_leg_index(), 0);
        assert_eq!(log.total_data_points(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let raw = r#"{"legs":[{"id":1,"name":"Leg 1","dataPoints":[]}],"currentLegIndex":3}"#;
        let log = snapshot_from_json(raw).unwrap().unwrap();
        assert_eq!(log.current_leg_index(), 0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(snapshot_from_json("not json").is_err());
        assert!(snapshot_from_json(r#"{"legs":"nope"}"#).is_err());
        assert!(snapshot_from_json(r#"{"currentLegIndex":-1}"#).is_err());
    }

    fn arb_point() -> impl Strategy<Value = DataPoint> {
        (0i64..4_102_444_800_000, -1000.0f64..1000.0, -1000.0f64..1000.0)
            .prop_map(|(millis, maps, ev)| DataPoint::new(millis, ts(millis), maps, ev))
    }

    fn arb_log() -> impl Strategy<Value = TripLog> {
        (
            prop::collection::vec(prop::collection::vec(arb_point(), 0..6), 1..5),
            any::<usize>(),
        )
            .prop_map(|(legs, index)| {
                let legs = legs
                    .into_iter()
                    .enumerate()
                    .map(|(i, data_points)| Leg {
                        id: i as i64,
                        name: Leg::default_name(i + 1),
                        data_points,
                    })
                    .collect::<Vec<_>>();
                let index = index % legs.len();
                TripLog::from_parts(legs, index).unwrap()
            })
    }

    proptest! {
        #[test]
        fn prop_snapshot_round_trip(log in arb_log()) {
            let json = snapshot_to_json(&log).unwrap();
            let restored = snapshot_from_json(&json).unwrap();
            prop_assert_eq!(restored, Some(log));
        }
    }
}
