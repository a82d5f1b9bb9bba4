// Derived views over a trip log
use super::trip::{Leg, TripLog};

#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub total_legs: usize,
    pub total_data_points: usize,
    pub current_leg_name: String,
    pub current_leg_points: usize,
}

impl TripSummary {
    pub fn from_log(log: &TripLog) -> Self {
        let current = log.current_leg();
        Self {
            total_legs: log.legs().len(),
            total_data_points: log.total_data_points(),
            current_leg_name: current.name.clone(),
            current_leg_points: current.data_points.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceRange {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegStats {
    pub name: String,
    pub count: usize,
    /// `None` for a leg with no points.
    pub difference: Option<DifferenceRange>,
}

impl LegStats {
    pub fn from_leg(leg: &Leg) -> Self {
        let count = leg.data_points.len();
        let difference = (count > 0).then(|| {
            let diffs = leg.data_points.iter().map(|p| p.difference);
            let sum: f64 = diffs.clone().sum();
            DifferenceRange {
                mean: sum / count as f64,
                min: diffs.clone().fold(f64::INFINITY, f64::min),
                max: diffs.fold(f64::NEG_INFINITY, f64::max),
            }
        });

        Self {
            name: leg.name.clone(),
            count,
            difference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trip::DataPoint;
    use chrono::DateTime;

    fn leg_with(diffs: &[(f64, f64)]) -> Leg {
        let mut leg = Leg::new(1, "Leg 1".to_string());
        for (i, (maps, ev)) in diffs.iter().enumerate() {
            let ts = DateTime::from_timestamp_millis(i as i64).unwrap();
            leg.data_points.push(DataPoint::new(i as i64 + 2, ts, *maps, *ev));
        }
        leg
    }

    #[test]
    fn test_stats_for_empty_leg() {
        let stats = LegStats::from_leg(&leg_with(&[]));
        assert_eq!(stats.count, 0);
        assert!(stats.difference.is_none());
    }

    #[test]
    fn test_stats_mean_min_max() {
        let stats = LegStats::from_leg(&leg_with(&[(80.0, 160.0), (100.0, 90.0), (50.0, 80.0)]));
        let range = stats.difference.unwrap();
        assert_eq!(stats.count, 3);
        assert!((range.mean - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(range.min, -10.0);
        assert_eq!(range.max, 80.0);
    }

    #[test]
    fn test_summary_counts_all_legs() {
        let mut log = TripLog::new(1);
        log.push_data_point(DataPoint::new(2, DateTime::from_timestamp_millis(2).unwrap(), 1.0, 2.0));
        log.push_leg(3);

        let summary = TripSummary::from_log(&log);
        assert_eq!(summary.total_legs, 2);
        assert_eq!(summary.total_data_points, 1);
        assert_eq!(summary.current_leg_name, "Leg 2");
        assert_eq!(summary.current_leg_points, 0);
    }
}
