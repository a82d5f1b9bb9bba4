// Trip log domain model
use chrono::{DateTime, Utc};

pub const DEFAULT_LEG_NAME: &str = "Leg 1";

/// One comparison sample between a maps distance estimate and the EV's own
/// range estimate, in miles.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub maps_estimate: f64,
    pub ev_estimate: f64,
    /// Stored at creation; never recomputed.
    pub difference: f64,
}

impl DataPoint {
    pub fn new(id: i64, timestamp: DateTime<Utc>, maps_estimate: f64, ev_estimate: f64) -> Self {
        Self {
            id,
            timestamp,
            maps_estimate,
            ev_estimate,
            difference: ev_estimate - maps_estimate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub id: i64,
    pub name: String,
    pub data_points: Vec<DataPoint>,
}

impl Leg {
    pub fn new(id: i64, name: String) -> Self {
        Self {
            id,
            name,
            data_points: Vec::new(),
        }
    }

    /// Name given to the leg created at 1-based `position`.
    pub fn default_name(position: usize) -> String {
        format!("Leg {}", position)
    }
}

/// Root aggregate: always at least one leg, and `current_leg_index` always
/// points at one of them.
#[derive(Debug, Clone, PartialEq)]
pub struct TripLog {
    legs: Vec<Leg>,
    current_leg_index: usize,
}

impl TripLog {
    pub fn new(first_leg_id: i64) -> Self {
        Self {
            legs: vec![Leg::new(first_leg_id, DEFAULT_LEG_NAME.to_string())],
            current_leg_index: 0,
        }
    }

    /// Rebuilds a log from restored parts. Returns `None` when there are no
    /// legs; an out-of-range index is clamped to the last leg.
    pub fn from_parts(legs: Vec<Leg>, current_leg_index: usize) -> Option<Self> {
        if legs.is_empty() {
            return None;
        }
        let current_leg_index = current_leg_index.min(legs.len() - 1);
        Some(Self {
            legs,
            current_leg_index,
        })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn current_leg_index(&self) -> usize {
        self.current_leg_index
    }

    pub fn current_leg(&self) -> &Leg {
        &self.legs[self.current_leg_index]
    }

    pub fn push_data_point(&mut self, point: DataPoint) {
        self.legs[self.current_leg_index].data_points.push(point);
    }

    /// Appends an empty leg named after its position and makes it current.
    pub fn push_leg(&mut self, id: i64) -> &Leg {
        let name = Leg::default_name(self.legs.len() + 1);
        self.legs.push(Leg::new(id, name));
        self.current_leg_index = self.legs.len() - 1;
        &self.legs[self.current_leg_index]
    }

    pub fn total_data_points(&self) -> usize {
        self.legs.iter().map(|leg| leg.data_points.len()).sum()
    }

    /// Length of the longest leg; the number of rows in an export.
    pub fn max_leg_len(&self) -> usize {
        self.legs
            .iter()
            .map(|leg| leg.data_points.len())
            .max()
            .unwrap_or(0)
    }

    /// Largest id in use, for seeding the id source after a restore.
    pub fn max_id(&self) -> i64 {
        self.legs
            .iter()
            .flat_map(|leg| std::iter::once(leg.id).chain(leg.data_points.iter().map(|p| p.id)))
            .max()
            .unwrap_or(0)
    }
}
