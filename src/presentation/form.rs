// Entry form state, owned by the front end rather than the store
use crate::domain::estimate::is_acceptable_input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Maps,
    Ev,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Maps => "Google Maps Distance (miles)",
            Field::Ev => "EV Range Estimate (miles)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub maps: String,
    pub ev: String,
}

impl FormState {
    /// Applies the keystroke filter; a rejected value leaves the field as it was.
    pub fn enter(&mut self, field: Field, value: &str) -> bool {
        if !is_acceptable_input(value) {
            return false;
        }
        let slot = match field {
            Field::Maps => &mut self.maps,
            Field::Ev => &mut self.ev,
        };
        *slot = value.to_string();
        true
    }

    pub fn clear(&mut self) {
        self.maps.clear();
        self.ev.clear();
    }
}
