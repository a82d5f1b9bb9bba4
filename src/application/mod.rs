// Application layer - Use cases and the ports they depend on
pub mod clock;
pub mod key_value_store;
pub mod trip_log_store;
