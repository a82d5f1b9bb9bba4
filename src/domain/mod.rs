// Domain layer - Trip log model and validation rules
pub mod estimate;
pub mod summary;
pub mod trip;
