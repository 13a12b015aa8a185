pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{
    AvailableDate, City, DateStatus, ScheduleConfig, ScheduleHours,
    AvailabilityFetchFailurePolicy, SchedulingError,
};
pub use services::slots::{generate_slots, filter_available, slot_minutes};
