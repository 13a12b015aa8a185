pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{Appointment, AppointmentError, AppointmentStatus};
pub use services::booking::AppointmentBookingService;
pub use services::notification::{normalize_phone, WebhookNotificationService};
