pub mod models;
pub mod services;

pub use models::{
    Appointment, AppointmentStatus, BookAppointmentRequest, DayAvailability,
    RescheduleAppointmentRequest, SchedulingError,
};
pub use services::availability::AvailabilityService;
pub use services::booking::AppointmentBookingService;
pub use services::conflict::ConflictService;
pub use services::holidays::HolidayCalendar;
