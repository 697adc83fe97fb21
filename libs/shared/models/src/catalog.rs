use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A billable service definition. Appointments snapshot the price at
/// booking time, so editing a type here never changes existing bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationType {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
}
