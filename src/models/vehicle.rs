//! Modelo de Vehicle (cab)
//!
//! Mapea exactamente a la tabla `vehicles`. El flag `is_available`
//! solo se muta como efecto de crear o transicionar reservas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub vehicle_name: String,
    pub vehicle_type: String,
    pub fuel_type: Option<String>,
    pub seat_capacity: i32,
    pub bag_capacity: i32,
    pub description: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}
