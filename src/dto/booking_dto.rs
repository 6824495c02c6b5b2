//! DTOs del recurso booking
//!
//! Decodificación tipada en el borde: los payloads malformados se
//! rechazan antes de llegar a la lógica de dominio.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::Booking;
use crate::models::transaction::Transaction;
use crate::repositories::store::BookingListItem;
use crate::services::fare_engine::FareQuote;
use crate::utils::errors::{AppError, AppResult};

/// Request para crear una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255))]
    pub from_location: String,

    #[validate(length(min = 1, max = 255))]
    pub to_location: String,

    #[validate(range(min = 0.0, max = 10000.0))]
    pub distance_km: f64,

    #[validate(range(min = 0, max = 10080))]
    pub duration_min: i32,

    #[validate(range(min = 1, max = 50))]
    pub passenger_count: i32,

    /// one_way | round_trip | rental
    pub trip_type: Option<String>,

    pub scheduled_pickup: DateTime<Utc>,

    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
}

/// Request para cambiar el estado de una reserva
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub new_status: String,
}

/// Parámetros crudos del query string de `GET /booking/`
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// Parámetros de `GET /booking/realtime-fare-calculation`
#[derive(Debug, Deserialize, Validate)]
pub struct FareQuoteParams {
    pub vehicle_id: Uuid,

    #[validate(range(min = 0.0, max = 10000.0))]
    pub distance_km: f64,

    #[validate(range(min = 0.0, max = 10080.0))]
    pub duration_min: f64,

    #[validate(range(min = 0.0, max = 1440.0))]
    pub waiting_min: Option<f64>,

    #[validate(range(min = 0.0, max = 1440.0))]
    pub driver_late_min: Option<f64>,

    /// Hora de recogida en formato `HH:MM` (opcional `HH:MM:SS`)
    pub pickup_time: String,
}

/// Parsea una hora `HH:MM` o `HH:MM:SS`
pub fn parse_pickup_time(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid pickup_time '{}', expected HH:MM",
                raw
            ))
        })
}

/// Response de creación: la reserva persistida más la cotización
#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    pub booking: Booking,
    pub fare: FareQuote,
}

/// Response de `GET /booking/` con datos de paginación
#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub bookings: Vec<BookingListItem>,
}

/// Response de detalle con entidades relacionadas
#[derive(Debug, Serialize)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub vehicle_name: String,
    pub user_name: String,
    pub driver_name: Option<String>,
    pub transactions: Vec<Transaction>,
}
