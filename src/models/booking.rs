//! Modelo de Booking
//!
//! Una reserva nunca se borra físicamente: la cancelación es un
//! estado terminal, no una eliminación. El estado solo se muta a
//! través de la máquina de estados (`services::booking_state`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Estado del ciclo de vida de una reserva
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status")]
pub enum BookingStatus {
    Booked,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Parsea el valor recibido en `new_status`; `None` si no es un
    /// estado conocido
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Booked" => Some(BookingStatus::Booked),
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            "Completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Desde un estado terminal no hay más transiciones
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado de pago, mantenido por el colaborador de transacciones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub from_location: String,
    pub to_location: String,
    pub distance_km: Decimal,
    pub duration_min: i32,
    pub passenger_count: i32,
    pub trip_type: String,
    pub scheduled_pickup: DateTime<Utc>,
    pub final_fare: Decimal,
    pub is_night_ride: bool,
    /// Desglose del cálculo tarifario tal como lo produjo el motor
    pub fare_breakdown: serde_json::Value,
    pub booking_status: BookingStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
