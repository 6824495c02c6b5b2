//! Registro de pagos asociados a una reserva
//!
//! El backend solo registra intentos de pago y refleja el resultado
//! en `bookings.payment_status`; la semántica completa del gateway
//! queda fuera de alcance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::booking::PaymentStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub payment_gateway: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PaymentStatus {
    /// Mapea el estado reportado por el gateway al estado de pago de
    /// la reserva
    pub fn from_gateway_status(status: &str) -> Self {
        match status {
            "success" => PaymentStatus::Paid,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }
}
