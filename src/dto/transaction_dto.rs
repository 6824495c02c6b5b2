//! DTOs del recurso transaction

use serde::Deserialize;
use validator::Validate;

/// Request para registrar un pago contra una reserva
#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    #[validate(range(min = 0.0))]
    pub amount: f64,

    /// success | failed | refunded | pending
    #[validate(length(min = 1, max = 30))]
    pub status: String,

    pub payment_gateway: Option<String>,
}
