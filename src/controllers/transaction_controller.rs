//! Controlador del recurso transaction
//!
//! Registra intentos de pago contra una reserva y refleja el
//! resultado en su `payment_status`, en la misma transacción.

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::transaction_dto::RecordPaymentRequest;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::transaction::Transaction;
use crate::models::user::UserRole;
use crate::repositories::store::{BookingStore, NewTransaction};
use crate::utils::errors::{AppError, AppResult};

pub struct TransactionController<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> TransactionController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn record(
        &self,
        caller: &AuthenticatedUser,
        booking_id: Uuid,
        request: RecordPaymentRequest,
    ) -> AppResult<ApiResponse<Transaction>> {
        request.validate()?;

        let booking = self
            .store
            .booking_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        // El requester solo paga sus propias reservas; roles elevados
        // registran pagos de cualquiera
        if caller.role == UserRole::User && booking.user_id != caller.user_id {
            return Err(AppError::Forbidden(
                "You can only pay for your own bookings".to_string(),
            ));
        }

        let amount = Decimal::from_f64_retain(request.amount)
            .ok_or_else(|| AppError::BadRequest("Invalid payment amount".to_string()))?;

        let transaction = self
            .store
            .record_transaction(NewTransaction {
                booking_id,
                amount,
                status: request.status,
                payment_gateway: request.payment_gateway,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            transaction,
            "Payment recorded successfully".to_string(),
        ))
    }

    pub async fn get_for_booking(
        &self,
        caller: &AuthenticatedUser,
        booking_id: Uuid,
    ) -> AppResult<Vec<Transaction>> {
        let booking = self
            .store
            .booking_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if caller.role == UserRole::User && booking.user_id != caller.user_id {
            return Err(AppError::Forbidden(
                "You can only view payments of your own bookings".to_string(),
            ));
        }

        self.store.transactions_for_booking(booking_id).await
    }
}
