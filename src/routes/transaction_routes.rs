//! Rutas del recurso transaction

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::transaction_controller::TransactionController;
use crate::dto::common::ApiResponse;
use crate::dto::transaction_dto::RecordPaymentRequest;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::transaction::Transaction;
use crate::repositories::PgBookingStore;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_transaction_router() -> Router<AppState> {
    Router::new()
        .route("/:booking_id", post(record_payment))
        .route("/:booking_id", get(get_payments))
}

fn controller(state: &AppState) -> TransactionController<PgBookingStore> {
    TransactionController::new(PgBookingStore::new(state.pool.clone()))
}

async fn record_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Transaction>>), AppError> {
    let response = controller(&state).record(&caller, booking_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_payments(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let response = controller(&state).get_for_booking(&caller, booking_id).await?;
    Ok(Json(response))
}
