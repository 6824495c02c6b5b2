//! Rutas del recurso booking

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    BookingCreatedResponse, BookingDetailResponse, BookingListParams, BookingListResponse,
    CreateBookingRequest, FareQuoteParams, UpdateBookingStatusRequest,
};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::Booking;
use crate::repositories::PgBookingStore;
use crate::services::fare_engine::FareQuote;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_booking))
        .route("/", get(list_bookings))
        .route("/realtime-fare-calculation", get(realtime_fare))
        .route("/:id", get(get_booking))
        .route("/:id/status", put(update_booking_status))
}

fn controller(state: &AppState) -> BookingController<PgBookingStore> {
    BookingController::new(PgBookingStore::new(state.pool.clone()))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreatedResponse>>), AppError> {
    let response = controller(&state).create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(params): Query<BookingListParams>,
) -> Result<Json<BookingListResponse>, AppError> {
    let response = controller(&state).list(&caller, params).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, AppError> {
    let response = controller(&state).get_by_id(&caller, id).await?;
    Ok(Json(response))
}

async fn update_booking_status(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let response = controller(&state).update_status(&caller, id, request).await?;
    Ok(Json(response))
}

async fn realtime_fare(
    State(state): State<AppState>,
    Extension(_caller): Extension<AuthenticatedUser>,
    Query(params): Query<FareQuoteParams>,
) -> Result<Json<FareQuote>, AppError> {
    let response = controller(&state).realtime_fare(params).await?;
    Ok(Json(response))
}
