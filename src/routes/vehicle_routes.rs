//! Rutas del recurso vehicle

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, FareRuleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::fare_rule::FareRule;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id", delete(delete_vehicle))
        .route("/:id/fare-rule", put(upsert_fare_rule))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleResponse>>), AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.update(&caller, id, request).await?;
    Ok(Json(response))
}

async fn upsert_fare_rule(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<FareRuleRequest>,
) -> Result<Json<ApiResponse<FareRule>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    let response = controller.upsert_fare_rule(&caller, id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    controller.delete(&caller, id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehicle deleted successfully"
    })))
}
