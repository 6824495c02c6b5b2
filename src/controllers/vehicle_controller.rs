//! Controlador del recurso vehicle
//!
//! Onboarding de cabs y gestión de su regla tarifaria. Las escrituras
//! requieren rol admin/master; la disponibilidad no se edita aquí.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common::ApiResponse;
use crate::dto::vehicle_dto::{CreateVehicleRequest, FareRuleRequest, UpdateVehicleRequest, VehicleResponse};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::fare_rule::FareRule;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    fn require_admin(caller: &AuthenticatedUser) -> AppResult<()> {
        if !caller.role.is_elevated() {
            return Err(AppError::Forbidden(
                "Only admin or master can manage vehicles".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        Self::require_admin(caller)?;
        request.validate()?;

        let fare_rule = match request.fare_rule {
            Some(rule) => Some(rule.into_values()?),
            None => None,
        };

        let (vehicle, rule) = self
            .repository
            .create(
                request.vehicle_name,
                request.vehicle_type,
                request.fuel_type,
                request.seat_capacity,
                request.bag_capacity.unwrap_or(0),
                request.description,
                fare_rule,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse {
                vehicle,
                fare_rule: rule,
            },
            "Vehicle created successfully".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let fare_rule = self.repository.fare_rule(id).await?;

        Ok(VehicleResponse { vehicle, fare_rule })
    }

    pub async fn list(&self) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.list().await?;

        let mut responses = Vec::with_capacity(vehicles.len());
        for vehicle in vehicles {
            let fare_rule = self.repository.fare_rule(vehicle.id).await?;
            responses.push(VehicleResponse { vehicle, fare_rule });
        }

        Ok(responses)
    }

    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        Self::require_admin(caller)?;
        request.validate()?;

        let vehicle = self
            .repository
            .update(
                id,
                request.vehicle_name,
                request.vehicle_type,
                request.fuel_type,
                request.seat_capacity,
                request.bag_capacity,
                request.description,
            )
            .await?;

        let fare_rule = self.repository.fare_rule(id).await?;

        Ok(ApiResponse::success_with_message(
            VehicleResponse { vehicle, fare_rule },
            "Vehicle updated successfully".to_string(),
        ))
    }

    pub async fn upsert_fare_rule(
        &self,
        caller: &AuthenticatedUser,
        vehicle_id: Uuid,
        request: FareRuleRequest,
    ) -> AppResult<ApiResponse<FareRule>> {
        Self::require_admin(caller)?;
        request.validate()?;

        self.repository
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let rule = self
            .repository
            .upsert_fare_rule(vehicle_id, request.into_values()?)
            .await?;

        Ok(ApiResponse::success_with_message(
            rule,
            "Fare rule saved successfully".to_string(),
        ))
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: Uuid) -> AppResult<()> {
        Self::require_admin(caller)?;
        self.repository.delete(id).await
    }
}
