//! DTOs del recurso vehicle (cab)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::fare_rule::{FareRule, NewFareRule};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

use super::booking_dto::parse_pickup_time;

/// Request para crear un vehículo, con regla tarifaria opcional
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub vehicle_name: String,

    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: String,

    pub fuel_type: Option<String>,

    #[validate(range(min = 1, max = 50))]
    pub seat_capacity: i32,

    #[validate(range(min = 0, max = 50))]
    pub bag_capacity: Option<i32>,

    pub description: Option<String>,

    #[validate]
    pub fare_rule: Option<FareRuleRequest>,
}

/// Request para actualizar campos de perfil del vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub vehicle_name: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub vehicle_type: Option<String>,

    pub fuel_type: Option<String>,

    #[validate(range(min = 1, max = 50))]
    pub seat_capacity: Option<i32>,

    #[validate(range(min = 0, max = 50))]
    pub bag_capacity: Option<i32>,

    pub description: Option<String>,
}

/// Regla tarifaria tal como llega del cliente; los montos en f64 se
/// convierten a Decimal al validar
#[derive(Debug, Deserialize, Validate)]
pub struct FareRuleRequest {
    #[validate(range(min = 0.0))]
    pub base_fare: f64,

    #[validate(range(min = 0.0))]
    pub price_per_km: f64,

    #[validate(range(min = 0.0))]
    pub price_per_min: f64,

    #[validate(range(min = 0.0))]
    pub waiting_charge_per_min: f64,

    #[validate(range(min = 0.0))]
    pub late_compensation_per_min: f64,

    #[validate(range(min = 0.0))]
    pub minimum_fare: f64,

    #[validate(range(min = 0.0, max = 10.0))]
    pub night_multiplier: f64,

    /// `HH:MM`; la ventana puede cruzar la medianoche
    pub night_start: String,
    pub night_end: String,
}

fn to_decimal(value: f64, field: &str) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid value for {}", field)))
}

impl FareRuleRequest {
    pub fn into_values(self) -> AppResult<NewFareRule> {
        Ok(NewFareRule {
            base_fare: to_decimal(self.base_fare, "base_fare")?,
            price_per_km: to_decimal(self.price_per_km, "price_per_km")?,
            price_per_min: to_decimal(self.price_per_min, "price_per_min")?,
            waiting_charge_per_min: to_decimal(
                self.waiting_charge_per_min,
                "waiting_charge_per_min",
            )?,
            late_compensation_per_min: to_decimal(
                self.late_compensation_per_min,
                "late_compensation_per_min",
            )?,
            minimum_fare: to_decimal(self.minimum_fare, "minimum_fare")?,
            night_multiplier: to_decimal(self.night_multiplier, "night_multiplier")?,
            night_start: parse_pickup_time(&self.night_start)?,
            night_end: parse_pickup_time(&self.night_end)?,
        })
    }
}

/// Response de vehículo con su regla tarifaria (si existe)
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub fare_rule: Option<FareRule>,
}
