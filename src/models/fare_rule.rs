//! Regla tarifaria por vehículo
//!
//! Configuración uno-a-uno con `vehicles` que alimenta el motor de
//! tarifas. Inmutable durante un cálculo; solo admin/master la mutan
//! a través del recurso vehicle.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FareRule {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub base_fare: Decimal,
    pub price_per_km: Decimal,
    pub price_per_min: Decimal,
    pub waiting_charge_per_min: Decimal,
    pub late_compensation_per_min: Decimal,
    pub minimum_fare: Decimal,
    pub night_multiplier: Decimal,
    /// Inicio de la ventana nocturna; puede ser mayor que `night_end`
    /// cuando la ventana cruza la medianoche
    pub night_start: NaiveTime,
    pub night_end: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// Valores de una regla nueva o actualizada, listos para persistir
#[derive(Debug, Clone)]
pub struct NewFareRule {
    pub base_fare: Decimal,
    pub price_per_km: Decimal,
    pub price_per_min: Decimal,
    pub waiting_charge_per_min: Decimal,
    pub late_compensation_per_min: Decimal,
    pub minimum_fare: Decimal,
    pub night_multiplier: Decimal,
    pub night_start: NaiveTime,
    pub night_end: NaiveTime,
}
