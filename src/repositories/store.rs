//! Interfaz de persistencia del núcleo de reservas
//!
//! Los controladores hablan con este trait en lugar de con SQL: la
//! implementación Postgres es la de producción y la implementación en
//! memoria sustituye a la base de datos en los tests de integración.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::fare_rule::FareRule;
use crate::models::transaction::Transaction;
use crate::models::vehicle::Vehicle;
use crate::services::booking_query::BookingListQuery;
use crate::services::booking_state::StatusChange;
use crate::utils::errors::AppResult;

/// Datos de una reserva nueva, con la tarifa ya calculada
#[derive(Debug, Clone)]
pub struct NewBooking {
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
    pub payment_method: String,
    pub final_fare: Decimal,
    pub is_night_ride: bool,
    pub fare_breakdown: serde_json::Value,
}

/// Pago nuevo contra una reserva
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub payment_gateway: Option<String>,
}

/// Fila del listado: reserva más nombres de las entidades unidas
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookingListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub vehicle_name: String,
    pub user_name: String,
    pub driver_name: Option<String>,
}

/// Detalle de reserva con entidades relacionadas y sus pagos
#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub booking: Booking,
    pub vehicle_name: String,
    pub user_name: String,
    pub driver_name: Option<String>,
    pub transactions: Vec<Transaction>,
}

/// Operaciones de persistencia que necesita el núcleo de reservas.
///
/// Las operaciones que tocan reserva y disponibilidad del vehículo
/// (`create_booking`, `apply_transition`) son atómicas: o se aplica
/// todo o no se aplica nada.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn vehicle_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn fare_rule_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<FareRule>>;

    async fn booking_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    async fn booking_detail(&self, id: Uuid) -> AppResult<Option<BookingDetail>>;

    /// Adquiere el vehículo y persiste la reserva en una sola unidad;
    /// falla con `ResourceUnavailable` si el vehículo ya está tomado,
    /// sin dejar reserva persistida.
    async fn create_booking(&self, new_booking: NewBooking) -> AppResult<Booking>;

    /// Aplica una transición planificada junto con su efecto de
    /// disponibilidad, atómicamente.
    async fn apply_transition(&self, booking: &Booking, change: &StatusChange)
        -> AppResult<Booking>;

    /// Listado filtrado/ordenado/paginado; devuelve también el total
    /// de filas que satisfacen los filtros.
    async fn list_bookings(
        &self,
        query: &BookingListQuery,
    ) -> AppResult<(Vec<BookingListItem>, i64)>;

    /// Registra un pago y actualiza `payment_status` de la reserva en
    /// la misma transacción.
    async fn record_transaction(&self, new_tx: NewTransaction) -> AppResult<Transaction>;

    async fn transactions_for_booking(&self, booking_id: Uuid) -> AppResult<Vec<Transaction>>;
}
