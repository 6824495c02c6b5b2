//! Repositorio de vehículos (cabs)
//!
//! CRUD de perfil del vehículo y upsert de su regla tarifaria. El
//! flag `is_available` no se toca aquí: solo lo muta el coordinador
//! de disponibilidad dentro de las operaciones de reserva.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::fare_rule::{FareRule, NewFareRule};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crea el vehículo y, si viene, su regla tarifaria en una sola
    /// transacción
    pub async fn create(
        &self,
        vehicle_name: String,
        vehicle_type: String,
        fuel_type: Option<String>,
        seat_capacity: i32,
        bag_capacity: i32,
        description: Option<String>,
        fare_rule: Option<NewFareRule>,
    ) -> AppResult<(Vehicle, Option<FareRule>)> {
        let mut tx = self.pool.begin().await?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, vehicle_name, vehicle_type, fuel_type, seat_capacity,
                                  bag_capacity, description, is_available, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_name)
        .bind(vehicle_type)
        .bind(fuel_type)
        .bind(seat_capacity)
        .bind(bag_capacity)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let rule = match fare_rule {
            Some(values) => Some(Self::upsert_rule_tx(&mut tx, vehicle.id, values).await?),
            None => None,
        };

        tx.commit().await?;

        Ok((vehicle, rule))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    pub async fn fare_rule(&self, vehicle_id: Uuid) -> AppResult<Option<FareRule>> {
        let rule = sqlx::query_as::<_, FareRule>("SELECT * FROM fare_rules WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rule)
    }

    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(vehicles)
    }

    /// Actualización parcial de los campos de perfil
    pub async fn update(
        &self,
        id: Uuid,
        vehicle_name: Option<String>,
        vehicle_type: Option<String>,
        fuel_type: Option<String>,
        seat_capacity: Option<i32>,
        bag_capacity: Option<i32>,
        description: Option<String>,
    ) -> AppResult<Vehicle> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET vehicle_name = $2, vehicle_type = $3, fuel_type = $4,
                seat_capacity = $5, bag_capacity = $6, description = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(vehicle_name.unwrap_or(current.vehicle_name))
        .bind(vehicle_type.unwrap_or(current.vehicle_type))
        .bind(fuel_type.or(current.fuel_type))
        .bind(seat_capacity.unwrap_or(current.seat_capacity))
        .bind(bag_capacity.unwrap_or(current.bag_capacity))
        .bind(description.or(current.description))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn upsert_fare_rule(
        &self,
        vehicle_id: Uuid,
        values: NewFareRule,
    ) -> AppResult<FareRule> {
        let mut tx = self.pool.begin().await?;
        let rule = Self::upsert_rule_tx(&mut tx, vehicle_id, values).await?;
        tx.commit().await?;
        Ok(rule)
    }

    async fn upsert_rule_tx(
        tx: &mut Transaction<'_, Postgres>,
        vehicle_id: Uuid,
        values: NewFareRule,
    ) -> AppResult<FareRule> {
        let rule = sqlx::query_as::<_, FareRule>(
            r#"
            INSERT INTO fare_rules (id, vehicle_id, base_fare, price_per_km, price_per_min,
                                    waiting_charge_per_min, late_compensation_per_min,
                                    minimum_fare, night_multiplier, night_start, night_end,
                                    created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (vehicle_id) DO UPDATE SET
                base_fare = EXCLUDED.base_fare,
                price_per_km = EXCLUDED.price_per_km,
                price_per_min = EXCLUDED.price_per_min,
                waiting_charge_per_min = EXCLUDED.waiting_charge_per_min,
                late_compensation_per_min = EXCLUDED.late_compensation_per_min,
                minimum_fare = EXCLUDED.minimum_fare,
                night_multiplier = EXCLUDED.night_multiplier,
                night_start = EXCLUDED.night_start,
                night_end = EXCLUDED.night_end
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(values.base_fare)
        .bind(values.price_per_km)
        .bind(values.price_per_min)
        .bind(values.waiting_charge_per_min)
        .bind(values.late_compensation_per_min)
        .bind(values.minimum_fare)
        .bind(values.night_multiplier)
        .bind(values.night_start)
        .bind(values.night_end)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(rule)
    }

    /// Borra el vehículo y su regla tarifaria en una transacción;
    /// rechaza el borrado mientras exista una reserva activa
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let (active,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings \
             WHERE vehicle_id = $1 AND booking_status IN ('Booked', 'Confirmed'))",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active {
            return Err(AppError::Conflict(
                "Vehicle has an active booking and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM fare_rules WHERE vehicle_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
