//! Implementación Postgres del store de reservas
//!
//! Las escrituras multi-paso (crear reserva + tomar vehículo,
//! transición + ajuste de disponibilidad, pago + estado de pago)
//! comparten una transacción: commit total o rollback total.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus, PaymentStatus};
use crate::models::fare_rule::FareRule;
use crate::models::transaction::Transaction;
use crate::models::vehicle::Vehicle;
use crate::services::booking_query::{BookingListQuery, RoleScope};
use crate::services::booking_state::StatusChange;
use crate::utils::errors::{AppError, AppResult};

use super::availability;
use super::store::{BookingDetail, BookingListItem, BookingStore, NewBooking, NewTransaction};

const LIST_SELECT: &str = "SELECT b.*, v.vehicle_name, u.full_name AS user_name, \
     d.driver_name \
     FROM bookings b \
     JOIN vehicles v ON v.id = b.vehicle_id \
     JOIN users u ON u.id = b.user_id \
     LEFT JOIN drivers d ON d.id = b.driver_id \
     WHERE 1=1";

const LIST_COUNT: &str = "SELECT COUNT(*) \
     FROM bookings b \
     JOIN vehicles v ON v.id = b.vehicle_id \
     JOIN users u ON u.id = b.user_id \
     LEFT JOIN drivers d ON d.id = b.driver_id \
     WHERE 1=1";

#[derive(Debug, FromRow)]
struct BookingDetailRow {
    #[sqlx(flatten)]
    booking: Booking,
    vehicle_name: String,
    user_name: String,
    driver_name: Option<String>,
}

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtros compartidos entre el SELECT de filas y el COUNT
    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a BookingListQuery) {
        match query.scope {
            RoleScope::All => {}
            RoleScope::Requester(user_id) => {
                qb.push(" AND b.user_id = ").push_bind(user_id);
            }
            RoleScope::AssignedDriver(driver_id) => {
                qb.push(" AND b.driver_id = ").push_bind(driver_id);
            }
        }

        if let Some(status) = query.status {
            qb.push(" AND b.booking_status = ").push_bind(status);
        }
        if let Some(vehicle_id) = query.vehicle_id {
            qb.push(" AND b.vehicle_id = ").push_bind(vehicle_id);
        }
        if let Some(driver_id) = query.driver_id {
            qb.push(" AND b.driver_id = ").push_bind(driver_id);
        }
        if let Some(user_id) = query.user_id {
            qb.push(" AND b.user_id = ").push_bind(user_id);
        }

        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            qb.push(" AND (b.from_location ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR b.to_location ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR v.vehicle_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR d.driver_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn vehicle_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    async fn fare_rule_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<FareRule>> {
        let rule = sqlx::query_as::<_, FareRule>("SELECT * FROM fare_rules WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rule)
    }

    async fn booking_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    async fn booking_detail(&self, id: Uuid) -> AppResult<Option<BookingDetail>> {
        let row = sqlx::query_as::<_, BookingDetailRow>(
            "SELECT b.*, v.vehicle_name, u.full_name AS user_name, d.driver_name \
             FROM bookings b \
             JOIN vehicles v ON v.id = b.vehicle_id \
             JOIN users u ON u.id = b.user_id \
             LEFT JOIN drivers d ON d.id = b.driver_id \
             WHERE b.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let transactions = self.transactions_for_booking(id).await?;

        Ok(Some(BookingDetail {
            booking: row.booking,
            vehicle_name: row.vehicle_name,
            user_name: row.user_name,
            driver_name: row.driver_name,
            transactions,
        }))
    }

    async fn create_booking(&self, new_booking: NewBooking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        // Tomar el vehículo primero: si ya está ocupado, el update
        // condicional no afecta filas y nada se persiste
        availability::acquire(&mut tx, new_booking.vehicle_id).await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, user_id, vehicle_id, driver_id, from_location, to_location,
                distance_km, duration_min, passenger_count, trip_type,
                scheduled_pickup, final_fare, is_night_ride, fare_breakdown,
                booking_status, payment_method, payment_status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_booking.user_id)
        .bind(new_booking.vehicle_id)
        .bind(new_booking.driver_id)
        .bind(&new_booking.from_location)
        .bind(&new_booking.to_location)
        .bind(new_booking.distance_km)
        .bind(new_booking.duration_min)
        .bind(new_booking.passenger_count)
        .bind(&new_booking.trip_type)
        .bind(new_booking.scheduled_pickup)
        .bind(new_booking.final_fare)
        .bind(new_booking.is_night_ride)
        .bind(&new_booking.fare_breakdown)
        .bind(BookingStatus::Booked)
        .bind(&new_booking.payment_method)
        .bind(PaymentStatus::Pending)
        .bind(chrono::Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(booking)
    }

    async fn apply_transition(
        &self,
        booking: &Booking,
        change: &StatusChange,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        // Update condicional sobre el estado leído: si otra
        // transición ganó la carrera, no afecta filas y nada se aplica
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings \
             SET booking_status = $2, cancelled_at = $3, completed_at = $4 \
             WHERE id = $1 AND booking_status = $5 \
             RETURNING *",
        )
        .bind(booking.id)
        .bind(change.new_status)
        .bind(change.cancelled_at.or(booking.cancelled_at))
        .bind(change.completed_at.or(booking.completed_at))
        .bind(booking.booking_status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Booking status changed by a concurrent request".to_string())
        })?;

        availability::apply(&mut tx, booking.vehicle_id, change.availability).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn list_bookings(
        &self,
        query: &BookingListQuery,
    ) -> AppResult<(Vec<BookingListItem>, i64)> {
        let mut count_qb = QueryBuilder::new(LIST_COUNT);
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new(LIST_SELECT);
        Self::push_filters(&mut qb, query);
        qb.push(format!(
            " ORDER BY b.{} {}",
            query.sort_by.as_column(),
            query.sort_order.as_sql()
        ));
        qb.push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let items = qb
            .build_query_as::<BookingListItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn record_transaction(&self, new_tx: NewTransaction) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (id, booking_id, amount, status, payment_gateway, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_tx.booking_id)
        .bind(new_tx.amount)
        .bind(&new_tx.status)
        .bind(&new_tx.payment_gateway)
        .bind(chrono::Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE bookings SET payment_status = $2 WHERE id = $1")
            .bind(new_tx.booking_id)
            .bind(PaymentStatus::from_gateway_status(&new_tx.status))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(transaction)
    }

    async fn transactions_for_booking(&self, booking_id: Uuid) -> AppResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE booking_id = $1 ORDER BY created_at DESC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }
}
