//! Store de reservas en memoria
//!
//! Sustituto de PostgreSQL para los tests de integración. Reproduce
//! las mismas invariantes que la implementación Postgres: adquisición
//! condicional del vehículo y escrituras todo-o-nada bajo un único
//! mutex.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus, PaymentStatus};
use crate::models::fare_rule::FareRule;
use crate::models::transaction::Transaction;
use crate::models::vehicle::Vehicle;
use crate::services::booking_query::{BookingListQuery, RoleScope, SortField, SortOrder};
use crate::services::booking_state::{AvailabilityAction, StatusChange};
use crate::utils::errors::{AppError, AppResult};

use super::store::{BookingDetail, BookingListItem, BookingStore, NewBooking, NewTransaction};

#[derive(Default)]
struct MemoryState {
    vehicles: HashMap<Uuid, Vehicle>,
    fare_rules: HashMap<Uuid, FareRule>,
    bookings: HashMap<Uuid, Booking>,
    transactions: Vec<Transaction>,
    user_names: HashMap<Uuid, String>,
    driver_names: HashMap<Uuid, String>,
}

#[derive(Default)]
pub struct MemoryBookingStore {
    state: Mutex<MemoryState>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_vehicle(&self, vehicle: Vehicle) {
        self.state.lock().await.vehicles.insert(vehicle.id, vehicle);
    }

    pub async fn add_fare_rule(&self, rule: FareRule) {
        self.state.lock().await.fare_rules.insert(rule.vehicle_id, rule);
    }

    pub async fn add_user(&self, id: Uuid, full_name: &str) {
        self.state
            .lock()
            .await
            .user_names
            .insert(id, full_name.to_string());
    }

    pub async fn add_driver(&self, id: Uuid, driver_name: &str) {
        self.state
            .lock()
            .await
            .driver_names
            .insert(id, driver_name.to_string());
    }

    pub async fn booking_count(&self) -> usize {
        self.state.lock().await.bookings.len()
    }

    fn to_list_item(state: &MemoryState, booking: &Booking) -> BookingListItem {
        let vehicle_name = state
            .vehicles
            .get(&booking.vehicle_id)
            .map(|v| v.vehicle_name.clone())
            .unwrap_or_default();
        let user_name = state
            .user_names
            .get(&booking.user_id)
            .cloned()
            .unwrap_or_default();
        let driver_name = booking
            .driver_id
            .and_then(|id| state.driver_names.get(&id).cloned());
        BookingListItem {
            booking: booking.clone(),
            vehicle_name,
            user_name,
            driver_name,
        }
    }

    fn matches(state: &MemoryState, booking: &Booking, query: &BookingListQuery) -> bool {
        match query.scope {
            RoleScope::All => {}
            RoleScope::Requester(user_id) => {
                if booking.user_id != user_id {
                    return false;
                }
            }
            RoleScope::AssignedDriver(driver_id) => {
                if booking.driver_id != Some(driver_id) {
                    return false;
                }
            }
        }

        if let Some(status) = query.status {
            if booking.booking_status != status {
                return false;
            }
        }
        if let Some(vehicle_id) = query.vehicle_id {
            if booking.vehicle_id != vehicle_id {
                return false;
            }
        }
        if let Some(driver_id) = query.driver_id {
            if booking.driver_id != Some(driver_id) {
                return false;
            }
        }
        if let Some(user_id) = query.user_id {
            if booking.user_id != user_id {
                return false;
            }
        }

        if let Some(search) = &query.search {
            let needle = search.to_lowercase();
            let item = Self::to_list_item(state, booking);
            let haystacks = [
                booking.from_location.to_lowercase(),
                booking.to_location.to_lowercase(),
                item.vehicle_name.to_lowercase(),
                item.user_name.to_lowercase(),
                item.driver_name.unwrap_or_default().to_lowercase(),
            ];
            if !haystacks.iter().any(|h| h.contains(&needle)) {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn vehicle_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.state.lock().await.vehicles.get(&id).cloned())
    }

    async fn fare_rule_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<FareRule>> {
        Ok(self.state.lock().await.fare_rules.get(&vehicle_id).cloned())
    }

    async fn booking_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.state.lock().await.bookings.get(&id).cloned())
    }

    async fn booking_detail(&self, id: Uuid) -> AppResult<Option<BookingDetail>> {
        let state = self.state.lock().await;
        let booking = match state.bookings.get(&id) {
            Some(b) => b.clone(),
            None => return Ok(None),
        };
        let item = Self::to_list_item(&state, &booking);
        let transactions = state
            .transactions
            .iter()
            .filter(|t| t.booking_id == id)
            .cloned()
            .collect();
        Ok(Some(BookingDetail {
            booking,
            vehicle_name: item.vehicle_name,
            user_name: item.user_name,
            driver_name: item.driver_name,
            transactions,
        }))
    }

    async fn create_booking(&self, new_booking: NewBooking) -> AppResult<Booking> {
        let mut state = self.state.lock().await;

        let vehicle = state
            .vehicles
            .get_mut(&new_booking.vehicle_id)
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        if !vehicle.is_available {
            return Err(AppError::ResourceUnavailable(
                "Vehicle is not available for booking".to_string(),
            ));
        }
        vehicle.is_available = false;

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: new_booking.user_id,
            vehicle_id: new_booking.vehicle_id,
            driver_id: new_booking.driver_id,
            from_location: new_booking.from_location,
            to_location: new_booking.to_location,
            distance_km: new_booking.distance_km,
            duration_min: new_booking.duration_min,
            passenger_count: new_booking.passenger_count,
            trip_type: new_booking.trip_type,
            scheduled_pickup: new_booking.scheduled_pickup,
            final_fare: new_booking.final_fare,
            is_night_ride: new_booking.is_night_ride,
            fare_breakdown: new_booking.fare_breakdown,
            booking_status: BookingStatus::Booked,
            payment_method: new_booking.payment_method,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
            cancelled_at: None,
            completed_at: None,
        };

        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn apply_transition(
        &self,
        booking: &Booking,
        change: &StatusChange,
    ) -> AppResult<Booking> {
        let mut state = self.state.lock().await;

        let stored = state
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        // El plan se hizo sobre una lectura previa; si el estado ya
        // cambió, la transición es obsoleta y no se aplica
        if stored.booking_status != booking.booking_status {
            return Err(AppError::Conflict(
                "Booking status changed by a concurrent request".to_string(),
            ));
        }

        stored.booking_status = change.new_status;
        stored.cancelled_at = change.cancelled_at.or(stored.cancelled_at);
        stored.completed_at = change.completed_at.or(stored.completed_at);
        let updated = stored.clone();

        if let Some(vehicle) = state.vehicles.get_mut(&booking.vehicle_id) {
            match change.availability {
                AvailabilityAction::Hold => vehicle.is_available = false,
                AvailabilityAction::Release => vehicle.is_available = true,
                AvailabilityAction::Keep => {}
            }
        }

        Ok(updated)
    }

    async fn list_bookings(
        &self,
        query: &BookingListQuery,
    ) -> AppResult<(Vec<BookingListItem>, i64)> {
        let state = self.state.lock().await;

        let mut matching: Vec<&Booking> = state
            .bookings
            .values()
            .filter(|b| Self::matches(&state, b, query))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort_by {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::ScheduledPickup => a.scheduled_pickup.cmp(&b.scheduled_pickup),
                SortField::FinalFare => a.final_fare.cmp(&b.final_fare),
                SortField::BookingStatus => {
                    a.booking_status.as_str().cmp(b.booking_status.as_str())
                }
            };
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .map(|b| Self::to_list_item(&state, b))
            .collect();

        Ok((items, total))
    }

    async fn record_transaction(&self, new_tx: NewTransaction) -> AppResult<Transaction> {
        let mut state = self.state.lock().await;

        let booking = state
            .bookings
            .get_mut(&new_tx.booking_id)
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
        booking.payment_status = PaymentStatus::from_gateway_status(&new_tx.status);

        let transaction = Transaction {
            id: Uuid::new_v4(),
            booking_id: new_tx.booking_id,
            amount: new_tx.amount,
            status: new_tx.status,
            payment_gateway: new_tx.payment_gateway,
            created_at: Utc::now(),
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn transactions_for_booking(&self, booking_id: Uuid) -> AppResult<Vec<Transaction>> {
        Ok(self
            .state
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| t.booking_id == booking_id)
            .cloned()
            .collect())
    }
}
