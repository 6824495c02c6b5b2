//! Controlador del recurso booking
//!
//! Orquesta el núcleo: cotiza con el motor de tarifas, persiste a
//! través del `BookingStore` y aplica transiciones validadas por la
//! máquina de estados. Genérico sobre el store para poder sustituir
//! PostgreSQL por el store en memoria en los tests.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    BookingCreatedResponse, BookingDetailResponse, BookingListParams, BookingListResponse,
    CreateBookingRequest, FareQuoteParams, UpdateBookingStatusRequest, parse_pickup_time,
};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::user::UserRole;
use crate::repositories::store::{BookingStore, NewBooking};
use crate::services::booking_query::BookingListQuery;
use crate::services::booking_state::plan_transition;
use crate::services::fare_engine::{self, FareQuote, TripParams};
use crate::utils::errors::{AppError, AppResult};

fn to_decimal(value: f64, field: &str) -> AppResult<Decimal> {
    Decimal::from_f64_retain(value)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid value for {}", field)))
}

pub struct BookingController<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> BookingController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Crea una reserva: cotiza la tarifa y persiste reserva +
    /// adquisición del vehículo como una sola unidad atómica.
    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> AppResult<ApiResponse<BookingCreatedResponse>> {
        request.validate()?;

        let vehicle = self
            .store
            .vehicle_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        if request.passenger_count > vehicle.seat_capacity {
            return Err(AppError::BadRequest(format!(
                "Vehicle seats {} passengers, {} requested",
                vehicle.seat_capacity, request.passenger_count
            )));
        }

        let rule = self
            .store
            .fare_rule_for_vehicle(vehicle.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No fare rule configured for this vehicle".to_string())
            })?;

        let trip = TripParams {
            distance_km: to_decimal(request.distance_km, "distance_km")?,
            duration_min: Decimal::from(request.duration_min),
            waiting_min: Decimal::ZERO,
            driver_late_min: Decimal::ZERO,
            pickup_time: request.scheduled_pickup.time(),
        };
        let quote = fare_engine::compute_fare(&rule, &trip);

        let breakdown = serde_json::to_value(&quote.breakdown)
            .map_err(|e| AppError::Internal(format!("Failed to serialize fare breakdown: {}", e)))?;

        let booking = self
            .store
            .create_booking(NewBooking {
                user_id: caller.user_id,
                vehicle_id: vehicle.id,
                driver_id: request.driver_id,
                from_location: request.from_location,
                to_location: request.to_location,
                distance_km: trip.distance_km,
                duration_min: request.duration_min,
                passenger_count: request.passenger_count,
                trip_type: request.trip_type.unwrap_or_else(|| "one_way".to_string()),
                scheduled_pickup: request.scheduled_pickup,
                payment_method: request.payment_method,
                final_fare: quote.final_fare,
                is_night_ride: quote.is_night_ride,
                fare_breakdown: breakdown,
            })
            .await?;

        Ok(ApiResponse::success_with_message(
            BookingCreatedResponse {
                booking,
                fare: quote,
            },
            "Booking created successfully".to_string(),
        ))
    }

    /// Detalle de una reserva, con verificación de propiedad según rol
    pub async fn get_by_id(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<BookingDetailResponse> {
        let detail = self
            .store
            .booking_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        match caller.role {
            UserRole::User if detail.booking.user_id != caller.user_id => {
                return Err(AppError::Forbidden(
                    "You can only view your own bookings".to_string(),
                ));
            }
            UserRole::Driver if detail.booking.driver_id != Some(caller.user_id) => {
                return Err(AppError::Forbidden(
                    "This booking is not assigned to you".to_string(),
                ));
            }
            _ => {}
        }

        Ok(BookingDetailResponse {
            booking: detail.booking,
            vehicle_name: detail.vehicle_name,
            user_name: detail.user_name,
            driver_name: detail.driver_name,
            transactions: detail.transactions,
        })
    }

    /// Listado filtrado, ordenado y paginado con alcance por rol
    pub async fn list(
        &self,
        caller: &AuthenticatedUser,
        params: BookingListParams,
    ) -> AppResult<BookingListResponse> {
        let query = BookingListQuery::from_params(&params, caller)?;
        let (bookings, total) = self.store.list_bookings(&query).await?;

        Ok(BookingListResponse {
            total,
            page: query.page,
            limit: query.limit,
            bookings,
        })
    }

    /// Aplica una transición de estado validada por la máquina de
    /// estados; el store persiste estado + disponibilidad atómicamente
    pub async fn update_status(
        &self,
        caller: &AuthenticatedUser,
        id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> AppResult<ApiResponse<Booking>> {
        let target = BookingStatus::parse(&request.new_status).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unknown booking status '{}'",
                request.new_status
            ))
        })?;

        let booking = self
            .store
            .booking_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let change = plan_transition(&booking, target, caller, Utc::now())?;
        let updated = self.store.apply_transition(&booking, &change).await?;

        Ok(ApiResponse::success_with_message(
            updated,
            format!("Booking moved to {}", target),
        ))
    }

    /// Cotización en tiempo real, sin persistir nada
    pub async fn realtime_fare(&self, params: FareQuoteParams) -> AppResult<FareQuote> {
        params.validate()?;

        self.store
            .vehicle_by_id(params.vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let rule = self
            .store
            .fare_rule_for_vehicle(params.vehicle_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No fare rule configured for this vehicle".to_string())
            })?;

        let trip = TripParams {
            distance_km: to_decimal(params.distance_km, "distance_km")?,
            duration_min: to_decimal(params.duration_min, "duration_min")?,
            waiting_min: to_decimal(params.waiting_min.unwrap_or(0.0), "waiting_min")?,
            driver_late_min: to_decimal(
                params.driver_late_min.unwrap_or(0.0),
                "driver_late_min",
            )?,
            pickup_time: parse_pickup_time(&params.pickup_time)?,
        };

        Ok(fare_engine::compute_fare(&rule, &trip))
    }
}
