//! Tests de integración del ciclo de vida de reservas sobre el store
//! en memoria: creación con cotización, adquisición de vehículo,
//! transiciones de estado por rol y registro de pagos.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use cab_booking::controllers::booking_controller::BookingController;
use cab_booking::controllers::transaction_controller::TransactionController;
use cab_booking::dto::booking_dto::{CreateBookingRequest, UpdateBookingStatusRequest};
use cab_booking::dto::transaction_dto::RecordPaymentRequest;
use cab_booking::middleware::auth::AuthenticatedUser;
use cab_booking::models::booking::{Booking, BookingStatus, PaymentStatus};
use cab_booking::models::fare_rule::FareRule;
use cab_booking::models::user::UserRole;
use cab_booking::models::vehicle::Vehicle;
use cab_booking::repositories::{BookingStore, MemoryBookingStore};
use cab_booking::services::booking_state::plan_transition;
use cab_booking::utils::errors::AppError;

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

fn caller(role: UserRole) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        role,
    }
}

fn vehicle(seats: i32, available: bool) -> Vehicle {
    Vehicle {
        id: Uuid::new_v4(),
        vehicle_name: "Toyota Etios".to_string(),
        vehicle_type: "sedan".to_string(),
        fuel_type: Some("petrol".to_string()),
        seat_capacity: seats,
        bag_capacity: 2,
        description: None,
        is_available: available,
        created_at: Utc::now(),
    }
}

/// base 50, 10/km, 1/min, piso 100, nocturno ×1.25 entre 21:00 y 05:00
fn fare_rule(vehicle_id: Uuid) -> FareRule {
    FareRule {
        id: Uuid::new_v4(),
        vehicle_id,
        base_fare: dec(50),
        price_per_km: dec(10),
        price_per_min: dec(1),
        waiting_charge_per_min: dec(2),
        late_compensation_per_min: dec(1),
        minimum_fare: dec(100),
        night_multiplier: Decimal::new(125, 2),
        night_start: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
        night_end: NaiveTime::from_hms_opt(5, 0, 0).unwrap(),
        created_at: Utc::now(),
    }
}

fn booking_request(vehicle_id: Uuid, pickup: DateTime<Utc>) -> CreateBookingRequest {
    CreateBookingRequest {
        vehicle_id,
        driver_id: None,
        from_location: "Airport T2".to_string(),
        to_location: "Downtown".to_string(),
        distance_km: 10.0,
        duration_min: 20,
        passenger_count: 2,
        trip_type: None,
        scheduled_pickup: pickup,
        payment_method: "cash".to_string(),
    }
}

fn day_pickup() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn night_pickup() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 22, 0, 0).unwrap()
}

async fn seeded_controller() -> (BookingController<MemoryBookingStore>, Uuid) {
    let store = MemoryBookingStore::new();
    let v = vehicle(4, true);
    let vehicle_id = v.id;
    store.add_fare_rule(fare_rule(vehicle_id)).await;
    store.add_vehicle(v).await;
    (BookingController::new(store), vehicle_id)
}

async fn create_booking(
    controller: &BookingController<MemoryBookingStore>,
    requester: &AuthenticatedUser,
    vehicle_id: Uuid,
    pickup: DateTime<Utc>,
) -> Booking {
    controller
        .create(requester, booking_request(vehicle_id, pickup))
        .await
        .unwrap()
        .data
        .unwrap()
        .booking
}

#[tokio::test]
async fn create_computes_night_fare_and_holds_vehicle() {
    let (controller, vehicle_id) = seeded_controller().await;
    let requester = caller(UserRole::User);

    let response = controller
        .create(&requester, booking_request(vehicle_id, night_pickup()))
        .await
        .unwrap();

    // 50 + 10·10 + 20·1 = 170; nocturno → 170 × 1.25 = 212.50
    let created = response.data.unwrap();
    assert_eq!(created.fare.final_fare, Decimal::new(2125, 1));
    assert!(created.fare.is_night_ride);
    assert_eq!(created.booking.booking_status, BookingStatus::Booked);
    assert_eq!(created.booking.payment_status, PaymentStatus::Pending);
    assert_eq!(created.booking.user_id, requester.user_id);

    let held = controller
        .store()
        .vehicle_by_id(vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!held.is_available);
}

#[tokio::test]
async fn create_day_ride_skips_night_multiplier() {
    let (controller, vehicle_id) = seeded_controller().await;

    let created = controller
        .create(&caller(UserRole::User), booking_request(vehicle_id, day_pickup()))
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(created.fare.final_fare, dec(170));
    assert!(!created.fare.is_night_ride);
    assert_eq!(created.fare.breakdown.night_multiplier, Decimal::ONE);
}

#[tokio::test]
async fn create_fails_on_held_vehicle_and_persists_nothing() {
    let store = MemoryBookingStore::new();
    let v = vehicle(4, false);
    let vehicle_id = v.id;
    store.add_fare_rule(fare_rule(vehicle_id)).await;
    store.add_vehicle(v).await;
    let controller = BookingController::new(store);

    let err = controller
        .create(&caller(UserRole::User), booking_request(vehicle_id, day_pickup()))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ResourceUnavailable(_)));
    assert_eq!(controller.store().booking_count().await, 0);
}

#[tokio::test]
async fn create_rejects_more_passengers_than_seats() {
    let (controller, vehicle_id) = seeded_controller().await;

    let mut request = booking_request(vehicle_id, day_pickup());
    request.passenger_count = 5;

    let err = controller
        .create(&caller(UserRole::User), request)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn create_fails_without_fare_rule() {
    let store = MemoryBookingStore::new();
    let v = vehicle(4, true);
    let vehicle_id = v.id;
    store.add_vehicle(v).await;
    let controller = BookingController::new(store);

    let err = controller
        .create(&caller(UserRole::User), booking_request(vehicle_id, day_pickup()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn requester_cancels_own_booking_and_releases_vehicle() {
    let (controller, vehicle_id) = seeded_controller().await;
    let requester = caller(UserRole::User);
    let booking = create_booking(&controller, &requester, vehicle_id, day_pickup()).await;

    let updated = controller
        .update_status(
            &requester,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Cancelled".to_string(),
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();

    assert_eq!(updated.booking_status, BookingStatus::Cancelled);
    assert!(updated.cancelled_at.is_some());

    let released = controller
        .store()
        .vehicle_by_id(vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert!(released.is_available);
}

#[tokio::test]
async fn requester_cannot_confirm_nor_touch_others_bookings() {
    let (controller, vehicle_id) = seeded_controller().await;
    let requester = caller(UserRole::User);
    let booking = create_booking(&controller, &requester, vehicle_id, day_pickup()).await;

    let err = controller
        .update_status(
            &requester,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Confirmed".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let stranger = caller(UserRole::User);
    let err = controller
        .update_status(
            &stranger,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Cancelled".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn admin_confirms_then_completes_releasing_the_vehicle() {
    let (controller, vehicle_id) = seeded_controller().await;
    let admin = caller(UserRole::Admin);
    let booking =
        create_booking(&controller, &caller(UserRole::User), vehicle_id, day_pickup()).await;

    let confirmed = controller
        .update_status(
            &admin,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Confirmed".to_string(),
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);

    // Confirmar mantiene el vehículo ocupado
    let held = controller
        .store()
        .vehicle_by_id(vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!held.is_available);

    let completed = controller
        .update_status(
            &admin,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Completed".to_string(),
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(completed.booking_status, BookingStatus::Completed);
    assert!(completed.completed_at.is_some());

    let released = controller
        .store()
        .vehicle_by_id(vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert!(released.is_available);
}

#[tokio::test]
async fn booked_cannot_jump_straight_to_completed() {
    let (controller, vehicle_id) = seeded_controller().await;
    let booking =
        create_booking(&controller, &caller(UserRole::User), vehicle_id, day_pickup()).await;

    let err = controller
        .update_status(
            &caller(UserRole::Admin),
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Completed".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn terminal_booking_rejects_any_transition() {
    let (controller, vehicle_id) = seeded_controller().await;
    let requester = caller(UserRole::User);
    let booking = create_booking(&controller, &requester, vehicle_id, day_pickup()).await;

    controller
        .update_status(
            &requester,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Cancelled".to_string(),
            },
        )
        .await
        .unwrap();

    let err = controller
        .update_status(
            &caller(UserRole::Master),
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Confirmed".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn stale_transition_loses_the_race_and_changes_nothing() {
    let (controller, vehicle_id) = seeded_controller().await;
    let requester = caller(UserRole::User);
    let admin = caller(UserRole::Admin);
    let booking = create_booking(&controller, &requester, vehicle_id, day_pickup()).await;

    // Dos requests concurrentes leen el mismo snapshot en Booked
    let cancel = plan_transition(&booking, BookingStatus::Cancelled, &requester, Utc::now())
        .unwrap();
    let confirm = plan_transition(&booking, BookingStatus::Confirmed, &admin, Utc::now())
        .unwrap();

    controller
        .store()
        .apply_transition(&booking, &cancel)
        .await
        .unwrap();

    // La confirmación planificada sobre el snapshot viejo debe perder
    let err = controller
        .store()
        .apply_transition(&booking, &confirm)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = controller
        .store()
        .booking_by_id(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.booking_status, BookingStatus::Cancelled);

    let released = controller
        .store()
        .vehicle_by_id(vehicle_id)
        .await
        .unwrap()
        .unwrap();
    assert!(released.is_available);
}

#[tokio::test]
async fn unknown_status_is_a_bad_request() {
    let (controller, vehicle_id) = seeded_controller().await;
    let booking =
        create_booking(&controller, &caller(UserRole::User), vehicle_id, day_pickup()).await;

    let err = controller
        .update_status(
            &caller(UserRole::Admin),
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "OnTheWay".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn assigned_driver_confirms_but_stranger_driver_cannot() {
    let store = MemoryBookingStore::new();
    let v = vehicle(4, true);
    let vehicle_id = v.id;
    store.add_fare_rule(fare_rule(vehicle_id)).await;
    store.add_vehicle(v).await;
    let controller = BookingController::new(store);

    let driver = caller(UserRole::Driver);
    let mut request = booking_request(vehicle_id, day_pickup());
    request.driver_id = Some(driver.user_id);
    let booking = controller
        .create(&caller(UserRole::User), request)
        .await
        .unwrap()
        .data
        .unwrap()
        .booking;

    let err = controller
        .update_status(
            &caller(UserRole::Driver),
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Confirmed".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let confirmed = controller
        .update_status(
            &driver,
            booking.id,
            UpdateBookingStatusRequest {
                new_status: "Confirmed".to_string(),
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(confirmed.booking_status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn payment_updates_booking_payment_status() {
    let (booking_controller, vehicle_id) = seeded_controller().await;
    let requester = caller(UserRole::User);
    let booking =
        create_booking(&booking_controller, &requester, vehicle_id, day_pickup()).await;

    let controller = TransactionController::new(booking_controller.into_store());

    let recorded = controller
        .record(
            &requester,
            booking.id,
            RecordPaymentRequest {
                amount: 170.0,
                status: "success".to_string(),
                payment_gateway: Some("razorpay".to_string()),
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(recorded.status, "success");

    let paid = controller
        .get_for_booking(&requester, booking.id)
        .await
        .unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].amount, dec(170));

    let refreshed = controller
        .store()
        .booking_by_id(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn requester_cannot_pay_for_someone_elses_booking() {
    let (booking_controller, vehicle_id) = seeded_controller().await;
    let booking = create_booking(
        &booking_controller,
        &caller(UserRole::User),
        vehicle_id,
        day_pickup(),
    )
    .await;

    let controller = TransactionController::new(booking_controller.into_store());

    let err = controller
        .record(
            &caller(UserRole::User),
            booking.id,
            RecordPaymentRequest {
                amount: 170.0,
                status: "success".to_string(),
                payment_gateway: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}
