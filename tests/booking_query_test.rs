//! Tests de integración del listado de reservas: paginación,
//! filtros, búsqueda, orden y alcance por rol.

use chrono::{NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use cab_booking::controllers::booking_controller::BookingController;
use cab_booking::dto::booking_dto::{BookingListParams, CreateBookingRequest};
use cab_booking::middleware::auth::AuthenticatedUser;
use cab_booking::models::booking::{Booking, BookingStatus};
use cab_booking::models::fare_rule::FareRule;
use cab_booking::models::user::UserRole;
use cab_booking::models::vehicle::Vehicle;
use cab_booking::repositories::MemoryBookingStore;
use cab_booking::utils::errors::AppError;

fn caller(role: UserRole) -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        role,
    }
}

fn params() -> BookingListParams {
    BookingListParams {
        search: None,
        status: None,
        sort_by: None,
        sort_order: None,
        page: None,
        limit: None,
        vehicle_id: None,
        driver_id: None,
        user_id: None,
    }
}

/// Siembra un vehículo con su regla (sin piso ni recargo nocturno
/// relevantes) y crea una reserva del requester con la distancia dada.
async fn seed_booking(
    controller: &BookingController<MemoryBookingStore>,
    requester: &AuthenticatedUser,
    vehicle_name: &str,
    from_location: &str,
    distance_km: f64,
    driver_id: Option<Uuid>,
) -> Booking {
    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        vehicle_name: vehicle_name.to_string(),
        vehicle_type: "sedan".to_string(),
        fuel_type: None,
        seat_capacity: 4,
        bag_capacity: 2,
        description: None,
        is_available: true,
        created_at: Utc::now(),
    };
    let rule = FareRule {
        id: Uuid::new_v4(),
        vehicle_id: vehicle.id,
        base_fare: Decimal::from(50),
        price_per_km: Decimal::from(10),
        price_per_min: Decimal::ONE,
        waiting_charge_per_min: Decimal::ZERO,
        late_compensation_per_min: Decimal::ZERO,
        minimum_fare: Decimal::ZERO,
        night_multiplier: Decimal::ONE,
        night_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        night_end: NaiveTime::from_hms_opt(5, 0, 0).unwrap(),
        created_at: Utc::now(),
    };
    let vehicle_id = vehicle.id;
    controller.store().add_vehicle(vehicle).await;
    controller.store().add_fare_rule(rule).await;

    controller
        .create(
            requester,
            CreateBookingRequest {
                vehicle_id,
                driver_id,
                from_location: from_location.to_string(),
                to_location: "Downtown".to_string(),
                distance_km,
                duration_min: 15,
                passenger_count: 1,
                trip_type: None,
                scheduled_pickup: Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
                payment_method: "cash".to_string(),
            },
        )
        .await
        .unwrap()
        .data
        .unwrap()
        .booking
}

#[tokio::test]
async fn pagination_returns_requested_page_and_total() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let requester = caller(UserRole::User);
    controller.store().add_user(requester.user_id, "Ana Ruiz").await;

    for i in 0..25 {
        seed_booking(
            &controller,
            &requester,
            &format!("Cab {}", i),
            "Airport",
            5.0,
            None,
        )
        .await;
    }

    let mut page2 = params();
    page2.page = Some(2);
    page2.limit = Some(10);

    let response = controller.list(&requester, page2).await.unwrap();
    assert_eq!(response.total, 25);
    assert_eq!(response.page, 2);
    assert_eq!(response.limit, 10);
    assert_eq!(response.bookings.len(), 10);

    let mut page3 = params();
    page3.page = Some(3);
    page3.limit = Some(10);
    let response = controller.list(&requester, page3).await.unwrap();
    assert_eq!(response.bookings.len(), 5);
}

#[tokio::test]
async fn requester_only_sees_own_bookings() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let alice = caller(UserRole::User);
    let bob = caller(UserRole::User);

    seed_booking(&controller, &alice, "Cab A", "Airport", 5.0, None).await;
    seed_booking(&controller, &bob, "Cab B", "Station", 5.0, None).await;
    seed_booking(&controller, &bob, "Cab C", "Harbor", 5.0, None).await;

    let own = controller.list(&alice, params()).await.unwrap();
    assert_eq!(own.total, 1);
    assert!(own.bookings.iter().all(|b| b.booking.user_id == alice.user_id));

    let admin_view = controller.list(&caller(UserRole::Admin), params()).await.unwrap();
    assert_eq!(admin_view.total, 3);
}

#[tokio::test]
async fn driver_only_sees_assigned_bookings() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let requester = caller(UserRole::User);
    let driver = caller(UserRole::Driver);

    seed_booking(&controller, &requester, "Cab A", "Airport", 5.0, Some(driver.user_id)).await;
    seed_booking(&controller, &requester, "Cab B", "Station", 5.0, None).await;

    let assigned = controller.list(&driver, params()).await.unwrap();
    assert_eq!(assigned.total, 1);
    assert_eq!(assigned.bookings[0].booking.driver_id, Some(driver.user_id));
}

#[tokio::test]
async fn status_filter_narrows_the_listing() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let requester = caller(UserRole::User);

    let to_cancel = seed_booking(&controller, &requester, "Cab A", "Airport", 5.0, None).await;
    seed_booking(&controller, &requester, "Cab B", "Station", 5.0, None).await;

    controller
        .update_status(
            &requester,
            to_cancel.id,
            cab_booking::dto::booking_dto::UpdateBookingStatusRequest {
                new_status: "Cancelled".to_string(),
            },
        )
        .await
        .unwrap();

    let mut cancelled = params();
    cancelled.status = Some("Cancelled".to_string());
    let response = controller.list(&requester, cancelled).await.unwrap();
    assert_eq!(response.total, 1);
    assert_eq!(
        response.bookings[0].booking.booking_status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn unknown_status_filter_is_rejected() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let mut bad = params();
    bad.status = Some("Driving".to_string());

    let err = controller
        .list(&caller(UserRole::Admin), bad)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn search_matches_vehicle_name_and_location() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let requester = caller(UserRole::User);
    controller.store().add_user(requester.user_id, "Ana Ruiz").await;

    seed_booking(&controller, &requester, "Swift Dzire", "Airport T2", 5.0, None).await;
    seed_booking(&controller, &requester, "Innova Crysta", "Central Station", 5.0, None).await;

    let mut by_vehicle = params();
    by_vehicle.search = Some("dzire".to_string());
    let response = controller.list(&requester, by_vehicle).await.unwrap();
    assert_eq!(response.total, 1);
    assert_eq!(response.bookings[0].vehicle_name, "Swift Dzire");

    let mut by_location = params();
    by_location.search = Some("central".to_string());
    let response = controller.list(&requester, by_location).await.unwrap();
    assert_eq!(response.total, 1);
    assert_eq!(response.bookings[0].booking.from_location, "Central Station");

    // Espacios en blanco no cuentan como búsqueda
    let mut blank = params();
    blank.search = Some("   ".to_string());
    let response = controller.list(&requester, blank).await.unwrap();
    assert_eq!(response.total, 2);
}

#[tokio::test]
async fn sorting_by_final_fare_ascending() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let requester = caller(UserRole::User);

    seed_booking(&controller, &requester, "Cab A", "Airport", 20.0, None).await;
    seed_booking(&controller, &requester, "Cab B", "Station", 5.0, None).await;
    seed_booking(&controller, &requester, "Cab C", "Harbor", 10.0, None).await;

    let mut sorted = params();
    sorted.sort_by = Some("final_fare".to_string());
    sorted.sort_order = Some("asc".to_string());

    let response = controller.list(&requester, sorted).await.unwrap();
    let fares: Vec<Decimal> = response
        .bookings
        .iter()
        .map(|b| b.booking.final_fare)
        .collect();
    let mut expected = fares.clone();
    expected.sort();
    assert_eq!(fares, expected);
    assert_eq!(response.bookings[0].vehicle_name, "Cab B");
}

#[tokio::test]
async fn unsupported_sort_field_is_rejected() {
    let controller = BookingController::new(MemoryBookingStore::new());
    let mut bad = params();
    bad.sort_by = Some("fare_breakdown".to_string());

    let err = controller
        .list(&caller(UserRole::Admin), bad)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
