//! Máquina de estados del ciclo de vida de una reserva
//!
//! Grafo de transiciones: `Booked → Confirmed → Completed`, con
//! cancelación desde `Booked` o `Confirmed`. `Cancelled` y
//! `Completed` son terminales.
//!
//! `plan_transition` es pura: valida rol y transición y devuelve el
//! cambio a aplicar; el store lo persiste junto con el ajuste de
//! disponibilidad del vehículo en una sola transacción.

use chrono::{DateTime, Utc};

use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::user::UserRole;
use crate::utils::errors::{AppError, AppResult};

/// Efecto sobre `vehicles.is_available` que acompaña a una transición
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityAction {
    /// Mantener el vehículo ocupado (Confirm)
    Hold,
    /// Liberar el vehículo (Cancel/Complete)
    Release,
    /// Sin cambio
    Keep,
}

/// Cambio de estado planificado, listo para persistir
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub new_status: BookingStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub availability: AvailabilityAction,
}

/// Valida y planifica una transición de estado.
///
/// Orden de verificación: estado terminal, validez de la arista en el
/// grafo, permisos del rol. Un requester solo puede cancelar sus
/// propias reservas; un driver solo opera reservas asignadas a él;
/// admin/master operan sobre todas.
pub fn plan_transition(
    booking: &Booking,
    target: BookingStatus,
    caller: &AuthenticatedUser,
    now: DateTime<Utc>,
) -> AppResult<StatusChange> {
    let current = booking.booking_status;

    if current.is_terminal() {
        return Err(AppError::InvalidTransition(format!(
            "Booking is already {} and cannot be modified",
            current
        )));
    }

    let valid_edge = matches!(
        (current, target),
        (BookingStatus::Booked, BookingStatus::Confirmed)
            | (BookingStatus::Booked, BookingStatus::Cancelled)
            | (BookingStatus::Confirmed, BookingStatus::Completed)
            | (BookingStatus::Confirmed, BookingStatus::Cancelled)
    );
    if !valid_edge {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move booking from {} to {}",
            current, target
        )));
    }

    match caller.role {
        UserRole::User => {
            if booking.user_id != caller.user_id {
                return Err(AppError::Forbidden(
                    "You can only act on your own bookings".to_string(),
                ));
            }
            if target != BookingStatus::Cancelled {
                return Err(AppError::Forbidden(
                    "Only cancellation is allowed for the booking requester".to_string(),
                ));
            }
        }
        UserRole::Driver => {
            if booking.driver_id != Some(caller.user_id) {
                return Err(AppError::Forbidden(
                    "This booking is not assigned to you".to_string(),
                ));
            }
        }
        UserRole::Admin | UserRole::Master => {}
    }

    let change = match target {
        BookingStatus::Confirmed => StatusChange {
            new_status: target,
            cancelled_at: None,
            completed_at: None,
            availability: AvailabilityAction::Hold,
        },
        BookingStatus::Cancelled => StatusChange {
            new_status: target,
            cancelled_at: Some(now),
            completed_at: None,
            availability: AvailabilityAction::Release,
        },
        BookingStatus::Completed => StatusChange {
            new_status: target,
            cancelled_at: None,
            completed_at: Some(now),
            availability: AvailabilityAction::Release,
        },
        // Booked solo es estado inicial; nunca es destino válido
        BookingStatus::Booked => unreachable!("Booked is never a valid transition target"),
    };

    Ok(change)
}
