//! Coordinación de disponibilidad del vehículo
//!
//! Estas funciones operan siempre dentro de la transacción de base de
//! datos del caller: el flag `is_available` nunca se muta fuera de la
//! misma unidad atómica que escribe la reserva.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::services::booking_state::AvailabilityAction;
use crate::utils::errors::{AppError, AppResult};

/// Toma el vehículo para una reserva nueva. Update condicional: si el
/// vehículo ya está ocupado no afecta filas y toda la operación de
/// creación se revierte.
pub async fn acquire(tx: &mut Transaction<'_, Postgres>, vehicle_id: Uuid) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE vehicles SET is_available = FALSE WHERE id = $1 AND is_available = TRUE",
    )
    .bind(vehicle_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::ResourceUnavailable(
            "Vehicle is not available for booking".to_string(),
        ));
    }

    Ok(())
}

/// Mantiene el vehículo ocupado (idempotente, usado al confirmar)
pub async fn hold(tx: &mut Transaction<'_, Postgres>, vehicle_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE vehicles SET is_available = FALSE WHERE id = $1")
        .bind(vehicle_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Libera el vehículo (cancelación o finalización)
pub async fn release(tx: &mut Transaction<'_, Postgres>, vehicle_id: Uuid) -> AppResult<()> {
    sqlx::query("UPDATE vehicles SET is_available = TRUE WHERE id = $1")
        .bind(vehicle_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Aplica el efecto de disponibilidad de una transición de estado
pub async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: Uuid,
    action: AvailabilityAction,
) -> AppResult<()> {
    match action {
        AvailabilityAction::Hold => hold(tx, vehicle_id).await,
        AvailabilityAction::Release => release(tx, vehicle_id).await,
        AvailabilityAction::Keep => Ok(()),
    }
}
