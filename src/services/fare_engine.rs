//! Motor de cálculo tarifario
//!
//! Función pura: regla tarifaria del vehículo + parámetros del viaje
//! → tarifa final con desglose. Todo el cálculo monetario usa
//! `rust_decimal::Decimal` para evitar errores de redondeo binario.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::fare_rule::FareRule;

/// Parámetros del viaje a tarifar
#[derive(Debug, Clone)]
pub struct TripParams {
    pub distance_km: Decimal,
    pub duration_min: Decimal,
    pub waiting_min: Decimal,
    pub driver_late_min: Decimal,
    /// Hora de recogida (hora del día, no fecha)
    pub pickup_time: NaiveTime,
}

/// Desglose por componente del cálculo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_fare: Decimal,
    pub distance_charge: Decimal,
    pub duration_charge: Decimal,
    pub waiting_charge: Decimal,
    pub late_compensation: Decimal,
    /// Multiplicador aplicado (1 si no es viaje nocturno)
    pub night_multiplier: Decimal,
    pub minimum_fare_applied: bool,
}

/// Resultado del motor de tarifas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareQuote {
    pub final_fare: Decimal,
    pub is_night_ride: bool,
    pub breakdown: FareBreakdown,
}

/// Calcula la tarifa final de un viaje según la regla del vehículo.
///
/// 1. `raw = base + km·precio_km + min·precio_min + espera·cargo_espera
///    − retraso·compensación_retraso`
/// 2. Si la recogida cae en la ventana nocturna, `raw` se multiplica
///    por `night_multiplier`.
/// 3. La tarifa final nunca baja del piso `minimum_fare`, incluso si
///    una compensación por retraso grande vuelve `raw` negativa.
pub fn compute_fare(rule: &FareRule, trip: &TripParams) -> FareQuote {
    let distance_charge = trip.distance_km * rule.price_per_km;
    let duration_charge = trip.duration_min * rule.price_per_min;
    let waiting_charge = trip.waiting_min * rule.waiting_charge_per_min;
    let late_compensation = trip.driver_late_min * rule.late_compensation_per_min;

    let mut fare =
        rule.base_fare + distance_charge + duration_charge + waiting_charge - late_compensation;

    let is_night_ride = in_night_window(trip.pickup_time, rule.night_start, rule.night_end);

    let night_multiplier = if is_night_ride {
        fare *= rule.night_multiplier;
        rule.night_multiplier
    } else {
        Decimal::ONE
    };

    let minimum_fare_applied = fare < rule.minimum_fare;
    let final_fare = fare.max(rule.minimum_fare);

    FareQuote {
        final_fare,
        is_night_ride,
        breakdown: FareBreakdown {
            base_fare: rule.base_fare,
            distance_charge,
            duration_charge,
            waiting_charge,
            late_compensation,
            night_multiplier,
            minimum_fare_applied,
        },
    }
}

/// Determina si una hora de recogida cae dentro de la ventana
/// nocturna `[start, end)`.
///
/// Regla simétrica: inclusiva en `start`, exclusiva en `end`, tanto
/// para ventanas normales como para ventanas que cruzan la medianoche
/// (`start > end`).
pub fn in_night_window(pickup: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start <= end {
        pickup >= start && pickup < end
    } else {
        pickup >= start || pickup < end
    }
}
