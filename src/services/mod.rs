//! Lógica de dominio del ciclo de reservas
//!
//! Funciones puras: motor de tarifas, máquina de estados y
//! construcción de consultas. La persistencia vive en `repositories`.

pub mod booking_query;
pub mod booking_state;
pub mod fare_engine;
