//! Definición de rutas de la API

pub mod booking_routes;
pub mod transaction_routes;
pub mod vehicle_routes;
