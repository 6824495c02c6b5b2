//! Controladores MVC
//!
//! Reciben requests ya decodificadas de las rutas, aplican la lógica
//! de dominio y devuelven DTOs de respuesta.

pub mod booking_controller;
pub mod transaction_controller;
pub mod vehicle_controller;
