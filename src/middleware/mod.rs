//! Middleware del sistema
//!
//! Autenticación JWT y configuración de CORS.

pub mod auth;
pub mod cors;

pub use cors::*;
