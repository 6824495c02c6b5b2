//! Módulo de base de datos
//!
//! Maneja la conexión a PostgreSQL y las migraciones.

pub mod connection;

pub use connection::DatabaseConnection;
