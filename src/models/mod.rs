//! Modelos de dominio
//!
//! Structs que mapean a las tablas de PostgreSQL y los enums de
//! estado compartidos por todo el sistema.

pub mod booking;
pub mod fare_rule;
pub mod transaction;
pub mod user;
pub mod vehicle;
