//! Roles de usuario del sistema
//!
//! El backend consume la identidad del llamante como un dato opaco
//! (id + rol) decodificado del JWT; la emisión de tokens vive fuera
//! de este servicio.

use serde::{Deserialize, Serialize};

/// Rol del llamante, tal como viene en el claim `role` del JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Usuario final que solicita reservas
    User,
    Driver,
    Admin,
    Master,
}

impl UserRole {
    pub fn from_claim(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserRole::User),
            "driver" => Some(UserRole::Driver),
            "admin" => Some(UserRole::Admin),
            "master" => Some(UserRole::Master),
            _ => None,
        }
    }

    /// Admin y master pueden operar sobre cualquier reserva
    pub fn is_elevated(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Master)
    }
}
