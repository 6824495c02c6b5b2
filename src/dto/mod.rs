//! DTOs de request/response de la API

pub mod booking_dto;
pub mod common;
pub mod transaction_dto;
pub mod vehicle_dto;
