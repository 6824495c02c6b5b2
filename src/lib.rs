//! Backend de administración de reservas de cabs
//!
//! Núcleo: máquina de estados del ciclo de reservas, motor de
//! tarifas dinámicas y coordinación de disponibilidad de vehículos,
//! expuestos como API REST multi-rol.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
