//! Capa de persistencia
//!
//! El núcleo de reservas habla con el trait `BookingStore`; la
//! implementación Postgres es la de producción y la de memoria se usa
//! en tests. El CRUD de vehículos usa un repositorio concreto.

pub mod availability;
pub mod booking_repository;
pub mod memory_store;
pub mod store;
pub mod vehicle_repository;

pub use booking_repository::PgBookingStore;
pub use memory_store::MemoryBookingStore;
pub use store::BookingStore;
