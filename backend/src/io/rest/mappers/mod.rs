//! Conversions between the `shared` wire types and domain models.
//!
//! Inbound mappers parse dates, times and periods and return
//! `DomainError::Validation` on malformed input. Outbound mappers are
//! infallible.

pub mod amenity_mapper;
pub mod dues_mapper;
pub mod lot_mapper;
pub mod reservation_mapper;
pub mod resident_mapper;
pub mod vehicle_mapper;

pub use amenity_mapper::AmenityMapper;
pub use dues_mapper::DuesMapper;
pub use lot_mapper::LotMapper;
pub use reservation_mapper::ReservationMapper;
pub use resident_mapper::ResidentMapper;
pub use vehicle_mapper::VehicleMapper;
