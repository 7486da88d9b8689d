use crate::domain::commands::amenity::{CreateAmenityCommand, UpdateAmenityCommand};
use crate::domain::conflict::TIME_FORMAT;
use crate::domain::error::DomainResult;
use crate::domain::models::amenity::{Amenity as DomainAmenity, AmenityKind as DomainAmenityKind};
use crate::domain::validation::parse_time;
use shared::{Amenity as SharedAmenity, AmenityKind as SharedAmenityKind, CreateAmenityRequest, UpdateAmenityRequest};

/// Mapper between shared Amenity DTOs and domain amenities.
pub struct AmenityMapper;

impl AmenityMapper {
    pub fn to_dto(domain: DomainAmenity) -> SharedAmenity {
        SharedAmenity {
            id: domain.id,
            name: domain.name,
            kind: match domain.kind {
                DomainAmenityKind::Court => SharedAmenityKind::Court,
                DomainAmenityKind::Gazebo => SharedAmenityKind::Gazebo,
                DomainAmenityKind::Parking => SharedAmenityKind::Parking,
                DomainAmenityKind::Pool => SharedAmenityKind::Pool,
                DomainAmenityKind::Clubhouse => SharedAmenityKind::Clubhouse,
                DomainAmenityKind::Other => SharedAmenityKind::Other,
            },
            open_time: domain.open_time.format(TIME_FORMAT).to_string(),
            close_time: domain.close_time.format(TIME_FORMAT).to_string(),
            hourly_rate_cents: domain.hourly_rate_cents,
            max_hours_per_booking: domain.max_hours_per_booking,
            is_active: domain.is_active,
        }
    }

    fn kind_to_domain(kind: SharedAmenityKind) -> DomainAmenityKind {
        match kind {
            SharedAmenityKind::Court => DomainAmenityKind::Court,
            SharedAmenityKind::Gazebo => DomainAmenityKind::Gazebo,
            SharedAmenityKind::Parking => DomainAmenityKind::Parking,
            SharedAmenityKind::Pool => DomainAmenityKind::Pool,
            SharedAmenityKind::Clubhouse => DomainAmenityKind::Clubhouse,
            SharedAmenityKind::Other => DomainAmenityKind::Other,
        }
    }

    pub fn to_create_command(request: CreateAmenityRequest) -> DomainResult<CreateAmenityCommand> {
        Ok(CreateAmenityCommand {
            name: request.name,
            kind: Self::kind_to_domain(request.kind),
            open_time: parse_time("Opening time", &request.open_time)?,
            close_time: parse_time("Closing time", &request.close_time)?,
            hourly_rate_cents: request.hourly_rate_cents,
            max_hours_per_booking: request.max_hours_per_booking,
        })
    }

    pub fn to_update_command(request: UpdateAmenityRequest) -> DomainResult<UpdateAmenityCommand> {
        Ok(UpdateAmenityCommand {
            name: request.name,
            open_time: request.open_time.as_deref().map(|t| parse_time("Opening time", t)).transpose()?,
            close_time: request.close_time.as_deref().map(|t| parse_time("Closing time", t)).transpose()?,
            hourly_rate_cents: request.hourly_rate_cents,
            max_hours_per_booking: request.max_hours_per_booking,
            is_active: request.is_active,
        })
    }
}
