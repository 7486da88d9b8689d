use crate::domain::commands::vehicle::RegisterVehicleCommand;
use crate::domain::models::vehicle::{Vehicle as DomainVehicle, VehicleStatus as DomainVehicleStatus};
use shared::{RegisterVehicleRequest, Vehicle as SharedVehicle, VehicleStatus as SharedVehicleStatus};

/// Mapper between shared Vehicle DTOs and domain vehicles.
pub struct VehicleMapper;

impl VehicleMapper {
    pub fn to_dto(domain: DomainVehicle) -> SharedVehicle {
        SharedVehicle {
            id: domain.id,
            resident_id: domain.resident_id,
            plate_number: domain.plate_number,
            make: domain.make,
            model: domain.model,
            color: domain.color,
            sticker_number: domain.sticker_number,
            status: match domain.status {
                DomainVehicleStatus::Pending => SharedVehicleStatus::Pending,
                DomainVehicleStatus::Active => SharedVehicleStatus::Active,
                DomainVehicleStatus::Revoked => SharedVehicleStatus::Revoked,
            },
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_register_command(request: RegisterVehicleRequest) -> RegisterVehicleCommand {
        RegisterVehicleCommand {
            resident_id: request.resident_id,
            plate_number: request.plate_number,
            make: request.make,
            model: request.model,
            color: request.color,
        }
    }
}
