use crate::domain::commands::resident::{SignUpCommand, UpdateResidentCommand};
use crate::domain::error::DomainResult;
use crate::domain::models::resident::{Resident as DomainResident, ResidentStatus as DomainResidentStatus};
use crate::domain::validation::parse_date;
use shared::{Resident as SharedResident, ResidentStatus as SharedResidentStatus, SignUpRequest, UpdateResidentRequest};

/// Mapper between shared Resident DTOs and domain residents.
pub struct ResidentMapper;

impl ResidentMapper {
    pub fn to_dto(domain: DomainResident) -> SharedResident {
        SharedResident {
            id: domain.id,
            first_name: domain.first_name,
            last_name: domain.last_name,
            email: domain.email,
            phone: domain.phone,
            lot_id: domain.lot_id,
            is_household_head: domain.is_household_head,
            status: Self::status_to_dto(domain.status),
            move_in_date: domain.move_in_date.format("%Y-%m-%d").to_string(),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn status_to_dto(status: DomainResidentStatus) -> SharedResidentStatus {
        match status {
            DomainResidentStatus::Pending => SharedResidentStatus::Pending,
            DomainResidentStatus::Approved => SharedResidentStatus::Approved,
            DomainResidentStatus::Rejected => SharedResidentStatus::Rejected,
            DomainResidentStatus::Inactive => SharedResidentStatus::Inactive,
        }
    }

    pub fn status_to_domain(status: SharedResidentStatus) -> DomainResidentStatus {
        match status {
            SharedResidentStatus::Pending => DomainResidentStatus::Pending,
            SharedResidentStatus::Approved => DomainResidentStatus::Approved,
            SharedResidentStatus::Rejected => DomainResidentStatus::Rejected,
            SharedResidentStatus::Inactive => DomainResidentStatus::Inactive,
        }
    }

    pub fn to_sign_up_command(request: SignUpRequest) -> DomainResult<SignUpCommand> {
        let move_in_date = request
            .move_in_date
            .as_deref()
            .map(|d| parse_date("Move-in date", d))
            .transpose()?;

        Ok(SignUpCommand {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
            lot_id: request.lot_id.filter(|id| !id.trim().is_empty()),
            is_household_head: request.is_household_head,
            move_in_date,
        })
    }

    pub fn to_update_command(request: UpdateResidentRequest) -> UpdateResidentCommand {
        UpdateResidentCommand {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone: request.phone,
        }
    }
}
