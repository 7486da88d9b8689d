use crate::domain::commands::lot::{CreateLotCommand, UpdateLotCommand};
use crate::domain::lot_service::LotMap;
use crate::domain::models::lot::{Lot as DomainLot, LotStatus as DomainLotStatus, MapGeometry};
use shared::{CreateLotRequest, Lot as SharedLot, LotMapEntry, LotMapResponse, LotStatus as SharedLotStatus, UpdateLotRequest};

/// Mapper between shared Lot DTOs and domain lots.
pub struct LotMapper;

impl LotMapper {
    pub fn to_dto(domain: DomainLot) -> SharedLot {
        SharedLot {
            id: domain.id,
            block: domain.block,
            lot_number: domain.lot_number,
            area_sqm: domain.area_sqm,
            status: Self::status_to_dto(domain.status),
            map_x: domain.geometry.x,
            map_y: domain.geometry.y,
            map_width: domain.geometry.width,
            map_height: domain.geometry.height,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn status_to_dto(status: DomainLotStatus) -> SharedLotStatus {
        match status {
            DomainLotStatus::Vacant => SharedLotStatus::Vacant,
            DomainLotStatus::Occupied => SharedLotStatus::Occupied,
            DomainLotStatus::ForSale => SharedLotStatus::ForSale,
            DomainLotStatus::UnderConstruction => SharedLotStatus::UnderConstruction,
        }
    }

    pub fn status_to_domain(status: SharedLotStatus) -> DomainLotStatus {
        match status {
            SharedLotStatus::Vacant => DomainLotStatus::Vacant,
            SharedLotStatus::Occupied => DomainLotStatus::Occupied,
            SharedLotStatus::ForSale => DomainLotStatus::ForSale,
            SharedLotStatus::UnderConstruction => DomainLotStatus::UnderConstruction,
        }
    }

    pub fn to_create_command(request: CreateLotRequest) -> CreateLotCommand {
        CreateLotCommand {
            block: request.block,
            lot_number: request.lot_number,
            area_sqm: request.area_sqm,
            status: request.status.map(Self::status_to_domain).unwrap_or(DomainLotStatus::Vacant),
            geometry: MapGeometry {
                x: request.map_x,
                y: request.map_y,
                width: request.map_width,
                height: request.map_height,
            },
        }
    }

    pub fn to_update_command(request: UpdateLotRequest) -> UpdateLotCommand {
        UpdateLotCommand {
            area_sqm: request.area_sqm,
            status: request.status.map(Self::status_to_domain),
            map_x: request.map_x,
            map_y: request.map_y,
            map_width: request.map_width,
            map_height: request.map_height,
        }
    }

    pub fn to_map_dto(map: LotMap) -> LotMapResponse {
        LotMapResponse {
            entries: map
                .cells
                .into_iter()
                .map(|cell| LotMapEntry {
                    label: cell.lot.label(),
                    lot_id: cell.lot.id,
                    status: Self::status_to_dto(cell.lot.status),
                    x: cell.lot.geometry.x,
                    y: cell.lot.geometry.y,
                    width: cell.lot.geometry.width,
                    height: cell.lot.geometry.height,
                    household_head: cell.household_head,
                })
                .collect(),
            width: map.width,
            height: map.height,
        }
    }
}
