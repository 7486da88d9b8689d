use chrono::Utc;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::domain::commands::lot::{CreateLotCommand, UpdateLotCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::generate_id;
use crate::domain::models::lot::{Lot, MapGeometry};
use crate::domain::models::resident::ResidentStatus;
use crate::domain::validation::required_text;
use crate::storage::connection::is_unique_violation;
use crate::storage::{DbConnection, LotRepository, ResidentRepository};

const MAX_LOT_FIELD_LEN: usize = 20;

/// A lot together with what the map needs to draw it
#[derive(Debug, Clone)]
pub struct LotMapCell {
    pub lot: Lot,
    pub household_head: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LotMap {
    pub cells: Vec<LotMapCell>,
    pub width: f64,
    pub height: f64,
}

/// Service for managing lots and rendering the lot map
#[derive(Clone)]
pub struct LotService {
    lot_repository: LotRepository,
    resident_repository: ResidentRepository,
}

impl LotService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            lot_repository: LotRepository::new(db.clone()),
            resident_repository: ResidentRepository::new(db),
        }
    }

    pub async fn create_lot(&self, command: CreateLotCommand) -> DomainResult<Lot> {
        info!("Creating lot: block={}, lot={}", command.block, command.lot_number);

        let block = required_text("Block", &command.block, MAX_LOT_FIELD_LEN)?;
        let lot_number = required_text("Lot number", &command.lot_number, MAX_LOT_FIELD_LEN)?;
        validate_area(command.area_sqm)?;
        validate_geometry(&command.geometry)?;

        let now = Utc::now();
        let lot = Lot {
            id: generate_id("lot"),
            block,
            lot_number,
            area_sqm: command.area_sqm,
            status: command.status,
            geometry: command.geometry,
            created_at: now,
            updated_at: now,
        };

        self.lot_repository.store_lot(&lot).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("{} already exists", lot.label()))
            } else {
                DomainError::Storage(e)
            }
        })?;

        info!("Created lot {} with ID: {}", lot.label(), lot.id);
        Ok(lot)
    }

    pub async fn get_lot(&self, lot_id: &str) -> DomainResult<Lot> {
        self.lot_repository
            .get_lot(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Lot", lot_id))
    }

    pub async fn list_lots(&self) -> DomainResult<Vec<Lot>> {
        let lots = self.lot_repository.list_lots().await?;
        info!("Found {} lots", lots.len());
        Ok(lots)
    }

    pub async fn update_lot(&self, lot_id: &str, command: UpdateLotCommand) -> DomainResult<Lot> {
        info!("Updating lot: {}", lot_id);
        let mut lot = self.get_lot(lot_id).await?;

        if let Some(area) = command.area_sqm {
            validate_area(area)?;
            lot.area_sqm = area;
        }
        if let Some(status) = command.status {
            lot.status = status;
        }
        let geometry = MapGeometry {
            x: command.map_x.unwrap_or(lot.geometry.x),
            y: command.map_y.unwrap_or(lot.geometry.y),
            width: command.map_width.unwrap_or(lot.geometry.width),
            height: command.map_height.unwrap_or(lot.geometry.height),
        };
        validate_geometry(&geometry)?;
        lot.geometry = geometry;
        lot.updated_at = Utc::now();

        self.lot_repository.update_lot(&lot).await?;
        Ok(lot)
    }

    /// Delete a lot that has no residents assigned
    pub async fn delete_lot(&self, lot_id: &str) -> DomainResult<()> {
        info!("Deleting lot: {}", lot_id);
        let lot = self.get_lot(lot_id).await?;

        let residents = self.resident_repository.list_by_lot(lot_id).await?;
        if !residents.is_empty() {
            warn!("Refusing to delete {} with {} residents", lot.label(), residents.len());
            return Err(DomainError::conflict(format!(
                "{} still has {} resident(s) assigned",
                lot.label(),
                residents.len()
            )));
        }

        self.lot_repository.delete_lot(lot_id).await?;
        Ok(())
    }

    /// Every lot with its geometry, status and household head
    pub async fn lot_map(&self) -> DomainResult<LotMap> {
        let lots = self.lot_repository.list_lots().await?;
        let approved = self.resident_repository.list_residents(Some(ResidentStatus::Approved)).await?;

        let heads: HashMap<String, String> = approved
            .into_iter()
            .filter(|r| r.is_household_head)
            .filter_map(|r| {
                let name = r.full_name();
                r.lot_id.map(|lot_id| (lot_id, name))
            })
            .collect();

        let width = lots.iter().map(|l| l.geometry.right()).fold(0.0, f64::max);
        let height = lots.iter().map(|l| l.geometry.bottom()).fold(0.0, f64::max);

        let cells = lots
            .into_iter()
            .map(|lot| LotMapCell {
                household_head: heads.get(&lot.id).cloned(),
                lot,
            })
            .collect();

        Ok(LotMap { cells, width, height })
    }
}

fn validate_area(area: f64) -> DomainResult<()> {
    if !area.is_finite() || area <= 0.0 {
        return Err(DomainError::validation("Lot area must be greater than zero"));
    }
    Ok(())
}

fn validate_geometry(geometry: &MapGeometry) -> DomainResult<()> {
    let values = [geometry.x, geometry.y, geometry.width, geometry.height];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(DomainError::validation("Map coordinates must be finite numbers"));
    }
    if geometry.x < 0.0 || geometry.y < 0.0 {
        return Err(DomainError::validation("Map position cannot be negative"));
    }
    if geometry.width <= 0.0 || geometry.height <= 0.0 {
        return Err(DomainError::validation("Map width and height must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::resident::SignUpCommand;
    use crate::domain::models::lot::LotStatus;
    use crate::domain::resident_service::ResidentService;

    fn lot_command(block: &str, number: &str, x: f64, y: f64) -> CreateLotCommand {
        CreateLotCommand {
            block: block.to_string(),
            lot_number: number.to_string(),
            area_sqm: 150.0,
            status: LotStatus::Vacant,
            geometry: MapGeometry { x, y, width: 10.0, height: 20.0 },
        }
    }

    async fn setup() -> (LotService, ResidentService) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        (LotService::new(db.clone()), ResidentService::new(db))
    }

    #[tokio::test]
    async fn test_create_and_get_lot() {
        let (service, _) = setup().await;
        let lot = service.create_lot(lot_command(" 1 ", "7", 0.0, 0.0)).await.unwrap();
        assert_eq!(lot.block, "1");
        assert_eq!(lot.label(), "Block 1 Lot 7");
        assert_eq!(service.get_lot(&lot.id).await.unwrap(), lot);
    }

    #[tokio::test]
    async fn test_create_lot_validation_and_duplicates() {
        let (service, _) = setup().await;

        let mut bad_area = lot_command("1", "1", 0.0, 0.0);
        bad_area.area_sqm = 0.0;
        assert!(matches!(service.create_lot(bad_area).await, Err(DomainError::Validation(_))));

        let bad_geometry = lot_command("1", "1", -1.0, 0.0);
        assert!(matches!(service.create_lot(bad_geometry).await, Err(DomainError::Validation(_))));

        service.create_lot(lot_command("1", "1", 0.0, 0.0)).await.unwrap();
        assert!(matches!(
            service.create_lot(lot_command("1", "1", 20.0, 0.0)).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_lot_partial() {
        let (service, _) = setup().await;
        let lot = service.create_lot(lot_command("1", "1", 0.0, 0.0)).await.unwrap();

        let updated = service
            .update_lot(
                &lot.id,
                UpdateLotCommand {
                    status: Some(LotStatus::ForSale),
                    map_x: Some(30.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.status, LotStatus::ForSale);
        assert_eq!(updated.geometry.x, 30.0);
        assert_eq!(updated.geometry.width, 10.0);
        assert_eq!(updated.area_sqm, 150.0);

        let missing = service.update_lot("lot::missing", UpdateLotCommand::default()).await;
        assert!(matches!(missing, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_refuses_occupied_lot() {
        let (service, residents) = setup().await;
        let lot = service.create_lot(lot_command("1", "1", 0.0, 0.0)).await.unwrap();
        residents
            .sign_up(SignUpCommand {
                first_name: "Ana".into(),
                last_name: "Reyes".into(),
                email: "ana@example.com".into(),
                phone: "5551234567".into(),
                lot_id: Some(lot.id.clone()),
                is_household_head: true,
                move_in_date: None,
            })
            .await
            .unwrap();

        assert!(matches!(service.delete_lot(&lot.id).await, Err(DomainError::Conflict(_))));

        let empty = service.create_lot(lot_command("1", "2", 10.0, 0.0)).await.unwrap();
        service.delete_lot(&empty.id).await.unwrap();
        assert!(matches!(service.get_lot(&empty.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_lot_map_bounds_and_household_head() {
        let (service, residents) = setup().await;
        let a = service.create_lot(lot_command("1", "1", 0.0, 0.0)).await.unwrap();
        service.create_lot(lot_command("1", "2", 40.0, 15.0)).await.unwrap();

        let resident = residents
            .sign_up(SignUpCommand {
                first_name: "Ana".into(),
                last_name: "Reyes".into(),
                email: "ana@example.com".into(),
                phone: "5551234567".into(),
                lot_id: Some(a.id.clone()),
                is_household_head: true,
                move_in_date: None,
            })
            .await
            .unwrap();

        let before = service.lot_map().await.unwrap();
        assert!(before.cells.iter().all(|c| c.household_head.is_none()));

        residents.approve(&resident.id).await.unwrap();

        let map = service.lot_map().await.unwrap();
        assert_eq!(map.width, 50.0);
        assert_eq!(map.height, 35.0);
        let cell = map.cells.iter().find(|c| c.lot.id == a.id).unwrap();
        assert_eq!(cell.household_head.as_deref(), Some("Ana Reyes"));
        assert_eq!(cell.lot.status, LotStatus::Occupied);
    }
}
