use chrono::{Datelike, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::commands::vehicle::RegisterVehicleCommand;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::generate_id;
use crate::domain::models::resident::ResidentStatus;
use crate::domain::models::vehicle::{Vehicle, VehicleStatus};
use crate::domain::validation::{normalize_plate, required_text};
use crate::storage::connection::is_unique_violation;
use crate::storage::{DbConnection, ResidentRepository, VehicleRepository};

const MAX_VEHICLE_FIELD_LEN: usize = 50;

/// Service for vehicle registration and gate stickers
#[derive(Clone)]
pub struct VehicleService {
    vehicle_repository: VehicleRepository,
    resident_repository: ResidentRepository,
    max_per_resident: usize,
    // Serialises sticker numbering
    sticker_lock: Arc<Mutex<()>>,
    // Serialises the per-resident limit check with the insert
    registration_lock: Arc<Mutex<()>>,
}

impl VehicleService {
    pub fn new(db: DbConnection, max_per_resident: usize) -> Self {
        Self {
            vehicle_repository: VehicleRepository::new(db.clone()),
            resident_repository: ResidentRepository::new(db),
            max_per_resident,
            sticker_lock: Arc::new(Mutex::new(())),
            registration_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn register(&self, command: RegisterVehicleCommand) -> DomainResult<Vehicle> {
        info!("Registering vehicle {} for {}", command.plate_number, command.resident_id);

        let plate_number = normalize_plate(&command.plate_number)?;
        let make = required_text("Make", &command.make, MAX_VEHICLE_FIELD_LEN)?;
        let model = required_text("Model", &command.model, MAX_VEHICLE_FIELD_LEN)?;
        let color = required_text("Color", &command.color, MAX_VEHICLE_FIELD_LEN)?;

        let resident = self
            .resident_repository
            .get_resident(&command.resident_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Resident", &command.resident_id))?;
        if resident.status != ResidentStatus::Approved {
            return Err(DomainError::validation("Only approved residents can register vehicles"));
        }

        let _guard = self.registration_lock.lock().await;
        if self.vehicle_repository.find_by_plate(&plate_number).await?.is_some() {
            return Err(DomainError::conflict(format!("Plate {} is already registered", plate_number)));
        }

        let registered = self
            .vehicle_repository
            .list_vehicles(Some(&resident.id))
            .await?
            .into_iter()
            .filter(|v| v.status != VehicleStatus::Revoked)
            .count();
        if registered >= self.max_per_resident {
            warn!("Resident {} already has {} vehicles", resident.id, registered);
            return Err(DomainError::validation(format!(
                "A resident may register at most {} vehicles",
                self.max_per_resident
            )));
        }

        let now = Utc::now();
        let vehicle = Vehicle {
            id: generate_id("vehicle"),
            resident_id: resident.id,
            plate_number,
            make,
            model,
            color,
            sticker_number: None,
            status: VehicleStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.vehicle_repository.store_vehicle(&vehicle).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::conflict(format!("Plate {} is already registered", vehicle.plate_number))
            } else {
                DomainError::Storage(e)
            }
        })?;

        info!("Created vehicle {} with ID: {}", vehicle.plate_number, vehicle.id);
        Ok(vehicle)
    }

    /// Activate a pending vehicle and issue the next sticker of the year
    pub async fn approve(&self, vehicle_id: &str) -> DomainResult<Vehicle> {
        info!("Approving vehicle: {}", vehicle_id);
        let _guard = self.sticker_lock.lock().await;

        let mut vehicle = self.get_vehicle(vehicle_id).await?;
        if vehicle.status != VehicleStatus::Pending {
            return Err(DomainError::validation(format!(
                "Only pending vehicles can be approved (status: {})",
                vehicle.status.as_str()
            )));
        }

        let now = Utc::now();
        let year = now.year();
        let seq = self.vehicle_repository.count_stickers_for_year(year).await? + 1;

        vehicle.status = VehicleStatus::Active;
        vehicle.sticker_number = Some(Vehicle::sticker_for(year, seq));
        vehicle.updated_at = now;
        self.vehicle_repository.update_status(&vehicle).await?;

        info!("Issued sticker {:?} to {}", vehicle.sticker_number, vehicle.plate_number);
        Ok(vehicle)
    }

    /// Revoke a vehicle; its sticker number is retired, not reused
    pub async fn revoke(&self, vehicle_id: &str) -> DomainResult<Vehicle> {
        info!("Revoking vehicle: {}", vehicle_id);
        let mut vehicle = self.get_vehicle(vehicle_id).await?;
        if vehicle.status == VehicleStatus::Revoked {
            return Err(DomainError::validation("Vehicle is already revoked"));
        }

        vehicle.status = VehicleStatus::Revoked;
        vehicle.updated_at = Utc::now();
        self.vehicle_repository.update_status(&vehicle).await?;
        Ok(vehicle)
    }

    pub async fn get_vehicle(&self, vehicle_id: &str) -> DomainResult<Vehicle> {
        self.vehicle_repository
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle", vehicle_id))
    }

    pub async fn list_vehicles(&self, resident_id: Option<&str>) -> DomainResult<Vec<Vehicle>> {
        Ok(self.vehicle_repository.list_vehicles(resident_id).await?)
    }

    /// Find a vehicle by plate as typed at the gate
    pub async fn lookup_plate(&self, plate: &str) -> DomainResult<Vehicle> {
        let plate_number = normalize_plate(plate)?;
        self.vehicle_repository
            .find_by_plate(&plate_number)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle with plate", &plate_number))
    }
}
