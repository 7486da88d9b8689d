use tracing::info;

use crate::domain::commands::amenity::{CreateAmenityCommand, UpdateAmenityCommand};
use crate::domain::conflict::TIME_FORMAT;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::amenity::Amenity;
use crate::domain::models::generate_id;
use crate::domain::validation::{amount_cents, required_text, MAX_NAME_LEN};
use crate::storage::connection::is_unique_violation;
use crate::storage::{AmenityRepository, DbConnection};

const MAX_HOURS_PER_BOOKING: u32 = 24;

/// Service for the bookable amenities catalogue
#[derive(Clone)]
pub struct AmenityService {
    amenity_repository: AmenityRepository,
}

impl AmenityService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            amenity_repository: AmenityRepository::new(db),
        }
    }

    pub async fn create_amenity(&self, command: CreateAmenityCommand) -> DomainResult<Amenity> {
        info!("Creating amenity: {}", command.name);

        let amenity = Amenity {
            id: generate_id("amenity"),
            name: required_text("Amenity name", &command.name, MAX_NAME_LEN)?,
            kind: command.kind,
            open_time: command.open_time,
            close_time: command.close_time,
            hourly_rate_cents: command.hourly_rate_cents,
            max_hours_per_booking: command.max_hours_per_booking,
            is_active: true,
        };
        validate(&amenity)?;

        self.amenity_repository
            .store_amenity(&amenity)
            .await
            .map_err(|e| name_conflict(e, &amenity.name))?;

        info!("Created amenity {} with ID: {}", amenity.name, amenity.id);
        Ok(amenity)
    }

    pub async fn get_amenity(&self, amenity_id: &str) -> DomainResult<Amenity> {
        self.amenity_repository
            .get_amenity(amenity_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Amenity", amenity_id))
    }

    pub async fn list_amenities(&self, include_inactive: bool) -> DomainResult<Vec<Amenity>> {
        Ok(self.amenity_repository.list_amenities(include_inactive).await?)
    }

    pub async fn update_amenity(&self, amenity_id: &str, command: UpdateAmenityCommand) -> DomainResult<Amenity> {
        info!("Updating amenity: {}", amenity_id);
        let mut amenity = self.get_amenity(amenity_id).await?;

        if let Some(name) = command.name {
            amenity.name = required_text("Amenity name", &name, MAX_NAME_LEN)?;
        }
        if let Some(open_time) = command.open_time {
            amenity.open_time = open_time;
        }
        if let Some(close_time) = command.close_time {
            amenity.close_time = close_time;
        }
        if let Some(rate) = command.hourly_rate_cents {
            amenity.hourly_rate_cents = rate;
        }
        if let Some(max_hours) = command.max_hours_per_booking {
            amenity.max_hours_per_booking = max_hours;
        }
        if let Some(is_active) = command.is_active {
            amenity.is_active = is_active;
        }
        validate(&amenity)?;

        self.amenity_repository
            .update_amenity(&amenity)
            .await
            .map_err(|e| name_conflict(e, &amenity.name))?;
        Ok(amenity)
    }

    /// Take an amenity out of the bookable list; existing reservations stay
    pub async fn deactivate_amenity(&self, amenity_id: &str) -> DomainResult<Amenity> {
        info!("Deactivating amenity: {}", amenity_id);
        self.update_amenity(
            amenity_id,
            UpdateAmenityCommand {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}

fn validate(amenity: &Amenity) -> DomainResult<()> {
    if amenity.open_time >= amenity.close_time {
        return Err(DomainError::validation(format!(
            "Opening time {} must be before closing time {}",
            amenity.open_time.format(TIME_FORMAT),
            amenity.close_time.format(TIME_FORMAT)
        )));
    }
    amount_cents("Hourly rate", amenity.hourly_rate_cents, 0)?;
    if !(1..=MAX_HOURS_PER_BOOKING).contains(&amenity.max_hours_per_booking) {
        return Err(DomainError::validation(format!(
            "Max hours per booking must be between 1 and {}",
            MAX_HOURS_PER_BOOKING
        )));
    }
    Ok(())
}

fn name_conflict(err: anyhow::Error, name: &str) -> DomainError {
    if is_unique_violation(&err) {
        DomainError::conflict(format!("An amenity named {} already exists", name))
    } else {
        DomainError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::amenity::AmenityKind;
    use crate::domain::validation::MAX_AMOUNT_CENTS;
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn court(name: &str) -> CreateAmenityCommand {
        CreateAmenityCommand {
            name: name.to_string(),
            kind: AmenityKind::Court,
            open_time: t(6),
            close_time: t(22),
            hourly_rate_cents: 20_000,
            max_hours_per_booking: 2,
        }
    }

    async fn setup() -> AmenityService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AmenityService::new(db)
    }

    #[tokio::test]
    async fn test_create_and_list_amenities() {
        let service = setup().await;
        let court = service.create_amenity(court("Basketball Court")).await.unwrap();
        service.create_amenity(self::court("Gazebo")).await.unwrap();

        assert_eq!(service.get_amenity(&court.id).await.unwrap(), court);
        let names: Vec<String> = service.list_amenities(false).await.unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Basketball Court", "Gazebo"]);
    }

    #[tokio::test]
    async fn test_create_amenity_validation() {
        let service = setup().await;

        let mut inverted = court("Court");
        inverted.open_time = t(22);
        inverted.close_time = t(6);
        assert!(matches!(service.create_amenity(inverted).await, Err(DomainError::Validation(_))));

        let mut negative = court("Court");
        negative.hourly_rate_cents = -1;
        assert!(matches!(service.create_amenity(negative).await, Err(DomainError::Validation(_))));

        let mut huge_rate = court("Court");
        huge_rate.hourly_rate_cents = 100_000_000_000_000_000;
        assert!(matches!(service.create_amenity(huge_rate).await, Err(DomainError::Validation(_))));

        let mut zero_hours = court("Court");
        zero_hours.max_hours_per_booking = 0;
        assert!(matches!(service.create_amenity(zero_hours).await, Err(DomainError::Validation(_))));

        service.create_amenity(court("Court")).await.unwrap();
        assert!(matches!(service.create_amenity(court("court")).await, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_and_deactivate() {
        let service = setup().await;
        let court = service.create_amenity(court("Court")).await.unwrap();

        let updated = service
            .update_amenity(
                &court.id,
                UpdateAmenityCommand {
                    hourly_rate_cents: Some(0),
                    close_time: Some(t(20)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.hourly_rate_cents, 0);
        assert_eq!(updated.close_time, t(20));
        assert_eq!(updated.open_time, t(6));

        let over_cap = service
            .update_amenity(
                &court.id,
                UpdateAmenityCommand {
                    hourly_rate_cents: Some(MAX_AMOUNT_CENTS + 1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(over_cap, Err(DomainError::Validation(_))));

        service.deactivate_amenity(&court.id).await.unwrap();
        assert!(service.list_amenities(false).await.unwrap().is_empty());
        assert_eq!(service.list_amenities(true).await.unwrap().len(), 1);
    }
}
