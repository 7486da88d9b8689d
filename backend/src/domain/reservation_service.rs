//! # Reservation Service
//!
//! Holds, confirms and cancels amenity bookings.
//!
//! A new booking starts as a `Held` reservation that blocks its slot until
//! `hold_expires_at`. Confirming turns it into a permanent booking; an
//! expired hold stops blocking immediately and is swept to `Cancelled` by a
//! background task.
//!
//! Double booking is prevented twice over: `hold` takes the service-wide
//! booking lock, and the repository runs the overlap check and the insert in
//! one transaction.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ReservationConfig;
use crate::domain::commands::reservation::{Availability, HoldReservationCommand};
use crate::domain::conflict::{SlotIndex, TimeSlot, TIME_FORMAT};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::generate_id;
use crate::domain::models::reservation::{Reservation, ReservationStatus};
use crate::domain::models::resident::ResidentStatus;
use crate::storage::repositories::reservation_repository::ReservationFilter;
use crate::storage::{AmenityRepository, DbConnection, ReservationRepository, ResidentRepository};

const MAX_PURPOSE_LEN: usize = 200;

#[derive(Clone)]
pub struct ReservationService {
    reservation_repository: ReservationRepository,
    amenity_repository: AmenityRepository,
    resident_repository: ResidentRepository,
    settings: ReservationConfig,
    booking_lock: Arc<Mutex<()>>,
}

impl ReservationService {
    pub fn new(db: DbConnection, settings: ReservationConfig) -> Self {
        Self {
            reservation_repository: ReservationRepository::new(db.clone()),
            amenity_repository: AmenityRepository::new(db.clone()),
            resident_repository: ResidentRepository::new(db),
            settings,
            booking_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn hold(&self, command: HoldReservationCommand) -> DomainResult<Reservation> {
        self.hold_at(command, Utc::now()).await
    }

    /// Place a hold on a slot as of `now`
    pub async fn hold_at(&self, command: HoldReservationCommand, now: DateTime<Utc>) -> DomainResult<Reservation> {
        info!(
            "Hold requested: amenity={}, resident={}, {} {}-{}",
            command.amenity_id,
            command.resident_id,
            command.date,
            command.start_time.format(TIME_FORMAT),
            command.end_time.format(TIME_FORMAT)
        );

        let amenity = self
            .amenity_repository
            .get_amenity(&command.amenity_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Amenity", &command.amenity_id))?;
        if !amenity.is_active {
            return Err(DomainError::validation(format!("{} is not open for booking", amenity.name)));
        }

        let resident = self
            .resident_repository
            .get_resident(&command.resident_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Resident", &command.resident_id))?;
        if resident.status != ResidentStatus::Approved {
            return Err(DomainError::validation("Only approved residents can reserve amenities"));
        }

        let slot = TimeSlot::new(command.start_time, command.end_time)?;
        if !slot.within(amenity.open_time, amenity.close_time) {
            return Err(DomainError::validation(format!(
                "{} is open {}-{}",
                amenity.name,
                amenity.open_time.format(TIME_FORMAT),
                amenity.close_time.format(TIME_FORMAT)
            )));
        }
        if slot.minutes() > i64::from(amenity.max_hours_per_booking) * 60 {
            return Err(DomainError::validation(format!(
                "{} can be booked for at most {} hour(s)",
                amenity.name, amenity.max_hours_per_booking
            )));
        }

        let today = now.date_naive();
        if command.date < today {
            return Err(DomainError::validation("Cannot reserve a date in the past"));
        }
        if command.date > today + Duration::days(self.settings.max_days_ahead) {
            return Err(DomainError::validation(format!(
                "Reservations open at most {} days ahead",
                self.settings.max_days_ahead
            )));
        }

        let purpose = match command.purpose.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) if p.chars().count() > MAX_PURPOSE_LEN => {
                return Err(DomainError::validation(format!(
                    "Purpose cannot exceed {} characters",
                    MAX_PURPOSE_LEN
                )))
            }
            other => other.map(str::to_string),
        };

        let fee_cents = amenity
            .fee_for_minutes(slot.minutes())
            .ok_or_else(|| DomainError::validation(format!("Fee for {} is out of range", amenity.name)))?;
        let (status, hold_expires_at) = if fee_cents == 0 {
            (ReservationStatus::Confirmed, None)
        } else {
            (ReservationStatus::Held, Some(now + Duration::minutes(self.settings.hold_minutes)))
        };

        let reservation = Reservation {
            id: generate_id("reservation"),
            amenity_id: amenity.id.clone(),
            resident_id: resident.id.clone(),
            date: command.date,
            slot,
            status,
            fee_cents,
            hold_expires_at,
            purpose,
            created_at: now,
            updated_at: now,
        };

        let _guard = self.booking_lock.lock().await;
        if let Some(existing) = self.reservation_repository.store_if_free(&reservation, now).await? {
            warn!("Slot conflict for {} on {}: held by {}", amenity.name, command.date, existing);
            return Err(DomainError::conflict(format!(
                "{} is already booked on {} between {} and {}",
                amenity.name,
                command.date,
                slot.start.format(TIME_FORMAT),
                slot.end.format(TIME_FORMAT)
            )));
        }

        info!(
            "Created reservation {} ({}), fee={}",
            reservation.id,
            reservation.status.as_str(),
            reservation.fee_cents
        );
        Ok(reservation)
    }

    pub async fn confirm(&self, reservation_id: &str) -> DomainResult<Reservation> {
        self.confirm_at(reservation_id, Utc::now()).await
    }

    pub async fn confirm_at(&self, reservation_id: &str, now: DateTime<Utc>) -> DomainResult<Reservation> {
        info!("Confirming reservation: {}", reservation_id);
        let reservation = self.get_reservation(reservation_id).await?;

        match reservation.status {
            ReservationStatus::Confirmed => {
                return Err(DomainError::validation("Reservation is already confirmed"));
            }
            ReservationStatus::Cancelled => {
                return Err(DomainError::validation("Reservation has been cancelled"));
            }
            ReservationStatus::Held if reservation.hold_expired(now) => {
                return Err(DomainError::conflict("hold expired"));
            }
            ReservationStatus::Held => {}
        }

        if !self.reservation_repository.confirm_hold(reservation_id, now).await? {
            // Expired or swept between the read and the update
            return Err(DomainError::conflict("hold expired"));
        }
        self.get_reservation(reservation_id).await
    }

    pub async fn cancel(&self, reservation_id: &str) -> DomainResult<Reservation> {
        self.cancel_at(reservation_id, Utc::now()).await
    }

    pub async fn cancel_at(&self, reservation_id: &str, now: DateTime<Utc>) -> DomainResult<Reservation> {
        info!("Cancelling reservation: {}", reservation_id);
        let reservation = self.get_reservation(reservation_id).await?;
        if reservation.status == ReservationStatus::Cancelled {
            return Err(DomainError::validation("Reservation is already cancelled"));
        }

        if !self.reservation_repository.cancel(reservation_id, now).await? {
            return Err(DomainError::validation("Reservation is already cancelled"));
        }
        self.get_reservation(reservation_id).await
    }

    pub async fn get_reservation(&self, reservation_id: &str) -> DomainResult<Reservation> {
        self.reservation_repository
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Reservation", reservation_id))
    }

    pub async fn list_reservations(&self, filter: ReservationFilter) -> DomainResult<Vec<Reservation>> {
        let reservations = self.reservation_repository.list_reservations(&filter).await?;
        debug!("Found {} reservations for {:?}", reservations.len(), filter);
        Ok(reservations)
    }

    pub async fn availability(&self, amenity_id: &str, date: NaiveDate) -> DomainResult<Availability> {
        self.availability_at(amenity_id, date, Utc::now()).await
    }

    /// Blocking reservations and free windows for one amenity on one date
    pub async fn availability_at(&self, amenity_id: &str, date: NaiveDate, now: DateTime<Utc>) -> DomainResult<Availability> {
        let amenity = self
            .amenity_repository
            .get_amenity(amenity_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Amenity", amenity_id))?;

        let filter = ReservationFilter {
            amenity_id: Some(amenity.id.clone()),
            date: Some(date),
            ..Default::default()
        };
        let booked: Vec<Reservation> = self
            .reservation_repository
            .list_reservations(&filter)
            .await?
            .into_iter()
            .filter(|r| r.blocks_slot(now))
            .collect();

        let index = SlotIndex::from_slots(booked.iter().map(|r| (r.slot, ())));
        let free = index.free_windows(amenity.open_time, amenity.close_time);

        Ok(Availability {
            amenity_id: amenity.id,
            date,
            open_time: amenity.open_time,
            close_time: amenity.close_time,
            booked,
            free,
        })
    }

    pub async fn release_expired_holds(&self) -> DomainResult<u64> {
        self.release_expired_holds_at(Utc::now()).await
    }

    pub async fn release_expired_holds_at(&self, now: DateTime<Utc>) -> DomainResult<u64> {
        let released = self.reservation_repository.release_expired_holds(now).await?;
        if released > 0 {
            info!("Released {} expired hold(s)", released);
        }
        Ok(released)
    }

    /// Run `release_expired_holds` every `sweep_interval_secs` until the runtime stops
    pub fn spawn_hold_sweeper(&self) -> JoinHandle<()> {
        let service = self.clone();
        let period = std::time::Duration::from_secs(self.settings.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = service.release_expired_holds().await {
                    error!("Failed to release expired holds: {}", e);
                }
            }
        })
    }
}
