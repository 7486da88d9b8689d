use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::commands::resident::{SignUpCommand, UpdateResidentCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::generate_id;
use crate::domain::models::lot::LotStatus;
use crate::domain::models::resident::{Resident, ResidentStatus};
use crate::domain::validation::{normalize_email, normalize_phone, required_text, MAX_NAME_LEN};
use crate::storage::connection::is_unique_violation;
use crate::storage::{DbConnection, LotRepository, ResidentRepository};

/// Service for resident sign-up and lifecycle
#[derive(Clone)]
pub struct ResidentService {
    resident_repository: ResidentRepository,
    lot_repository: LotRepository,
    // Serialises approvals and deactivations that change lot occupancy
    occupancy_lock: Arc<Mutex<()>>,
}

impl ResidentService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            resident_repository: ResidentRepository::new(db.clone()),
            lot_repository: LotRepository::new(db),
            occupancy_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Register a new resident awaiting admin approval
    pub async fn sign_up(&self, command: SignUpCommand) -> DomainResult<Resident> {
        info!("Resident sign-up: email={}", command.email);

        let first_name = required_text("First name", &command.first_name, MAX_NAME_LEN)?;
        let last_name = required_text("Last name", &command.last_name, MAX_NAME_LEN)?;
        let email = normalize_email(&command.email)?;
        let phone = normalize_phone(&command.phone)?;

        if let Some(lot_id) = &command.lot_id {
            if self.lot_repository.get_lot(lot_id).await?.is_none() {
                return Err(DomainError::not_found("Lot", lot_id));
            }
        }

        let now = Utc::now();
        let resident = Resident {
            id: generate_id("resident"),
            first_name,
            last_name,
            email,
            phone,
            lot_id: command.lot_id,
            is_household_head: command.is_household_head,
            status: ResidentStatus::Pending,
            move_in_date: command.move_in_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
        };

        self.resident_repository
            .store_resident(&resident)
            .await
            .map_err(|e| email_conflict(e, &resident.email))?;

        info!("Created resident {} with ID: {}", resident.full_name(), resident.id);
        Ok(resident)
    }

    pub async fn get_resident(&self, resident_id: &str) -> DomainResult<Resident> {
        self.resident_repository
            .get_resident(resident_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Resident", resident_id))
    }

    pub async fn list_residents(&self, status: Option<ResidentStatus>) -> DomainResult<Vec<Resident>> {
        let residents = self.resident_repository.list_residents(status).await?;
        info!("Found {} residents (filter: {:?})", residents.len(), status);
        Ok(residents)
    }

    pub async fn update_resident(&self, resident_id: &str, command: UpdateResidentCommand) -> DomainResult<Resident> {
        info!("Updating resident: {}", resident_id);
        let mut resident = self.get_resident(resident_id).await?;

        if let Some(first_name) = command.first_name {
            resident.first_name = required_text("First name", &first_name, MAX_NAME_LEN)?;
        }
        if let Some(last_name) = command.last_name {
            resident.last_name = required_text("Last name", &last_name, MAX_NAME_LEN)?;
        }
        if let Some(email) = command.email {
            resident.email = normalize_email(&email)?;
        }
        if let Some(phone) = command.phone {
            resident.phone = normalize_phone(&phone)?;
        }
        resident.updated_at = Utc::now();

        self.resident_repository
            .update_resident(&resident)
            .await
            .map_err(|e| email_conflict(e, &resident.email))?;
        Ok(resident)
    }

    /// Approve a pending, rejected or inactive resident
    ///
    /// A lot has at most one approved household head. Approving a resident
    /// onto a vacant lot marks the lot occupied.
    pub async fn approve(&self, resident_id: &str) -> DomainResult<Resident> {
        info!("Approving resident: {}", resident_id);
        let _guard = self.occupancy_lock.lock().await;
        let mut resident = self.get_resident(resident_id).await?;

        if resident.status == ResidentStatus::Approved {
            return Err(DomainError::validation(format!("Resident {} is already approved", resident_id)));
        }

        let mut occupy_lot = None;
        if let Some(lot_id) = resident.lot_id.clone() {
            let lot = self
                .lot_repository
                .get_lot(&lot_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Lot", &lot_id))?;

            if resident.is_household_head {
                let occupants = self.resident_repository.list_by_lot(&lot_id).await?;
                if let Some(head) = occupants
                    .iter()
                    .find(|r| r.id != resident.id && r.is_billable())
                {
                    warn!("Lot {} already has household head {}", lot_id, head.id);
                    return Err(DomainError::conflict(format!(
                        "{} already has an approved household head",
                        lot.label()
                    )));
                }
            }

            if lot.status == LotStatus::Vacant {
                occupy_lot = Some((lot_id, lot.label()));
            }
        }

        resident.status = ResidentStatus::Approved;
        resident.updated_at = Utc::now();
        self.resident_repository
            .approve_resident(&resident, occupy_lot.as_ref().map(|(id, _)| id.as_str()))
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::conflict("Lot already has an approved household head")
                } else {
                    DomainError::Storage(e)
                }
            })?;

        if let Some((_, label)) = occupy_lot {
            info!("Lot {} is now occupied", label);
        }
        Ok(resident)
    }

    pub async fn reject(&self, resident_id: &str) -> DomainResult<Resident> {
        info!("Rejecting resident: {}", resident_id);
        let mut resident = self.get_resident(resident_id).await?;

        if resident.status != ResidentStatus::Pending {
            return Err(DomainError::validation("Only pending residents can be rejected"));
        }

        resident.status = ResidentStatus::Rejected;
        resident.updated_at = Utc::now();
        self.resident_repository.update_resident(&resident).await?;
        Ok(resident)
    }

    /// Deactivate an approved resident, vacating the lot if nobody remains
    pub async fn deactivate(&self, resident_id: &str) -> DomainResult<Resident> {
        info!("Deactivating resident: {}", resident_id);
        let _guard = self.occupancy_lock.lock().await;
        let mut resident = self.get_resident(resident_id).await?;

        if resident.status != ResidentStatus::Approved {
            return Err(DomainError::validation("Only approved residents can be deactivated"));
        }

        resident.status = ResidentStatus::Inactive;
        resident.updated_at = Utc::now();
        self.resident_repository.update_resident(&resident).await?;

        if let Some(lot_id) = &resident.lot_id {
            let remaining = self.resident_repository.list_by_lot(lot_id).await?;
            let still_occupied = remaining.iter().any(|r| r.status == ResidentStatus::Approved);
            if !still_occupied {
                if let Some(lot) = self.lot_repository.get_lot(lot_id).await? {
                    if lot.status == LotStatus::Occupied {
                        self.lot_repository
                            .update_status(lot_id, LotStatus::Vacant, Utc::now())
                            .await?;
                        info!("Lot {} is now vacant", lot.label());
                    }
                }
            }
        }

        Ok(resident)
    }
}

fn email_conflict(err: anyhow::Error, email: &str) -> DomainError {
    if is_unique_violation(&err) {
        DomainError::conflict(format!("A resident with email {} already exists", email))
    } else {
        DomainError::Storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::lot::CreateLotCommand;
    use crate::domain::lot_service::LotService;
    use crate::domain::models::lot::MapGeometry;
    use chrono::NaiveDate;

    fn sign_up(email: &str, lot_id: Option<&str>, head: bool) -> SignUpCommand {
        SignUpCommand {
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            email: email.to_string(),
            phone: "(555) 123-4567".to_string(),
            lot_id: lot_id.map(str::to_string),
            is_household_head: head,
            move_in_date: Some(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()),
        }
    }

    async fn setup() -> (ResidentService, LotService, String) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let lots = LotService::new(db.clone());
        let lot = lots
            .create_lot(CreateLotCommand {
                block: "1".into(),
                lot_number: "1".into(),
                area_sqm: 100.0,
                status: LotStatus::Vacant,
                geometry: MapGeometry { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
            })
            .await
            .unwrap();
        (ResidentService::new(db), lots, lot.id)
    }

    #[tokio::test]
    async fn test_sign_up_normalizes_and_starts_pending() {
        let (service, _, lot_id) = setup().await;
        let resident = service.sign_up(sign_up(" Ana@Example.com ", Some(&lot_id), true)).await.unwrap();

        assert_eq!(resident.status, ResidentStatus::Pending);
        assert_eq!(resident.email, "ana@example.com");
        assert_eq!(resident.phone, "5551234567");
        assert_eq!(resident.billing_start().month, 3);
        assert!(!resident.is_billable());
    }

    #[tokio::test]
    async fn test_sign_up_rejects_duplicate_email_and_unknown_lot() {
        let (service, _, _) = setup().await;
        service.sign_up(sign_up("ana@example.com", None, true)).await.unwrap();

        let duplicate = service.sign_up(sign_up("ANA@example.com", None, false)).await;
        assert!(matches!(duplicate, Err(DomainError::Conflict(_))));

        let unknown_lot = service.sign_up(sign_up("other@example.com", Some("lot::nope"), true)).await;
        assert!(matches!(unknown_lot, Err(DomainError::NotFound(_))));

        let bad_email = service.sign_up(sign_up("not-an-email", None, true)).await;
        assert!(matches!(bad_email, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_occupies_lot_and_blocks_second_head() {
        let (service, lots, lot_id) = setup().await;
        let first = service.sign_up(sign_up("a@example.com", Some(&lot_id), true)).await.unwrap();
        let second = service.sign_up(sign_up("b@example.com", Some(&lot_id), true)).await.unwrap();
        let member = service.sign_up(sign_up("c@example.com", Some(&lot_id), false)).await.unwrap();

        let approved = service.approve(&first.id).await.unwrap();
        assert!(approved.is_billable());
        assert_eq!(lots.get_lot(&lot_id).await.unwrap().status, LotStatus::Occupied);

        assert!(matches!(service.approve(&second.id).await, Err(DomainError::Conflict(_))));
        // Non-head household members are not limited
        service.approve(&member.id).await.unwrap();

        assert!(matches!(service.approve(&first.id).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_head_approvals_yield_one_success() {
        for _ in 0..10 {
            let (service, lots, lot_id) = setup().await;
            let first = service.sign_up(sign_up("a@example.com", Some(&lot_id), true)).await.unwrap();
            let second = service.sign_up(sign_up("b@example.com", Some(&lot_id), true)).await.unwrap();

            let a = service.clone();
            let b = service.clone();
            let (x, y) = tokio::join!(
                tokio::spawn(async move { a.approve(&first.id).await }),
                tokio::spawn(async move { b.approve(&second.id).await }),
            );
            let results = [x.unwrap(), y.unwrap()];

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results.iter().any(|r| matches!(r, Err(DomainError::Conflict(_)))));

            let heads = service
                .list_residents(Some(ResidentStatus::Approved))
                .await
                .unwrap()
                .into_iter()
                .filter(|r| r.is_household_head)
                .count();
            assert_eq!(heads, 1);
            assert_eq!(lots.get_lot(&lot_id).await.unwrap().status, LotStatus::Occupied);
        }
    }

    #[tokio::test]
    async fn test_deactivate_last_resident_vacates_lot() {
        let (service, lots, lot_id) = setup().await;
        let head = service.sign_up(sign_up("a@example.com", Some(&lot_id), true)).await.unwrap();
        let member = service.sign_up(sign_up("b@example.com", Some(&lot_id), false)).await.unwrap();
        service.approve(&head.id).await.unwrap();
        service.approve(&member.id).await.unwrap();

        service.deactivate(&head.id).await.unwrap();
        assert_eq!(lots.get_lot(&lot_id).await.unwrap().status, LotStatus::Occupied);

        let inactive = service.deactivate(&member.id).await.unwrap();
        assert_eq!(inactive.status, ResidentStatus::Inactive);
        assert_eq!(lots.get_lot(&lot_id).await.unwrap().status, LotStatus::Vacant);
    }

    #[tokio::test]
    async fn test_reject_only_pending() {
        let (service, _, _) = setup().await;
        let resident = service.sign_up(sign_up("a@example.com", None, true)).await.unwrap();

        let rejected = service.reject(&resident.id).await.unwrap();
        assert_eq!(rejected.status, ResidentStatus::Rejected);
        assert!(matches!(service.reject(&resident.id).await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_contact_details() {
        let (service, _, _) = setup().await;
        let resident = service.sign_up(sign_up("a@example.com", None, true)).await.unwrap();
        service.sign_up(sign_up("taken@example.com", None, true)).await.unwrap();

        let updated = service
            .update_resident(
                &resident.id,
                UpdateResidentCommand {
                    phone: Some("+1 555 000 1111".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone, "+15550001111");
        assert_eq!(updated.first_name, "Ana");

        let clash = service
            .update_resident(
                &resident.id,
                UpdateResidentCommand {
                    email: Some("taken@example.com".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(DomainError::Conflict(_))));
    }
}
