use tracing::{info, warn};

use crate::domain::error::DomainResult;
use crate::storage::repositories::admin_access_repository::AdminAccessAttempt;
use crate::storage::{AdminAccessRepository, DbConnection};

/// Outcome of checking an admin key
#[derive(Debug, Clone, PartialEq)]
pub struct AdminVerifyResult {
    pub success: bool,
    pub message: String,
}

/// Statistics over recorded admin key checks
#[derive(Debug, Clone, PartialEq)]
pub struct AccessStats {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub failed_attempts: usize,
    pub success_rate: f64, // Percentage
}

/// Service guarding the admin endpoints
#[derive(Clone)]
pub struct AdminAccessService {
    admin_access_repository: AdminAccessRepository,
    access_key: String,
}

impl AdminAccessService {
    pub fn new(db: DbConnection, access_key: String) -> Self {
        Self {
            admin_access_repository: AdminAccessRepository::new(db),
            access_key,
        }
    }

    /// Check `key` against the configured access key and record the attempt
    pub async fn verify(&self, key: &str) -> DomainResult<AdminVerifyResult> {
        let success = !self.access_key.is_empty() && key == self.access_key;

        match self.admin_access_repository.record_attempt(success).await {
            Ok(attempt_id) => info!("Recorded admin access attempt with ID: {}", attempt_id),
            Err(e) => warn!("Failed to record admin access attempt: {}", e),
        }

        let result = if success {
            AdminVerifyResult {
                success: true,
                message: "Access granted.".to_string(),
            }
        } else {
            warn!("Admin access denied");
            AdminVerifyResult {
                success: false,
                message: "Invalid admin key. Access denied.".to_string(),
            }
        };
        Ok(result)
    }

    pub async fn recent_attempts(&self, limit: Option<u32>) -> DomainResult<Vec<AdminAccessAttempt>> {
        Ok(self.admin_access_repository.list_attempts(limit).await?)
    }

    pub async fn attempt_stats(&self) -> DomainResult<AccessStats> {
        let attempts = self.admin_access_repository.list_attempts(None).await?;

        let total_attempts = attempts.len();
        let successful_attempts = attempts.iter().filter(|a| a.success).count();
        let failed_attempts = total_attempts - successful_attempts;
        let success_rate = if total_attempts > 0 {
            (successful_attempts as f64 / total_attempts as f64) * 100.0
        } else {
            0.0
        };

        Ok(AccessStats {
            total_attempts,
            successful_attempts,
            failed_attempts,
            success_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> AdminAccessService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        AdminAccessService::new(db, "s3cret".to_string())
    }

    #[tokio::test]
    async fn test_verify_is_exact() {
        let service = setup().await;
        assert!(service.verify("s3cret").await.unwrap().success);
        assert!(!service.verify("S3CRET").await.unwrap().success);
        assert!(!service.verify(" s3cret").await.unwrap().success);
        assert!(!service.verify("").await.unwrap().success);
    }

    #[tokio::test]
    async fn test_empty_configured_key_never_matches() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = AdminAccessService::new(db, String::new());
        assert!(!service.verify("").await.unwrap().success);
    }

    #[tokio::test]
    async fn test_attempt_stats() {
        let service = setup().await;
        let initial = service.attempt_stats().await.unwrap();
        assert_eq!(initial.total_attempts, 0);
        assert_eq!(initial.success_rate, 0.0);

        for key in ["s3cret", "nope", "s3cret", "s3cret", "wrong"] {
            service.verify(key).await.unwrap();
        }

        let stats = service.attempt_stats().await.unwrap();
        assert_eq!(stats.total_attempts, 5);
        assert_eq!(stats.successful_attempts, 3);
        assert_eq!(stats.failed_attempts, 2);
        assert_eq!(stats.success_rate, 60.0);

        let recent = service.recent_attempts(Some(2)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(!recent[0].success);
    }
}
