use std::rc::Rc;

use super::{degrade, fail, HandleCache};
use crate::error::ServiceError;
use crate::models::{Principal, User, UserFilter, UserStats, VerificationLevel};
use crate::remote::UserRegistry;

#[derive(Clone)]
pub struct UserService {
    handle: Rc<HandleCache<dyn UserRegistry>>,
}

impl UserService {
    pub(crate) fn new(handle: HandleCache<dyn UserRegistry>) -> Self {
        Self {
            handle: Rc::new(handle),
        }
    }

    pub fn reset(&self) {
        self.handle.reset();
    }

    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<User, ServiceError> {
        async { self.handle.get()?.register_user(name, email, phone).await }
            .await
            .map_err(|e| fail("User registration failed", e))
    }

    /// The signed-in user's profile, `None` when absent or unreachable.
    pub async fn get_current_user(&self) -> Option<User> {
        degrade(
            "Failed to get current user",
            async { self.handle.get()?.get_my_profile().await }.await,
        )
    }

    /// Like [`Self::get_current_user`] but keeps failures apart from a missing profile.
    pub async fn try_get_current_user(&self) -> Result<Option<User>, ServiceError> {
        async { self.handle.get()?.get_my_profile().await }
            .await
            .map_err(ServiceError::from)
    }

    pub async fn get_user_by_id(&self, user: &Principal) -> Option<User> {
        degrade(
            "Failed to get user by ID",
            async { self.handle.get()?.get_user_profile(user).await }.await,
        )
    }

    pub async fn update_profile(
        &self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<User, ServiceError> {
        async { self.handle.get()?.update_profile(name, email, phone).await }
            .await
            .map_err(|e| fail("Profile update failed", e))
    }

    pub async fn verify_user(&self, level: VerificationLevel) -> Result<User, ServiceError> {
        async { self.handle.get()?.verify_user(level).await }
            .await
            .map_err(|e| fail("User verification failed", e))
    }

    pub async fn get_user_stats(&self) -> Option<UserStats> {
        degrade(
            "Failed to get user stats",
            async { self.handle.get()?.get_my_stats().await }.await,
        )
    }

    pub async fn search_users(&self, query: &str) -> Vec<User> {
        degrade(
            "User search failed",
            async { self.handle.get()?.search_users(query).await }.await,
        )
    }

    pub async fn get_all_users(&self, filter: Option<&UserFilter>) -> Vec<User> {
        degrade(
            "Failed to get all users",
            async { self.handle.get()?.get_all_users(filter).await }.await,
        )
    }

    pub async fn get_user_count(&self) -> u64 {
        degrade(
            "Failed to get user count",
            async { self.handle.get()?.get_user_count().await }.await,
        )
    }

    pub async fn add_chama_to_user(&self, user: &Principal, chama_id: &str) -> bool {
        degrade(
            "Failed to add chama to user",
            async { self.handle.get()?.add_chama_to_user(user, chama_id).await }.await,
        )
    }

    pub async fn health_check(&self) -> String {
        async { self.handle.get()?.health_check().await }
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("User service health check failed: {}", e);
                "Service unavailable".to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::signed_in;
    use crate::error::{ServiceError, UserError};
    use crate::models::VerificationLevel;

    #[tokio::test]
    async fn test_register_and_verify() {
        let (_, _, services) = signed_in("aaaaa-aa");
        let user = services
            .users
            .register_user("Akinyi", "akinyi@example.com", "+254712345678")
            .await
            .unwrap();
        assert_eq!(user.name, "Akinyi");

        let verified = services
            .users
            .verify_user(VerificationLevel::Intermediate)
            .await
            .unwrap();
        assert!(verified.is_verified);
        assert_eq!(verified.verification_level, VerificationLevel::Intermediate);
    }

    #[tokio::test]
    async fn test_duplicate_registration_message() {
        let (_, _, services) = signed_in("aaaaa-aa");
        services
            .users
            .register_user("Akinyi", "akinyi@example.com", "+254712345678")
            .await
            .unwrap();
        let err = services
            .users
            .register_user("Akinyi", "akinyi@example.com", "+254712345678")
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::User(UserError::AlreadyExists));
        assert!(err.to_string().starts_with("This email address is already registered"));
    }

    #[tokio::test]
    async fn test_reads_degrade_when_offline() {
        let (backend, _, services) = signed_in("aaaaa-aa");
        backend.set_offline(true);
        assert_eq!(services.users.get_current_user().await, None);
        assert!(services.users.search_users("a").await.is_empty());
        assert_eq!(services.users.get_user_count().await, 0);
        assert_eq!(services.users.health_check().await, "Service unavailable");
        assert!(services.users.try_get_current_user().await.is_err());
    }
}
