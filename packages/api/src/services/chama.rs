use std::rc::Rc;

use super::{degrade, fail, HandleCache};
use crate::error::ServiceError;
use crate::models::{Chama, ChamaFilter, MemberRole, NewChama, Principal};
use crate::remote::ChamaRegistry;

#[derive(Clone)]
pub struct ChamaService {
    handle: Rc<HandleCache<dyn ChamaRegistry>>,
}

impl ChamaService {
    pub(crate) fn new(handle: HandleCache<dyn ChamaRegistry>) -> Self {
        Self {
            handle: Rc::new(handle),
        }
    }

    pub fn reset(&self) {
        self.handle.reset();
    }

    pub async fn create_chama(&self, chama: &NewChama) -> Result<Chama, ServiceError> {
        async { self.handle.get()?.create_chama(chama).await }
            .await
            .map_err(|e| fail("Chama creation failed", e))
    }

    pub async fn get_chama_by_id(&self, chama_id: &str) -> Option<Chama> {
        degrade(
            "Failed to get chama by ID",
            async { self.handle.get()?.get_chama(chama_id).await }.await,
        )
    }

    pub async fn update_chama(&self, chama_id: &str, chama: &Chama) -> Result<Chama, ServiceError> {
        async { self.handle.get()?.update_chama(chama_id, chama).await }
            .await
            .map_err(|e| fail("Chama update failed", e))
    }

    pub async fn join_chama(&self, chama_id: &str) -> Result<Chama, ServiceError> {
        async { self.handle.get()?.join_chama(chama_id).await }
            .await
            .map_err(|e| fail("Failed to join chama", e))
    }

    pub async fn add_member(&self, chama_id: &str, user: &Principal) -> Result<Chama, ServiceError> {
        async { self.handle.get()?.add_member(chama_id, user).await }
            .await
            .map_err(|e| fail("Failed to add member", e))
    }

    pub async fn remove_member(
        &self,
        chama_id: &str,
        user: &Principal,
    ) -> Result<Chama, ServiceError> {
        async { self.handle.get()?.remove_member(chama_id, user).await }
            .await
            .map_err(|e| fail("Failed to remove member", e))
    }

    pub async fn update_member_role(
        &self,
        chama_id: &str,
        user: &Principal,
        role: MemberRole,
    ) -> Result<Chama, ServiceError> {
        async { self.handle.get()?.update_member_role(chama_id, user, role).await }
            .await
            .map_err(|e| fail("Failed to update member role", e))
    }

    /// Fails with a fixed message; the chama list shows it with a retry button.
    pub async fn get_my_chamas(&self) -> Result<Vec<Chama>, ServiceError> {
        async { self.handle.get()?.get_my_chamas().await }
            .await
            .map_err(|e| {
                tracing::error!("Failed to get my chamas: {}", e);
                ServiceError::Failed("Failed to retrieve your chamas")
            })
    }

    /// Fails with a fixed message; the chama list shows it with a retry button.
    pub async fn get_chamas_by_creator(
        &self,
        creator: &Principal,
    ) -> Result<Vec<Chama>, ServiceError> {
        async { self.handle.get()?.get_chamas_by_creator(creator).await }
            .await
            .map_err(|e| {
                tracing::error!("Failed to get chamas by creator: {}", e);
                ServiceError::Failed("Failed to retrieve created chamas")
            })
    }

    pub async fn get_chamas_by_member(&self, member: &Principal) -> Vec<Chama> {
        degrade(
            "Failed to get chamas by member",
            async { self.handle.get()?.get_chamas_by_member(member).await }.await,
        )
    }

    /// Fails with a fixed message; the discovery page shows it with a retry button.
    pub async fn get_public_chamas(
        &self,
        filter: Option<&ChamaFilter>,
    ) -> Result<Vec<Chama>, ServiceError> {
        async { self.handle.get()?.get_public_chamas(filter).await }
            .await
            .map_err(|e| {
                tracing::error!("Failed to get public chamas: {}", e);
                ServiceError::Failed("Failed to retrieve public chamas")
            })
    }

    pub async fn search_chamas(&self, query: &str) -> Vec<Chama> {
        degrade(
            "Chama search failed",
            async { self.handle.get()?.search_chamas(query).await }.await,
        )
    }

    pub async fn get_chama_count(&self) -> u64 {
        degrade(
            "Failed to get chama count",
            async { self.handle.get()?.get_chama_count().await }.await,
        )
    }

    pub async fn health_check(&self) -> String {
        async { self.handle.get()?.health_check().await }
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Chama service health check failed: {}", e);
                "Service unavailable".to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::signed_in;
    use crate::error::{ChamaError, ServiceError};
    use crate::models::{ChamaType, ContributionFrequency, NewChama};

    fn draft() -> NewChama {
        NewChama {
            name: "Umoja Savings".into(),
            description: "Monthly savings for the estate".into(),
            contribution_amount: 5_000,
            contribution_frequency: ContributionFrequency::Monthly,
            chama_type: ChamaType::Savings,
            max_members: 20,
            is_public: true,
            require_approval: true,
            enable_ai: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (_, identity, services) = signed_in("aaaaa-aa");
        let chama = services.chamas.create_chama(&draft()).await.unwrap();
        assert_eq!(chama.name, "Umoja Savings");

        let me = crate::identity::IdentityProvider::principal(identity.as_ref()).unwrap();
        assert_eq!(services.chamas.get_my_chamas().await.unwrap().len(), 1);
        assert_eq!(services.chamas.get_chamas_by_creator(&me).await.unwrap().len(), 1);
        assert_eq!(services.chamas.get_chama_count().await, 1);
        assert_eq!(
            services.chamas.get_chama_by_id(&chama.id).await.map(|c| c.id),
            Some(chama.id.clone())
        );
    }

    #[tokio::test]
    async fn test_tagged_errors_become_messages() {
        let (_, _, services) = signed_in("aaaaa-aa");
        let err = services.chamas.join_chama("missing").await.unwrap_err();
        assert_eq!(err, ServiceError::Chama(ChamaError::NotFound));
        assert_eq!(err.to_string(), "Chama not found");
    }

    #[tokio::test]
    async fn test_list_failures_use_fixed_messages() {
        let (backend, _, services) = signed_in("aaaaa-aa");
        backend.set_offline(true);
        assert_eq!(
            services.chamas.get_my_chamas().await.unwrap_err().to_string(),
            "Failed to retrieve your chamas"
        );
        assert_eq!(
            services
                .chamas
                .get_public_chamas(None)
                .await
                .unwrap_err()
                .to_string(),
            "Failed to retrieve public chamas"
        );
        assert!(services.chamas.search_chamas("umoja").await.is_empty());
        assert_eq!(services.chamas.get_chama_by_id("x").await, None);
    }
}
