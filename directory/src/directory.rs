use crate::admin;
use crate::cache::QueryCache;
use crate::cache::QueryKey;
use crate::catalog;
use crate::error::Result;
use crate::models::AuthState;
use crate::models::CostEntry;
use crate::models::PointReward;
use crate::models::Review;
use crate::models::UserProfile;
use crate::models::UserReview;
use crate::models::Vendor;
use crate::models::VendorId;
use crate::user_state;
use indexmap::IndexMap;
use indexmap::IndexSet;
use neighborly_backend::AuthUser;
use neighborly_backend::Backend;
use neighborly_backend::procedures;
use neighborly_formatters::Category;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub const USER_COST_VENDORS: &str = "user_cost_vendors";
pub const USER_HOME_VENDORS: &str = "user_home_vendors";
pub const USER_REVIEWS: &str = "user_reviews";
pub const USER_PROFILE: &str = "user_profile";
pub const VENDOR_COSTS: &str = "vendor_costs";
pub const VENDOR_REVIEWS: &str = "vendor_reviews";
pub const POINT_REWARDS: &str = "point_rewards";
pub const VENDORS: &str = "vendors";

const USER_SCOPED: &[&str] = &[
    USER_COST_VENDORS,
    USER_HOME_VENDORS,
    USER_REVIEWS,
    USER_PROFILE,
    procedures::IS_ADMIN,
    procedures::IS_USER_HOA_ADMIN,
];

/// Cached entry point over a [`Backend`].
///
/// Results are keyed by query name and parameters (the user id for
/// user-scoped lookups), so repeated and concurrent reads of the same
/// key share one request.
#[derive(Clone)]
pub struct Directory {
    backend: Arc<dyn Backend>,
    cache: Arc<QueryCache>,
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directory")
            .field("cached", &self.cache.cached_len())
            .finish_non_exhaustive()
    }
}

impl Directory {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_cache(backend, QueryCache::default())
    }

    pub fn with_cache(backend: Arc<dyn Backend>, cache: QueryCache) -> Self {
        Self {
            backend,
            cache: Arc::new(cache),
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub async fn current_user(&self) -> Result<Option<AuthUser>> {
        user_state::session_user(self.backend()).await
    }

    pub async fn user_cost_vendors(&self) -> Result<IndexMap<VendorId, bool>> {
        let Some(user) = self.current_user().await? else {
            return Ok(IndexMap::new());
        };
        let backend = self.backend();
        self.cache
            .fetch(user_key(USER_COST_VENDORS, &user), || {
                user_state::cost_vendors_for(backend, &user)
            })
            .await
    }

    pub async fn user_home_vendors(&self) -> Result<IndexSet<VendorId>> {
        let Some(user) = self.current_user().await? else {
            return Ok(IndexSet::new());
        };
        let backend = self.backend();
        self.cache
            .fetch(user_key(USER_HOME_VENDORS, &user), || {
                user_state::home_vendors_for(backend, &user)
            })
            .await
    }

    pub async fn user_reviews(&self) -> Result<IndexMap<VendorId, UserReview>> {
        let Some(user) = self.current_user().await? else {
            return Ok(IndexMap::new());
        };
        let backend = self.backend();
        self.cache
            .fetch(user_key(USER_REVIEWS, &user), || {
                user_state::reviews_for(backend, &user)
            })
            .await
    }

    pub async fn vendor_costs(&self, vendor_id: &str) -> Result<Vec<CostEntry>> {
        let backend = self.backend();
        self.cache
            .fetch(QueryKey::new(VENDOR_COSTS, [vendor_id]), || {
                catalog::vendor_costs(backend, vendor_id)
            })
            .await
    }

    pub async fn vendor_reviews(&self, vendor_id: &str) -> Result<Vec<Review>> {
        let backend = self.backend();
        self.cache
            .fetch(QueryKey::new(VENDOR_REVIEWS, [vendor_id]), || {
                catalog::vendor_reviews(backend, vendor_id)
            })
            .await
    }

    pub async fn point_rewards(&self) -> Result<Vec<PointReward>> {
        let backend = self.backend();
        self.cache
            .fetch(QueryKey::new(POINT_REWARDS, Vec::<String>::new()), || {
                catalog::point_rewards(backend)
            })
            .await
    }

    pub async fn vendors(&self, category: Option<Category>) -> Result<Vec<Vendor>> {
        let backend = self.backend();
        let params: Vec<String> = category.iter().map(|c| c.label().to_string()).collect();
        self.cache
            .fetch(QueryKey::new(VENDORS, params), || {
                catalog::vendors(backend, category)
            })
            .await
    }

    /// Profile of the signed-in user; failures read as `None`.
    pub async fn user_profile(&self) -> Option<UserProfile> {
        let user = self.user_or_warn().await?;
        self.profile_of(&user).await
    }

    pub async fn auth_state(&self) -> AuthState {
        let Some(user) = self.user_or_warn().await else {
            return AuthState::default();
        };
        let profile = self.profile_of(&user).await;
        AuthState {
            is_logged_in: true,
            is_verified: profile.as_ref().is_some_and(|p| p.is_verified),
            profile,
        }
    }

    pub async fn is_admin(&self) -> bool {
        self.flag(procedures::IS_ADMIN).await
    }

    pub async fn is_hoa_admin(&self) -> bool {
        self.flag(procedures::IS_USER_HOA_ADMIN).await
    }

    /// Not cached; each call re-runs the backfill.
    pub async fn backfill_google_ratings(&self) -> Result<Value> {
        let result = admin::backfill_google_ratings(self.backend()).await?;
        self.cache.clear();
        Ok(result)
    }

    /// Forget everything cached for one user, e.g. after they submit a
    /// review or cost entry.
    pub fn invalidate_user(&self, user_id: &str) {
        for name in USER_SCOPED {
            self.cache.invalidate_matching(name, user_id);
        }
    }

    /// Forget one vendor's cost list and reviews.
    pub fn invalidate_vendor(&self, vendor_id: &str) {
        self.cache.invalidate(&QueryKey::new(VENDOR_COSTS, [vendor_id]));
        self.cache.invalidate(&QueryKey::new(VENDOR_REVIEWS, [vendor_id]));
    }

    async fn profile_of(&self, user: &AuthUser) -> Option<UserProfile> {
        let backend = self.backend();
        let result = self
            .cache
            .fetch(user_key(USER_PROFILE, user), || {
                user_state::fetch_profile(backend, user)
            })
            .await;
        result.unwrap_or_else(|err| {
            warn!("failed to load profile for {}: {err}", user.id);
            None
        })
    }

    async fn flag(&self, procedure: &'static str) -> bool {
        let Some(user) = self.user_or_warn().await else {
            return false;
        };
        let backend = self.backend();
        let result = self
            .cache
            .fetch(user_key(procedure, &user), || admin::call_flag(backend, procedure))
            .await;
        result.unwrap_or_else(|err| {
            warn!("{procedure} failed: {err}");
            false
        })
    }

    async fn user_or_warn(&self) -> Option<AuthUser> {
        match self.backend.current_user().await {
            Ok(user) => user,
            Err(err) => {
                warn!("could not resolve current user: {err}");
                None
            }
        }
    }
}

fn user_key(name: &str, user: &AuthUser) -> QueryKey {
    QueryKey::new(name, [user.id.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use neighborly_backend::InMemoryBackend;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn debug_output_skips_the_backend() {
        let directory = Directory::new(Arc::new(InMemoryBackend::new()));
        assert_eq!(format!("{directory:?}"), "Directory { cached: 0, .. }");

        directory.point_rewards().await.unwrap();
        assert_eq!(format!("{directory:?}"), "Directory { cached: 1, .. }");
    }
}
