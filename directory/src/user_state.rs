//! Lookups scoped to the signed-in user.
//!
//! Each operation resolves the current user first; with nobody signed in it
//! returns its empty structure without querying the scoped table. Rows are
//! folded into insertion-ordered structures keyed by vendor id, the first
//! row for a vendor winning.

use crate::error::Result;
use crate::models::AuthState;
use crate::models::UserProfile;
use crate::models::UserReview;
use crate::models::VendorId;
use indexmap::IndexMap;
use indexmap::IndexSet;
use neighborly_backend::AuthUser;
use neighborly_backend::Backend;
use neighborly_backend::BackendExt;
use neighborly_backend::RowQuery;
use neighborly_backend::tables;
use serde::Deserialize;
use tracing::error;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct VendorRef {
    vendor_id: VendorId,
}

#[derive(Debug, Deserialize)]
struct ReviewRef {
    id: String,
    vendor_id: VendorId,
    rating: i32,
}

/// The signed-in user, if any. Session failures are logged and returned.
pub async fn session_user(backend: &dyn Backend) -> Result<Option<AuthUser>> {
    let user = backend.current_user().await.inspect_err(|err| {
        error!("could not resolve current user: {err}");
    })?;
    Ok(user)
}

/// Vendor id -> whether the user has a live cost entry for it.
pub async fn user_cost_vendors(backend: &dyn Backend) -> Result<IndexMap<VendorId, bool>> {
    match session_user(backend).await? {
        Some(user) => cost_vendors_for(backend, &user).await,
        None => Ok(IndexMap::new()),
    }
}

pub async fn cost_vendors_for(
    backend: &dyn Backend,
    user: &AuthUser,
) -> Result<IndexMap<VendorId, bool>> {
    let query = RowQuery::new(tables::COSTS)
        .select("vendor_id")
        .eq("created_by", user.id.as_str())
        .is_null("deleted_at");
    let rows: Vec<VendorRef> = backend.query_as(&query).await.inspect_err(|err| {
        error!("failed to load cost entries for {}: {err}", user.id);
    })?;

    let mut vendors = IndexMap::with_capacity(rows.len());
    for row in rows {
        vendors.entry(row.vendor_id).or_insert(true);
    }
    Ok(vendors)
}

/// Vendors the user marked as home vendors.
pub async fn user_home_vendors(backend: &dyn Backend) -> Result<IndexSet<VendorId>> {
    match session_user(backend).await? {
        Some(user) => home_vendors_for(backend, &user).await,
        None => Ok(IndexSet::new()),
    }
}

pub async fn home_vendors_for(backend: &dyn Backend, user: &AuthUser) -> Result<IndexSet<VendorId>> {
    let query = RowQuery::new(tables::HOME_VENDORS)
        .select("vendor_id")
        .eq("user_id", user.id.as_str());
    let rows: Vec<VendorRef> = backend.query_as(&query).await.inspect_err(|err| {
        error!("failed to load home vendors for {}: {err}", user.id);
    })?;
    Ok(rows.into_iter().map(|row| row.vendor_id).collect())
}

/// Vendor id -> the user's review of it.
pub async fn user_reviews(backend: &dyn Backend) -> Result<IndexMap<VendorId, UserReview>> {
    match session_user(backend).await? {
        Some(user) => reviews_for(backend, &user).await,
        None => Ok(IndexMap::new()),
    }
}

pub async fn reviews_for(
    backend: &dyn Backend,
    user: &AuthUser,
) -> Result<IndexMap<VendorId, UserReview>> {
    let query = RowQuery::new(tables::REVIEWS)
        .select("id, vendor_id, rating")
        .eq("user_id", user.id.as_str());
    let rows: Vec<ReviewRef> = backend.query_as(&query).await.inspect_err(|err| {
        error!("failed to load reviews for {}: {err}", user.id);
    })?;

    let mut reviews = IndexMap::with_capacity(rows.len());
    for row in rows {
        reviews.entry(row.vendor_id).or_insert(UserReview {
            rating: row.rating,
            review_id: row.id,
        });
    }
    Ok(reviews)
}

/// The user's profile row. Failures degrade to `None`.
pub async fn user_profile(backend: &dyn Backend) -> Option<UserProfile> {
    let user = match backend.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return None,
        Err(err) => {
            warn!("could not resolve current user: {err}");
            return None;
        }
    };
    profile_for(backend, &user).await
}

pub async fn profile_for(backend: &dyn Backend, user: &AuthUser) -> Option<UserProfile> {
    match fetch_profile(backend, user).await {
        Ok(profile) => profile,
        Err(err) => {
            warn!("failed to load profile for {}: {err}", user.id);
            None
        }
    }
}

pub(crate) async fn fetch_profile(
    backend: &dyn Backend,
    user: &AuthUser,
) -> Result<Option<UserProfile>> {
    let query = RowQuery::new(tables::USERS).eq("id", user.id.as_str());
    Ok(backend.maybe_single_as(&query).await?)
}

/// Signed-in and verification flags. Failures degrade to signed out.
pub async fn auth_state(backend: &dyn Backend) -> AuthState {
    let user = match backend.current_user().await {
        Ok(Some(user)) => user,
        Ok(None) => return AuthState::default(),
        Err(err) => {
            warn!("could not resolve current user: {err}");
            return AuthState::default();
        }
    };
    let profile = profile_for(backend, &user).await;
    AuthState {
        is_logged_in: true,
        is_verified: profile.as_ref().is_some_and(|p| p.is_verified),
        profile,
    }
}
