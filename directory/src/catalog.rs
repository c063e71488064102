use crate::error::Result;
use crate::models::CostEntry;
use crate::models::PointReward;
use crate::models::Review;
use crate::models::Vendor;
use neighborly_backend::Backend;
use neighborly_backend::BackendExt;
use neighborly_backend::RowQuery;
use neighborly_backend::procedures;
use neighborly_backend::tables;
use neighborly_formatters::Category;
use serde_json::json;
use tracing::error;

/// Live cost entries for one vendor, via `list_vendor_costs`. Soft-deleted
/// rows the procedure still returns are dropped.
pub async fn vendor_costs(backend: &dyn Backend, vendor_id: &str) -> Result<Vec<CostEntry>> {
    let costs: Option<Vec<CostEntry>> = backend
        .call_as(
            procedures::LIST_VENDOR_COSTS,
            json!({ "_vendor_id": vendor_id }),
        )
        .await
        .inspect_err(|err| {
            error!("failed to list costs for vendor {vendor_id}: {err}");
        })?;
    let mut costs = costs.unwrap_or_default();
    costs.retain(|cost| !cost.is_deleted());
    Ok(costs)
}

/// Reviews of one vendor, newest first.
pub async fn vendor_reviews(backend: &dyn Backend, vendor_id: &str) -> Result<Vec<Review>> {
    let query = RowQuery::new(tables::REVIEWS)
        .eq("vendor_id", vendor_id)
        .order("created_at", false);
    let reviews: Vec<Review> = backend.query_as(&query).await.inspect_err(|err| {
        error!("failed to load reviews for vendor {vendor_id}: {err}");
    })?;
    Ok(reviews)
}

/// Reward catalog, highest value first.
pub async fn point_rewards(backend: &dyn Backend) -> Result<Vec<PointReward>> {
    let query = RowQuery::new(tables::POINT_REWARDS).order("points", false);
    let rewards: Vec<PointReward> = backend.query_as(&query).await.inspect_err(|err| {
        error!("failed to load point rewards: {err}");
    })?;
    Ok(rewards)
}

/// Vendors, optionally limited to one category, by name.
pub async fn vendors(backend: &dyn Backend, category: Option<Category>) -> Result<Vec<Vendor>> {
    let mut query = RowQuery::new(tables::VENDORS).order("name", true);
    if let Some(category) = category {
        query = query.eq("category", category.label());
    }
    let vendors: Vec<Vendor> = backend.query_as(&query).await.inspect_err(|err| {
        error!("failed to load vendors: {err}");
    })?;
    Ok(vendors)
}
