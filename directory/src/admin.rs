use crate::error::Result;
use neighborly_backend::Backend;
use neighborly_backend::BackendExt;
use neighborly_backend::functions;
use neighborly_backend::procedures;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

/// Whether the signed-in user is a site administrator. Any failure reads
/// as `false`.
pub async fn is_admin(backend: &dyn Backend) -> bool {
    flag(backend, procedures::IS_ADMIN).await
}

/// Whether the signed-in user administers their HOA. Any failure reads as
/// `false`.
pub async fn is_hoa_admin(backend: &dyn Backend) -> bool {
    flag(backend, procedures::IS_USER_HOA_ADMIN).await
}

pub(crate) async fn flag(backend: &dyn Backend, procedure: &str) -> bool {
    match backend.current_user().await {
        Ok(Some(_)) => {}
        Ok(None) => return false,
        Err(err) => {
            warn!("could not resolve current user for {procedure}: {err}");
            return false;
        }
    }
    match call_flag(backend, procedure).await {
        Ok(value) => value,
        Err(err) => {
            warn!("{procedure} failed: {err}");
            false
        }
    }
}

/// Strict form of the flag procedures; a `null` answer reads as `false`.
pub(crate) async fn call_flag(backend: &dyn Backend, procedure: &str) -> Result<bool> {
    let value: Option<bool> = backend.call_as(procedure, json!({})).await?;
    Ok(value.unwrap_or(false))
}

/// Refresh stored Google ratings for every vendor. Runs only when called.
pub async fn backfill_google_ratings(backend: &dyn Backend) -> Result<Value> {
    info!("invoking {}", functions::BACKFILL_GOOGLE_RATINGS);
    let result = backend
        .invoke(functions::BACKFILL_GOOGLE_RATINGS, None)
        .await
        .inspect_err(|err| warn!("{} failed: {err}", functions::BACKFILL_GOOGLE_RATINGS))?;
    Ok(result)
}
