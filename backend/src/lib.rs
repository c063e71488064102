/*!
# Neighborly Backend

The capability interface the directory talks to: a hosted row store with
filtered queries, named procedures, a callable function endpoint and an
auth session. Anything that can answer those four requests can back the
directory.

- [`Backend`]: the trait itself, object safe and `Send + Sync`
- [`RowQuery`]: equality / null-check filters, ordering, at-most-one-row
- [`RestBackend`]: `reqwest` client for PostgREST-style hosted backends
- `InMemoryBackend` (feature `mock`): scripted backend for tests

## Example

```rust,no_run
use neighborly_backend::{BackendConfig, BackendExt, RestBackend, RowQuery};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BackendConfig::load(None)?;
    let backend = RestBackend::new(config)?;

    let query = RowQuery::new("point_rewards").order("points", false);
    let rows: Vec<Value> = backend.query_as(&query).await?;
    println!("{} rewards", rows.len());
    Ok(())
}
```
*/

mod client;
mod config;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod query;
mod rest;

pub use client::AuthUser;
pub use client::Backend;
pub use client::BackendExt;
pub use client::Row;
pub use config::BackendConfig;
pub use error::BackendError;
pub use error::Result;
#[cfg(any(test, feature = "mock"))]
pub use mock::InMemoryBackend;
#[cfg(any(test, feature = "mock"))]
pub use mock::RecordedRequest;
pub use query::Filter;
pub use query::Order;
pub use query::RowQuery;
pub use rest::RestBackend;

/// Tables the directory reads.
pub mod tables {
    pub const COSTS: &str = "costs";
    pub const HOME_VENDORS: &str = "home_vendors";
    pub const POINT_REWARDS: &str = "point_rewards";
    pub const REVIEWS: &str = "reviews";
    pub const USERS: &str = "users";
    pub const VENDORS: &str = "vendors";
}

/// Server-side procedures.
pub mod procedures {
    pub const IS_ADMIN: &str = "is_admin";
    pub const IS_USER_HOA_ADMIN: &str = "is_user_hoa_admin";
    pub const LIST_VENDOR_COSTS: &str = "list_vendor_costs";
}

/// Callable functions.
pub mod functions {
    pub const BACKFILL_GOOGLE_RATINGS: &str = "backfill-google-ratings";
}
