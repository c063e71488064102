/*!
# Neighborly Directory

Reads behind the neighborhood vendor directory: the reward catalog, vendor
cost lists, and the per-user lookups (home vendors, the user's reviews,
vendors they have shared costs for, admin flags).

## Error policy

- Collections (`user_cost_vendors`, `user_home_vendors`, `user_reviews`,
  `vendor_costs`, `point_rewards`, `vendors`) log and return the error.
- Flags and the profile (`is_admin`, `is_hoa_admin`, `user_profile`,
  `auth_state`) log a warning and fall back to `false` / `None`.
- Nobody signed in is not an error: user-scoped lookups return their empty
  value without touching the scoped table.

## Architecture

```text
Directory (facade, QueryCache keyed by name + params)
  └─> user_state / catalog / admin (one backend request each)
        └─> dyn Backend (RestBackend, InMemoryBackend)
```

Consumers track each read with a [`QueryHandle`], which walks
`Idle -> Loading -> Success | Error` and drops responses for superseded
keys.
*/

pub mod admin;
mod cache;
pub mod catalog;
mod directory;
mod error;
mod fetch;
mod models;
pub mod user_state;

pub use cache::DEFAULT_CACHE_CAPACITY;
pub use cache::QueryCache;
pub use cache::QueryKey;
pub use directory::Directory;
pub use error::DirectoryError;
pub use error::Result;
pub use fetch::FetchState;
pub use fetch::FetchTicket;
pub use fetch::LOADING_MESSAGE;
pub use fetch::QueryHandle;
pub use models::AuthState;
pub use models::CostEntry;
pub use models::PointReward;
pub use models::Review;
pub use models::UserProfile;
pub use models::UserReview;
pub use models::Vendor;
pub use models::VendorId;
