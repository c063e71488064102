use crate::error::Result;
use crate::query::RowQuery;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One row as returned by the row store.
pub type Row = serde_json::Map<String, Value>;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}

/// Hosted row store with procedures, callable functions and an auth session.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The signed-in user, or `None` when there is no session.
    async fn current_user(&self) -> Result<Option<AuthUser>>;

    async fn query(&self, query: &RowQuery) -> Result<Vec<Row>>;

    /// Call a named server-side procedure with a parameter record.
    async fn call(&self, procedure: &str, args: Value) -> Result<Value>;

    /// Invoke a callable function.
    async fn invoke(&self, function: &str, body: Option<Value>) -> Result<Value>;
}

/// Typed helpers layered over any [`Backend`].
#[async_trait]
pub trait BackendExt: Backend {
    async fn query_as<T>(&self, query: &RowQuery) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let rows = self.query(query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)).map_err(Into::into))
            .collect()
    }

    async fn maybe_single_as<T>(&self, query: &RowQuery) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let query = query.clone().single();
        let mut rows: Vec<T> = self.query_as(&query).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn call_as<T>(&self, procedure: &str, args: Value) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let value = self.call(procedure, args).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<B: Backend + ?Sized> BackendExt for B {}
