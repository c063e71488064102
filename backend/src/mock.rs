use crate::client::AuthUser;
use crate::client::Backend;
use crate::client::Row;
use crate::error::BackendError;
use crate::error::Result;
use crate::query::RowQuery;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

/// A request observed by [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    CurrentUser,
    Query(RowQuery),
    Call { procedure: String, args: Value },
    Invoke { function: String },
}

#[derive(Default)]
struct State {
    user: Option<AuthUser>,
    session_error: Option<String>,
    tables: HashMap<String, Vec<Row>>,
    procedures: HashMap<String, std::result::Result<Value, String>>,
    functions: HashMap<String, std::result::Result<Value, String>>,
    failing_tables: HashMap<String, String>,
    requests: Vec<RecordedRequest>,
}

/// Scripted [`Backend`] holding rows, procedure results and a session in
/// memory. Every request is recorded.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: AuthUser) -> Self {
        self.lock().user = Some(user);
        self
    }

    /// Seed a table. Non-object values are ignored.
    pub fn with_rows(self, table: &str, rows: impl IntoIterator<Item = Value>) -> Self {
        for row in rows {
            self.insert_row(table, row);
        }
        self
    }

    pub fn with_procedure(self, procedure: &str, result: Value) -> Self {
        self.lock()
            .procedures
            .insert(procedure.to_string(), Ok(result));
        self
    }

    pub fn with_failing_procedure(self, procedure: &str, message: &str) -> Self {
        self.lock()
            .procedures
            .insert(procedure.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_function(self, function: &str, result: Value) -> Self {
        self.lock()
            .functions
            .insert(function.to_string(), Ok(result));
        self
    }

    pub fn with_failing_function(self, function: &str, message: &str) -> Self {
        self.lock()
            .functions
            .insert(function.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_failing_table(self, table: &str, message: &str) -> Self {
        self.lock()
            .failing_tables
            .insert(table.to_string(), message.to_string());
        self
    }

    /// Make session lookups fail with a 500 carrying `message`.
    pub fn with_failing_session(self, message: &str) -> Self {
        self.lock().session_error = Some(message.to_string());
        self
    }

    /// Delay every request, so concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_row(&self, table: &str, row: Value) {
        if let Value::Object(row) = row {
            self.lock()
                .tables
                .entry(table.to_string())
                .or_default()
                .push(row);
        }
    }

    pub fn sign_in(&self, user: AuthUser) {
        self.lock().user = Some(user);
    }

    pub fn sign_out(&self) {
        self.lock().user = None;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Tables hit by row queries, in request order.
    pub fn queried_tables(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .filter_map(|request| match request {
                RecordedRequest::Query(query) => Some(query.table.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn calls_to(&self, procedure: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| {
                matches!(request, RecordedRequest::Call { procedure: p, .. } if p == procedure)
            })
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, request: RecordedRequest) {
        self.lock().requests.push(request);
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        self.record(RecordedRequest::CurrentUser);
        let state = self.lock();
        match &state.session_error {
            Some(message) => Err(BackendError::Status {
                status: 500,
                body: message.clone(),
            }),
            None => Ok(state.user.clone()),
        }
    }

    async fn query(&self, query: &RowQuery) -> Result<Vec<Row>> {
        self.record(RecordedRequest::Query(query.clone()));
        self.simulate_latency().await;

        let state = self.lock();
        if let Some(message) = state.failing_tables.get(&query.table) {
            return Err(BackendError::Status {
                status: 500,
                body: message.clone(),
            });
        }

        let mut rows: Vec<Row> = state
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();
        drop(state);

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if query.single {
            rows.truncate(1);
        }
        Ok(rows)
    }

    async fn call(&self, procedure: &str, args: Value) -> Result<Value> {
        self.record(RecordedRequest::Call {
            procedure: procedure.to_string(),
            args,
        });
        self.simulate_latency().await;

        match self.lock().procedures.get(procedure) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(BackendError::Status {
                status: 500,
                body: message.clone(),
            }),
            None => Err(BackendError::NotFound(format!("rpc {procedure}"))),
        }
    }

    async fn invoke(&self, function: &str, _body: Option<Value>) -> Result<Value> {
        self.record(RecordedRequest::Invoke {
            function: function.to_string(),
        });
        self.simulate_latency().await;

        match self.lock().functions.get(function) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(BackendError::Status {
                status: 500,
                body: message.clone(),
            }),
            None => Err(BackendError::NotFound(format!("function {function}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BackendExt;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reward {
        id: String,
        points: i64,
    }

    fn rewards() -> InMemoryBackend {
        InMemoryBackend::new().with_rows(
            "point_rewards",
            [
                json!({"id": "a", "points": 10}),
                json!({"id": "b", "points": 50}),
                json!({"id": "c", "points": 25}),
            ],
        )
    }

    #[tokio::test]
    async fn orders_rows() {
        let backend = rewards();
        let rows: Vec<Reward> = backend
            .query_as(&RowQuery::new("point_rewards").order("points", false))
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn maybe_single_returns_first_match_or_none() {
        let backend = rewards();
        let found: Option<Reward> = backend
            .maybe_single_as(&RowQuery::new("point_rewards").eq("id", "c"))
            .await
            .unwrap();
        assert_eq!(found, Some(Reward { id: "c".to_string(), points: 25 }));

        let missing: Option<Reward> = backend
            .maybe_single_as(&RowQuery::new("point_rewards").eq("id", "zzz"))
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn failing_table_reports_status() {
        let backend = rewards().with_failing_table("point_rewards", "boom");
        let err = backend
            .query(&RowQuery::new("point_rewards"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "request failed: 500 - boom");
    }

    #[tokio::test]
    async fn procedures_and_functions_are_scripted() {
        let backend = InMemoryBackend::new()
            .with_procedure("is_admin", json!(true))
            .with_failing_function("backfill", "nope");

        let admin: bool = backend.call_as("is_admin", json!({})).await.unwrap();
        assert!(admin);
        assert!(matches!(
            backend.call("unknown", json!({})).await,
            Err(BackendError::NotFound(_))
        ));
        assert!(backend.invoke("backfill", None).await.is_err());
        assert_eq!(backend.calls_to("is_admin"), 1);
        assert_eq!(backend.requests().len(), 3);
    }

    #[tokio::test]
    async fn session_can_change() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.current_user().await.unwrap(), None);
        backend.sign_in(AuthUser::new("u-1"));
        assert_eq!(backend.current_user().await.unwrap(), Some(AuthUser::new("u-1")));
        backend.sign_out();
        assert_eq!(backend.current_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn failing_session_is_recorded_and_reported() {
        let backend = InMemoryBackend::new()
            .with_user(AuthUser::new("u-1"))
            .with_failing_session("JWT expired");
        let err = backend.current_user().await.unwrap_err();
        assert_eq!(err.to_string(), "request failed: 500 - JWT expired");
        assert_eq!(backend.requests(), vec![RecordedRequest::CurrentUser]);
    }
}
