use crate::client::AuthUser;
use crate::client::Backend;
use crate::client::Row;
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::error::Result;
use crate::query::RowQuery;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde_json::Value;
use tracing::debug;
use tracing::warn;
use url::Url;

/// [`Backend`] over the REST surface of a hosted Postgres backend:
/// `/rest/v1` for rows and procedures, `/functions/v1` for callable
/// functions and `/auth/v1/user` for the session.
#[derive(Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl RestBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        let mut base_url = Url::parse(&config.url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key,
            access_token: config.access_token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Row endpoint for a query, filters rendered into the query string.
    pub fn query_url(&self, query: &RowQuery) -> Result<Url> {
        let mut url = self.endpoint(&format!("rest/v1/{}", query.table))?;
        url.query_pairs_mut().extend_pairs(query.to_query_pairs());
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&self.anon_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {bearer}"))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn post_json(&self, url: Url, body: &Value, what: &str) -> Result<Value> {
        debug!("POST {url}");
        let resp = self
            .http
            .post(url)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await?;
        read_json(resp, what).await
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|err| BackendError::Config(format!("invalid header value: {err}")))
}

async fn read_json(resp: reqwest::Response, what: &str) -> Result<Value> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!("{what} failed: {status} - {body}");
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what.to_string()));
        }
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = resp.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl Backend for RestBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        if self.access_token.is_none() {
            return Ok(None);
        }
        let url = self.endpoint("auth/v1/user")?;
        debug!("GET {url}");
        let resp = self.http.get(url).headers(self.headers()?).send().await?;
        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!("session rejected; treating as signed out");
            return Ok(None);
        }
        let value = read_json(resp, "auth user").await?;
        Ok(Some(serde_json::from_value(value)?))
    }

    async fn query(&self, query: &RowQuery) -> Result<Vec<Row>> {
        let url = self.query_url(query)?;
        debug!("GET {url}");
        let resp = self.http.get(url).headers(self.headers()?).send().await?;
        let value = read_json(resp, &format!("query {}", query.table)).await?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(BackendError::Request(format!(
                        "expected row object from {}, got {other}",
                        query.table
                    ))),
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(BackendError::Request(format!(
                "expected row array from {}, got {other}",
                query.table
            ))),
        }
    }

    async fn call(&self, procedure: &str, args: Value) -> Result<Value> {
        let url = self.endpoint(&format!("rest/v1/rpc/{procedure}"))?;
        self.post_json(url, &args, &format!("rpc {procedure}")).await
    }

    async fn invoke(&self, function: &str, body: Option<Value>) -> Result<Value> {
        let url = self.endpoint(&format!("functions/v1/{function}"))?;
        let body = body.unwrap_or_else(|| Value::Object(Default::default()));
        self.post_json(url, &body, &format!("function {function}")).await
    }
}
