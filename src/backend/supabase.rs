//! Supabase backend implementation.
//!
//! Speaks the project's REST surface directly: PostgREST for tables and stored
//! procedures, GoTrue for auth and the Storage API for files. Every request
//! carries the project's anon key; authenticated requests additionally carry
//! the session's access token.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::{
    authorize_url, query::value_text, AuthUser, Backend, BackendError, Filter, OAuthProvider, Query, Session,
};

/// Supabase backend bound to one project.
pub struct SupabaseBackend {
    client: Client,
    url: String,
    anon_key: String,
    session: Mutex<Option<Session>>,
}

/// Token payload returned by the auth service on sign-in, sign-up and refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

impl SupabaseBackend {
    /// Create a backend for the project at `url` using its public anon key.
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: Mutex::new(None),
        }
    }

    pub fn project_url(&self) -> &str {
        &self.url
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.url, endpoint)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.url, bucket, path.trim_start_matches('/'))
    }

    async fn bearer(&self) -> String {
        match self.session.lock().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let token = self.bearer().await;
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder.send().await.map_err(|e| BackendError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, error_message(&body)))
    }

    async fn send_json(&self, builder: RequestBuilder) -> Result<Value, BackendError> {
        let response = self.send(builder).await?;
        let text = response.text().await.map_err(|e| BackendError::Network(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BackendError::InvalidData(format!("malformed response: {e}")))
    }

    async fn send_rows(&self, builder: RequestBuilder) -> Result<Vec<Value>, BackendError> {
        match self.send_json(builder).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    async fn store_token(&self, value: Value) -> Result<Session, BackendError> {
        let token: TokenResponse =
            serde_json::from_value(value).map_err(|e| BackendError::InvalidData(format!("malformed session: {e}")))?;
        let session = token.into_session();
        *self.session.lock().await = Some(session.clone());
        Ok(session)
    }
}

/// Encode a read as PostgREST query parameters.
pub fn encode_query(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.columns.replace(' ', ""))];
    params.extend(encode_filters(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Encode row filters as PostgREST query parameters.
pub fn encode_filters(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| {
            let op = if f.value.is_null() { "is" } else { f.op.as_str() };
            (f.column.clone(), format!("{}.{}", op, value_text(&f.value)))
        })
        .collect()
}

/// Parse the total out of a `Content-Range` header such as `0-24/3573` or `*/0`.
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.trim().parse().ok()
}

/// Pull a human-readable message out of an error body from any of the services.
pub fn error_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "msg", "error_description", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    body.trim().to_string()
}

pub fn map_status(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Auth(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            BackendError::InvalidData(message)
        }
        other => BackendError::Other(format!("{}: {}", other.as_u16(), message)),
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    fn backend_type(&self) -> &str {
        "supabase"
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let builder = self
            .request(Method::POST, &self.auth_url("token"))
            .await
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let value = self.send_json(builder).await?;
        self.store_token(value).await
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<Option<Session>, BackendError> {
        let builder = self
            .request(Method::POST, &self.auth_url("signup"))
            .await
            .json(&json!({ "email": email, "password": password, "data": metadata }));
        let value = self.send_json(builder).await?;
        if value.get("access_token").is_some() {
            return self.store_token(value).await.map(Some);
        }
        debug!("Sign-up for {email} is awaiting email confirmation");
        Ok(None)
    }

    fn oauth_authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String, BackendError> {
        authorize_url(&self.url, provider, redirect_to)
    }

    async fn session(&self) -> Option<Session> {
        self.session.lock().await.clone()
    }

    async fn set_session(&self, session: Option<Session>) {
        *self.session.lock().await = session;
    }

    async fn refresh_session(&self) -> Result<Session, BackendError> {
        let refresh_token = self
            .session
            .lock()
            .await
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
            .ok_or_else(|| BackendError::Auth("no refresh token".to_string()))?;
        let builder = self
            .client
            .post(self.auth_url("token"))
            .header("apikey", &self.anon_key)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let value = self.send_json(builder).await?;
        self.store_token(value).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let has_session = self.session.lock().await.is_some();
        if has_session {
            let builder = self.request(Method::POST, &self.auth_url("logout")).await;
            if let Err(e) = self.send(builder).await {
                // The local session is dropped regardless.
                warn!("Remote sign-out failed: {e}");
            }
        }
        *self.session.lock().await = None;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), BackendError> {
        if self.session.lock().await.is_none() {
            return Err(BackendError::Auth("not signed in".to_string()));
        }
        let builder = self
            .request(Method::PUT, &self.auth_url("user"))
            .await
            .json(&json!({ "password": new_password }));
        self.send(builder).await.map(|_| ())
    }

    async fn send_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), BackendError> {
        let builder = self
            .request(Method::POST, &self.auth_url("recover"))
            .await
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }));
        self.send(builder).await.map(|_| ())
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let builder = self
            .request(Method::GET, &self.rest_url(table))
            .await
            .query(&encode_query(query));
        self.send_rows(builder).await
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, BackendError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(encode_filters(filters));
        let builder = self
            .request(Method::HEAD, &self.rest_url(table))
            .await
            .header("Prefer", "count=exact")
            .query(&params);
        let response = self.send(builder).await?;
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| BackendError::InvalidData(format!("missing row count for '{table}'")))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let builder = self
            .request(Method::POST, &self.rest_url(table))
            .await
            .header("Prefer", "return=representation")
            .json(&json!([row]));
        self.send_rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidData(format!("insert into '{table}' returned no row")))
    }

    async fn upsert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let builder = self
            .request(Method::POST, &self.rest_url(table))
            .await
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&json!([row]));
        self.send_rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidData(format!("upsert into '{table}' returned no row")))
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, BackendError> {
        let builder = self
            .request(Method::PATCH, &self.rest_url(table))
            .await
            .header("Prefer", "return=representation")
            .query(&encode_filters(filters))
            .json(&patch);
        self.send_rows(builder).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), BackendError> {
        if filters.is_empty() {
            return Err(BackendError::InvalidData(format!("refusing unfiltered delete on '{table}'")));
        }
        let builder = self
            .request(Method::DELETE, &self.rest_url(table))
            .await
            .query(&encode_filters(filters));
        self.send(builder).await.map(|_| ())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError> {
        let builder = self
            .request(Method::POST, &self.rest_url(&format!("rpc/{function}")))
            .await
            .json(&args);
        self.send_json(builder).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), BackendError> {
        let builder = self
            .request(Method::POST, &self.object_url(bucket, path))
            .await
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes);
        self.send(builder).await.map(|_| ())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, BackendError> {
        let builder = self.request(Method::GET, &self.object_url(bucket, path)).await;
        let response = self.send(builder).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| BackendError::Network(e.to_string()))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let builder = self
            .request(Method::DELETE, &format!("{}/storage/v1/object/{}", self.url, bucket))
            .await
            .json(&json!({ "prefixes": paths }));
        self.send(builder).await.map(|_| ())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url,
            bucket,
            path.trim_start_matches('/')
        )
    }
}
