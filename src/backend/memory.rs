//! In-process backend used for tests and offline runs.
//!
//! Behaves like the hosted project closely enough for the portal's needs:
//! signing up creates the matching `profiles` row, the counter procedures exist,
//! `subjects(name)` embeds resolve, and writes can be made to fail on demand.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    authorize_url, query::value_text, AuthUser, Backend, BackendError, Filter, FilterOp, OAuthProvider, Query, Session,
};
use crate::constants::{RPC_INCREMENT_DOWNLOAD_STATS, RPC_INCREMENT_LOGIN_COUNT, TABLE_PROFILES};

const MEMORY_BASE_URL: &str = "memory://backbenchers";
const SESSION_LIFETIME_SECS: i64 = 3600;

#[derive(Clone, Debug)]
struct Account {
    id: String,
    email: String,
    password: String,
    metadata: Value,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    objects: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    failing_reads: HashSet<String>,
    rpc_unavailable: bool,
    require_confirmation: bool,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing timestamps keep "newest first" orderings deterministic.
    fn next_timestamp(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
    }

    fn check_writable(&self, name: &str) -> Result<(), BackendError> {
        if self.failing.contains(name) {
            return Err(BackendError::Network(format!("simulated outage writing to '{name}'")));
        }
        Ok(())
    }

    fn check_readable(&self, name: &str) -> Result<(), BackendError> {
        if self.failing_reads.contains(name) {
            return Err(BackendError::Network(format!("simulated outage reading from '{name}'")));
        }
        Ok(())
    }

    fn table_mut(&mut self, table: &str) -> &mut Vec<Value> {
        self.tables.entry(table.to_string()).or_default()
    }

    fn issue_session(&mut self, account: &Account) -> Session {
        let session = Session {
            access_token: format!("memory-{}", Uuid::new_v4()),
            refresh_token: Some(format!("refresh-{}", Uuid::new_v4())),
            expires_at: Some(Utc::now().timestamp() + SESSION_LIFETIME_SECS),
            user: AuthUser {
                id: account.id.clone(),
                email: Some(account.email.clone()),
                user_metadata: account.metadata.clone(),
            },
        };
        self.session = Some(session.clone());
        session
    }

    fn increment_profile_column(&mut self, args: &Value, column: &str) -> Result<Value, BackendError> {
        let user_id = args
            .get("user_id_param")
            .map(value_text)
            .ok_or_else(|| BackendError::InvalidData("missing user_id_param".to_string()))?;
        let profile = self
            .table_mut(TABLE_PROFILES)
            .iter_mut()
            .find(|row| row.get("id").map(value_text).as_deref() == Some(user_id.as_str()))
            .ok_or_else(|| BackendError::NotFound(format!("profile {user_id}")))?;
        let current = profile.get(column).and_then(Value::as_i64).unwrap_or(0);
        if let Some(map) = profile.as_object_mut() {
            map.insert(column.to_string(), json!(current + 1));
        }
        Ok(Value::Null)
    }
}

/// In-memory backend. Cheap to clone state into tests via [`MemoryBackend::rows`].
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Insert rows as-is, filling `id` and `created_at` when missing.
    pub async fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut state = self.state.lock().await;
        for mut row in rows {
            fill_defaults(&mut state, &mut row);
            state.table_mut(table).push(row);
        }
    }

    /// Snapshot of a table's rows in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state.lock().await.tables.get(table).cloned().unwrap_or_default()
    }

    /// Make every write to `name` fail. `name` is a table or a storage bucket.
    pub async fn fail_writes_to(&self, name: &str) {
        self.state.lock().await.failing.insert(name.to_string());
    }

    pub async fn restore_writes_to(&self, name: &str) {
        self.state.lock().await.failing.remove(name);
    }

    /// Make every read from `name` fail: selects, counts and object downloads.
    pub async fn fail_reads_from(&self, name: &str) {
        self.state.lock().await.failing_reads.insert(name.to_string());
    }

    pub async fn restore_reads_from(&self, name: &str) {
        self.state.lock().await.failing_reads.remove(name);
    }

    /// Simulate a project where the counter procedures were never deployed.
    pub async fn set_rpc_available(&self, available: bool) {
        self.state.lock().await.rpc_unavailable = !available;
    }

    /// When set, sign-ups return no session until the email is confirmed.
    pub async fn require_email_confirmation(&self, required: bool) {
        self.state.lock().await.require_confirmation = required;
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.state.lock().await.objects.get(&object_key(bucket, path)).cloned()
    }

    /// Register an account and its profile in one go, merging `profile` into the
    /// row the sign-up trigger creates. Returns the new user id.
    pub async fn create_account(&self, email: &str, password: &str, profile: Value) -> Result<String, BackendError> {
        let mut state = self.state.lock().await;
        let account = register(&mut state, email, password, json!({}))?;
        let id = account.id.clone();
        if let Some(row) = state
            .table_mut(TABLE_PROFILES)
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id.as_str()))
        {
            merge(row, &profile);
        }
        Ok(id)
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{}/{}", bucket, path.trim_start_matches('/'))
}

fn fill_defaults(state: &mut MemoryState, row: &mut Value) {
    let timestamp = state.next_timestamp();
    if let Some(map) = row.as_object_mut() {
        map.entry("id").or_insert_with(|| json!(Uuid::new_v4().to_string()));
        map.entry("created_at").or_insert_with(|| json!(timestamp));
    }
}

fn merge(row: &mut Value, patch: &Value) {
    if let (Some(target), Some(source)) = (row.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn register(state: &mut MemoryState, email: &str, password: &str, metadata: Value) -> Result<Account, BackendError> {
    let email = email.trim().to_lowercase();
    if state.accounts.contains_key(&email) {
        return Err(BackendError::InvalidData("User already registered".to_string()));
    }
    let account = Account {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        password: password.to_string(),
        metadata: metadata.clone(),
    };
    state.accounts.insert(email, account.clone());

    // Mirrors the on_auth_user_created trigger: the profile starts without an email.
    let timestamp = state.next_timestamp();
    let profile = json!({
        "id": account.id,
        "full_name": metadata.get("full_name").cloned().unwrap_or(Value::Null),
        "role": "student",
        "is_admin": false,
        "blocked": false,
        "login_count": 0,
        "download_count": 0,
        "created_at": timestamp,
        "updated_at": timestamp,
    });
    state.table_mut(TABLE_PROFILES).push(profile);
    Ok(account)
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let actual = row.get(&filter.column).unwrap_or(&Value::Null);
        match filter.op {
            FilterOp::Eq => actual == &filter.value || value_text(actual) == value_text(&filter.value),
            FilterOp::Gte => !actual.is_null() && compare_values(actual, &filter.value) != Ordering::Less,
        }
    })
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&y.as_f64().unwrap_or_default())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(dx), Ok(dy)) => dx.cmp(&dy),
                _ => x.cmp(y),
            }
        }
        _ => value_text(a).cmp(&value_text(b)),
    }
}

fn project(state: &MemoryState, row: &Value, query: &Query) -> Value {
    let mut out = match query.plain_columns() {
        None => row.as_object().cloned().unwrap_or_default(),
        Some(columns) => {
            let mut map = Map::new();
            for column in columns {
                map.insert(column.clone(), row.get(&column).cloned().unwrap_or(Value::Null));
            }
            map
        }
    };

    for (relation, columns) in query.embedded() {
        let foreign_key = format!("{}_id", relation.trim_end_matches('s'));
        let related = row.get(&foreign_key).and_then(|fk| {
            state
                .tables
                .get(&relation)?
                .iter()
                .find(|candidate| candidate.get("id").map(value_text) == Some(value_text(fk)))
        });
        let embedded = match related {
            Some(related) => {
                let mut map = Map::new();
                for column in &columns {
                    map.insert(column.clone(), related.get(column).cloned().unwrap_or(Value::Null));
                }
                Value::Object(map)
            }
            None => Value::Null,
        };
        out.insert(relation, embedded);
    }
    Value::Object(out)
}

#[async_trait]
impl Backend for MemoryBackend {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|account| account.password == password)
            .cloned()
            .ok_or_else(|| BackendError::Auth("Invalid login credentials".to_string()))?;
        Ok(state.issue_session(&account))
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<Option<Session>, BackendError> {
        let mut state = self.state.lock().await;
        let account = register(&mut state, email, password, metadata)?;
        if state.require_confirmation {
            return Ok(None);
        }
        Ok(Some(state.issue_session(&account)))
    }

    fn oauth_authorize_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String, BackendError> {
        authorize_url(MEMORY_BASE_URL, provider, redirect_to)
    }

    async fn session(&self) -> Option<Session> {
        self.state.lock().await.session.clone()
    }

    async fn set_session(&self, session: Option<Session>) {
        self.state.lock().await.session = session;
    }

    async fn refresh_session(&self) -> Result<Session, BackendError> {
        let mut state = self.state.lock().await;
        let email = state
            .session
            .as_ref()
            .filter(|s| s.refresh_token.is_some())
            .and_then(|s| s.user.email.clone())
            .ok_or_else(|| BackendError::Auth("no refresh token".to_string()))?;
        let account = state
            .accounts
            .get(&email)
            .cloned()
            .ok_or_else(|| BackendError::Auth("account no longer exists".to_string()))?;
        Ok(state.issue_session(&account))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.state.lock().await.session = None;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        let email = state
            .session
            .as_ref()
            .and_then(|s| s.user.email.clone())
            .ok_or_else(|| BackendError::Auth("not signed in".to_string()))?;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or_else(|| BackendError::NotFound(format!("account {email}")))?;
        account.password = new_password.to_string();
        Ok(())
    }

    async fn send_password_reset(&self, _email: &str, _redirect_to: &str) -> Result<(), BackendError> {
        // The hosted service answers the same way whether or not the address exists.
        Ok(())
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let state = self.state.lock().await;
        state.check_readable(table)?;
        let mut rows: Vec<&Value> = state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| row_matches(row, &query.filters)).collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                );
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows.into_iter().take(limit).map(|row| project(&state, row, query)).collect())
    }

    async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, BackendError> {
        let state = self.state.lock().await;
        state.check_readable(table)?;
        Ok(state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| row_matches(row, filters)).count() as u64)
            .unwrap_or(0))
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Value, BackendError> {
        let mut state = self.state.lock().await;
        state.check_writable(table)?;
        if !row.is_object() {
            return Err(BackendError::InvalidData(format!("row for '{table}' must be an object")));
        }
        fill_defaults(&mut state, &mut row);
        state.table_mut(table).push(row.clone());
        Ok(row)
    }

    async fn upsert(&self, table: &str, mut row: Value) -> Result<Value, BackendError> {
        let mut state = self.state.lock().await;
        state.check_writable(table)?;
        let id = row.get("id").map(value_text);
        if let Some(id) = id {
            if let Some(existing) = state
                .table_mut(table)
                .iter_mut()
                .find(|candidate| candidate.get("id").map(value_text).as_deref() == Some(id.as_str()))
            {
                merge(existing, &row);
                return Ok(existing.clone());
            }
        }
        fill_defaults(&mut state, &mut row);
        state.table_mut(table).push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, BackendError> {
        let mut state = self.state.lock().await;
        state.check_writable(table)?;
        let mut updated = Vec::new();
        for row in state.table_mut(table).iter_mut().filter(|row| row_matches(row, filters)) {
            merge(row, &patch);
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), BackendError> {
        if filters.is_empty() {
            return Err(BackendError::InvalidData(format!("refusing unfiltered delete on '{table}'")));
        }
        let mut state = self.state.lock().await;
        state.check_writable(table)?;
        state.table_mut(table).retain(|row| !row_matches(row, filters));
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, BackendError> {
        let mut state = self.state.lock().await;
        if state.rpc_unavailable {
            return Err(BackendError::NotFound(format!("function {function} is not deployed")));
        }
        match function {
            RPC_INCREMENT_DOWNLOAD_STATS => state.increment_profile_column(&args, "download_count"),
            RPC_INCREMENT_LOGIN_COUNT => state.increment_profile_column(&args, "login_count"),
            other => Err(BackendError::NotFound(format!("function {other}"))),
        }
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.check_writable(bucket)?;
        let key = object_key(bucket, path);
        if !upsert && state.objects.contains_key(&key) {
            return Err(BackendError::InvalidData("The resource already exists".to_string()));
        }
        state.objects.insert(key, bytes);
        Ok(())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, BackendError> {
        let state = self.state.lock().await;
        state.check_readable(bucket)?;
        state
            .objects
            .get(&object_key(bucket, path))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("object {bucket}/{path}")))
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.check_writable(bucket)?;
        for path in paths {
            state.objects.remove(&object_key(bucket, path));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            MEMORY_BASE_URL,
            bucket,
            path.trim_start_matches('/')
        )
    }
}
