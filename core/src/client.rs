//! The Hakuna API client.
//!
//! # Design
//! `HakunaClient` holds the immutable `ClientConfig`, the transport and the
//! personal-user flag. Clones share all three. Each endpoint method builds a
//! `RequestDescriptor`, composes it against the current personal user right
//! away and returns a `Call`; the transport is only invoked once the call is
//! awaited or handed a callback.
//!
//! The personal-user flag is last-write-wins. A call picks up whatever value
//! is set when the endpoint method runs, so callers that switch users while
//! other calls are being created must order those steps themselves.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDate;
use serde_json::Value;
use url::form_urlencoded;

use crate::compose::{compose, AUTH_TOKEN_HEADER};
use crate::config::ClientConfig;
use crate::dispatch::{dispatch, Call};
use crate::error::ApiError;
use crate::http::{HttpMethod, RequestDescriptor};
use crate::transport::Transport;
use crate::types::{NewTimeEntry, StartTimer, StopTimer, TimeEntryUpdate};

/// Asynchronous client for the Hakuna time-tracking API.
#[derive(Clone)]
pub struct HakunaClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    personal_user: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for HakunaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HakunaClient")
            .field("base_url", &self.config.base_url())
            .field("personal_user", &self.personal_user())
            .finish_non_exhaustive()
    }
}

impl HakunaClient {
    pub fn new(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            personal_user: Arc::new(RwLock::new(None)),
        }
    }

    /// Builds a client on top of a default `ReqwestTransport`.
    #[cfg(feature = "reqwest")]
    pub fn with_reqwest(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(config, crate::transport::ReqwestTransport::new()?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Scopes personal resources (timer, time entries, absences, users,
    /// overview) to `user_id` for every call created from now on. An empty
    /// id turns personal mode off.
    pub fn set_personal_user_mode(&self, user_id: impl Into<String>) {
        let user_id = Some(user_id.into()).filter(|u| !u.is_empty());
        *self.personal_user.write().unwrap_or_else(PoisonError::into_inner) = user_id;
    }

    pub fn reset_personal_user_mode(&self) {
        *self.personal_user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn personal_user(&self) -> Option<String> {
        self.personal_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sends an arbitrary request through the dispatcher.
    ///
    /// Resolves to `None` for a successful DELETE and to the decoded body
    /// otherwise.
    pub fn request(&self, descriptor: RequestDescriptor) -> Call<Option<Value>> {
        let request = compose(&self.config, descriptor, self.personal_user().as_deref());
        let transport = Arc::clone(&self.transport);
        Call::new(dispatch(transport, request))
    }

    fn json(&self, descriptor: RequestDescriptor) -> Call<Value> {
        self.request(descriptor).map(Option::unwrap_or_default)
    }

    fn json_body<T: serde::Serialize>(&self, method: HttpMethod, path: String, payload: &T) -> Call<Value> {
        match RequestDescriptor::new(method, path).json(payload) {
            Ok(descriptor) => self.json(descriptor),
            Err(err) => Call::failed(err),
        }
    }

    fn status_only(&self, path: String) -> Call<()> {
        self.request(RequestDescriptor::delete(path)).map(|_| ())
    }

    // ---------------------------------------------------------------------
    // Overview & users
    // ---------------------------------------------------------------------

    pub fn overview(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/overview"))
    }

    pub fn get_own_user(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/users/me"))
    }

    pub fn list_manageable_users(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/users"))
    }

    // ---------------------------------------------------------------------
    // Timer
    // ---------------------------------------------------------------------

    pub fn get_timer(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/timer"))
    }

    pub fn start_timer(&self, start: &StartTimer) -> Call<Value> {
        self.json_body(HttpMethod::Post, "/timer".to_string(), start)
    }

    pub fn stop_timer(&self, stop: &StopTimer) -> Call<Value> {
        self.json_body(HttpMethod::Put, "/timer".to_string(), stop)
    }

    pub fn cancel_timer(&self) -> Call<()> {
        self.status_only("/timer".to_string())
    }

    // ---------------------------------------------------------------------
    // Time entries
    // ---------------------------------------------------------------------

    pub fn list_time_entries(&self, date: NaiveDate) -> Call<Value> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("date", &date.format("%Y-%m-%d").to_string())
            .finish();
        self.json(RequestDescriptor::get(format!("/time_entries?{query}")))
    }

    pub fn get_time_entry(&self, id: u64) -> Call<Value> {
        self.json(RequestDescriptor::get(format!("/time_entries/{id}")))
    }

    pub fn create_time_entry(&self, entry: &NewTimeEntry) -> Call<Value> {
        self.json_body(HttpMethod::Post, "/time_entries".to_string(), entry)
    }

    /// Patches the entry identified by `update.id` with the remaining fields.
    pub fn update_time_entry(&self, update: &TimeEntryUpdate) -> Call<Value> {
        self.json_body(HttpMethod::Patch, format!("/time_entries/{}", update.id), update)
    }

    pub fn delete_time_entry(&self, id: u64) -> Call<()> {
        self.status_only(format!("/time_entries/{id}"))
    }

    // ---------------------------------------------------------------------
    // Absences, projects, catalogues
    // ---------------------------------------------------------------------

    pub fn list_absences(&self, year: i32) -> Call<Value> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("year", &year.to_string())
            .finish();
        self.json(RequestDescriptor::get(format!("/absences?{query}")))
    }

    pub fn list_projects(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/projects"))
    }

    pub fn list_time_types(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/time_types"))
    }

    pub fn list_tasks(&self) -> Call<Value> {
        self.json(RequestDescriptor::get("/tasks"))
    }

    /// Organization-wide presence status. `api_key` replaces the client's
    /// token for this call only.
    pub fn organization_status(&self, api_key: Option<&str>) -> Call<Value> {
        let mut descriptor = RequestDescriptor::get("/organization/status");
        if let Some(key) = api_key {
            descriptor = descriptor.header(AUTH_TOKEN_HEADER, key);
        }
        self.json(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed response.
    #[derive(Clone)]
    struct StubTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        status: u16,
        body: String,
    }

    impl StubTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                status,
                body: body.to_string(),
            }
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().expect("no request sent")
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::new("connection refused"))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .auth_token("secret")
            .tenant("acme")
            .build()
            .unwrap()
    }

    fn client(status: u16, body: &str) -> (HakunaClient, StubTransport) {
        let stub = StubTransport::new(status, body);
        (HakunaClient::new(config(), stub.clone()), stub)
    }

    const BASE: &str = "https://acme.hakuna.ch/api/v1";

    #[tokio::test]
    async fn get_timer_sends_auth_headers() {
        let (c, stub) = client(200, r#"{"duration":"00:10"}"#);
        let timer = c.get_timer().await.unwrap();
        assert_eq!(timer["duration"], "00:10");

        let req = stub.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE}/timer"));
        assert_eq!(req.header("X-Auth-Token"), Some("secret"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn personal_mode_scopes_personal_paths_only() {
        let (c, stub) = client(200, "[]");
        c.set_personal_user_mode("17");

        c.get_timer().await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/timer?user_id=17"));

        c.list_projects().await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/projects"));

        c.reset_personal_user_mode();
        c.get_timer().await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/timer"));
    }

    #[tokio::test]
    async fn personal_mode_is_captured_when_the_call_is_created() {
        let (c, stub) = client(200, "{}");
        c.set_personal_user_mode("17");
        let pending = c.overview();
        c.reset_personal_user_mode();
        pending.await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/overview?user_id=17"));
    }

    #[tokio::test]
    async fn empty_personal_user_disables_personal_mode() {
        let (c, stub) = client(200, "{}");
        c.set_personal_user_mode("17");
        c.set_personal_user_mode("");
        assert_eq!(c.personal_user(), None);

        c.get_timer().await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/timer"));
    }

    #[tokio::test]
    async fn clones_share_personal_mode() {
        let (c, _stub) = client(200, "{}");
        let other = c.clone();
        other.set_personal_user_mode("3");
        assert_eq!(c.personal_user().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn list_time_entries_joins_user_id_to_date_query() {
        let (c, stub) = client(200, "[]");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        c.list_time_entries(date).await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/time_entries?date=2024-03-01"));

        c.set_personal_user_mode("17");
        c.list_time_entries(date).await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/time_entries?date=2024-03-01&user_id=17"));
    }

    #[tokio::test]
    async fn list_absences_uses_year_query() {
        let (c, stub) = client(200, "[]");
        c.list_absences(2024).await.unwrap();
        assert_eq!(stub.last().url, format!("{BASE}/absences?year=2024"));
    }

    #[tokio::test]
    async fn create_time_entry_writes_wire_keys() {
        let (c, stub) = client(200, r#"{"id":99}"#);
        let entry: NewTimeEntry = serde_json::from_value(json!({"taskId": 5, "note": "x"})).unwrap();

        let created = c.create_time_entry(&entry).await.unwrap();
        assert_eq!(created["id"], 99);

        let req = stub.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE}/time_entries"));
        assert_eq!(req.body.as_deref(), Some(r#"{"task_id":5,"note":"x"}"#));
    }

    #[tokio::test]
    async fn update_time_entry_patches_by_id() {
        let (c, stub) = client(200, r#"{"id":7}"#);
        let update: TimeEntryUpdate = serde_json::from_value(json!({"id": 7, "projectId": 3})).unwrap();

        c.update_time_entry(&update).await.unwrap();

        let req = stub.last();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, format!("{BASE}/time_entries/7"));
        assert_eq!(req.body.as_deref(), Some(r#"{"project_id":3}"#));
    }

    #[tokio::test]
    async fn start_and_stop_timer_bodies() {
        let (c, stub) = client(200, "{}");
        c.start_timer(&StartTimer::task(12)).await.unwrap();
        assert_eq!(stub.last().method, HttpMethod::Post);
        assert_eq!(stub.last().body.as_deref(), Some(r#"{"task_id":12}"#));

        let stop = StopTimer {
            end_time: Some("17:30".to_string()),
        };
        c.stop_timer(&stop).await.unwrap();
        assert_eq!(stub.last().method, HttpMethod::Put);
        assert_eq!(stub.last().body.as_deref(), Some(r#"{"end_time":"17:30"}"#));
    }

    #[tokio::test]
    async fn delete_time_entry_success_and_failure() {
        let (c, stub) = client(200, "");
        c.delete_time_entry(7).await.unwrap();
        assert_eq!(stub.last().method, HttpMethod::Delete);
        assert_eq!(stub.last().url, format!("{BASE}/time_entries/7"));

        let (c, _stub) = client(404, r#"{"error":"not found"}"#);
        let err = c.delete_time_entry(7).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404 }));
    }

    #[tokio::test]
    async fn cancel_timer_is_status_only() {
        let (c, stub) = client(500, "");
        let err = c.cancel_timer().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(stub.last().url, format!("{BASE}/timer"));
    }

    #[tokio::test]
    async fn application_error_surfaces_body() {
        let (c, _stub) = client(200, r#"{"error":"Timer already running"}"#);
        let err = c.start_timer(&StartTimer::task(1)).await.unwrap_err();
        assert_eq!(err.body(), Some(&json!({"error": "Timer already running"})));
    }

    #[tokio::test]
    async fn organization_status_key_override() {
        let (c, stub) = client(200, "[]");
        c.organization_status(None).await.unwrap();
        assert_eq!(stub.last().header("X-Auth-Token"), Some("secret"));

        c.organization_status(Some("org-key")).await.unwrap();
        let req = stub.last();
        assert_eq!(req.url, format!("{BASE}/organization/status"));
        assert_eq!(req.header("X-Auth-Token"), Some("org-key"));
        assert_eq!(req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("x-auth-token")).count(), 1);
    }

    #[tokio::test]
    async fn catalogue_paths() {
        let (c, stub) = client(200, "[]");
        c.set_personal_user_mode("17");
        let cases: Vec<(Call<Value>, &str)> = vec![
            (c.list_manageable_users(), "/users?user_id=17"),
            (c.get_own_user(), "/users/me?user_id=17"),
            (c.list_time_types(), "/time_types"),
            (c.list_tasks(), "/tasks"),
            (c.get_time_entry(4), "/time_entries/4?user_id=17"),
        ];
        for (call, path) in cases {
            call.await.unwrap();
            assert_eq!(stub.last().url, format!("{BASE}{path}"));
        }
    }

    #[tokio::test]
    async fn transport_failure_reaches_both_channels() {
        let c = HakunaClient::new(config(), FailingTransport);
        let err = c.get_timer().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));

        let (tx, rx) = tokio::sync::oneshot::channel();
        c.get_timer().on_complete(move |r| {
            let _ = tx.send(r);
        });
        assert!(matches!(rx.await.unwrap(), Err(ApiError::Transport(_))));
    }

    #[tokio::test]
    async fn callback_receives_decoded_body() {
        let (c, _stub) = client(200, r#"{"user":{"id":1}}"#);
        let (tx, rx) = tokio::sync::oneshot::channel();
        c.overview().on_complete(move |r| {
            let _ = tx.send(r);
        });
        let body = rx.await.unwrap().unwrap();
        assert_eq!(body["user"]["id"], 1);
    }
}
