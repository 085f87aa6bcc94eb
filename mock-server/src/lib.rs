//! In-memory imitation of the Hakuna API for local development and tests.
//!
//! Routes live under `/api/v1`. Every request must carry a valid
//! `X-Auth-Token`; failures are answered with a JSON `{"error": ...}` body
//! the way the real service does. Personal resources honour a `user_id`
//! query parameter and default to the token owner (user `1`).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const AUTH_TOKEN: &str = "mock-token";
pub const ORGANIZATION_TOKEN: &str = "org-token";
pub const OWN_USER_ID: &str = "1";

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub auth_token: String,
    pub organization_token: String,
    /// Date stamped on entries created by stopping the timer.
    pub today: NaiveDate,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            auth_token: AUTH_TOKEN.to_string(),
            organization_token: ORGANIZATION_TOKEN.to_string(),
            today: Local::now().date_naive(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Timer {
    pub user_id: String,
    pub date: String,
    pub start_time: String,
    pub task_id: Option<u64>,
    pub time_type_id: Option<u64>,
    pub project_id: Option<u64>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TimeEntry {
    pub id: u64,
    pub user_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub task_id: Option<u64>,
    pub time_type_id: Option<u64>,
    pub project_id: Option<u64>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct StartTimer {
    pub task_id: Option<u64>,
    pub time_type_id: Option<u64>,
    pub start_time: Option<String>,
    pub project_id: Option<u64>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct StopTimer {
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct NewTimeEntry {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub task_id: Option<u64>,
    pub time_type_id: Option<u64>,
    pub project_id: Option<u64>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct PatchTimeEntry {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub task_id: Option<u64>,
    pub time_type_id: Option<u64>,
    pub project_id: Option<u64>,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct Scope {
    pub user_id: Option<String>,
    pub date: Option<String>,
    pub year: Option<i32>,
}

impl Scope {
    fn user(&self) -> String {
        self.user_id.clone().unwrap_or_else(|| OWN_USER_ID.to_string())
    }
}

#[derive(Default)]
pub struct Store {
    timers: HashMap<String, Timer>,
    entries: BTreeMap<u64, TimeEntry>,
    next_id: u64,
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<MockConfig>,
    store: Arc<RwLock<Store>>,
}

type ApiResult = Result<Response, Response>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn ok<T: Serialize>(value: T) -> ApiResult {
    Ok(Json(value).into_response())
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(RwLock::new(Store::default())),
    };
    let api = Router::new()
        .route("/overview", get(overview))
        .route("/users", get(list_users))
        .route("/users/me", get(own_user))
        .route(
            "/timer",
            get(get_timer).post(start_timer).put(stop_timer).delete(cancel_timer),
        )
        .route("/time_entries", get(list_time_entries).post(create_time_entry))
        .route(
            "/time_entries/{id}",
            get(get_time_entry).patch(update_time_entry).delete(delete_time_entry),
        )
        .route("/absences", get(list_absences))
        .route("/projects", get(list_projects))
        .route("/time_types", get(list_time_types))
        .route("/tasks", get(list_tasks))
        .route("/organization/status", get(organization_status))
        .layer(middleware::from_fn_with_state(state.clone(), authorize))
        .with_state(state);
    Router::new().nest("/api/v1", api)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn token(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-auth-token").and_then(|v| v.to_str().ok())
}

async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let valid = match token(request.headers()) {
        Some(t) if t == state.config.auth_token => true,
        Some(t) if t == state.config.organization_token => {
            request.uri().path().ends_with("/organization/status")
        }
        _ => false,
    };
    if !valid {
        return error(StatusCode::UNAUTHORIZED, "Invalid or missing X-Auth-Token");
    }
    next.run(request).await
}

async fn overview(Query(scope): Query<Scope>, State(state): State<AppState>) -> ApiResult {
    let user = scope.user();
    let store = state.store.read().await;
    let entries = store.entries.values().filter(|e| e.user_id == user).count();
    let timer_running = store.timers.contains_key(&user);
    ok(json!({
        "user_id": user,
        "entries": entries,
        "timer_running": timer_running,
    }))
}

async fn own_user(Query(scope): Query<Scope>) -> ApiResult {
    let user = scope.user();
    ok(json!({ "id": user, "name": format!("User {user}") }))
}

async fn list_users() -> ApiResult {
    ok(json!([
        { "id": "1", "name": "User 1" },
        { "id": "2", "name": "User 2" },
    ]))
}

async fn get_timer(Query(scope): Query<Scope>, State(state): State<AppState>) -> ApiResult {
    let store = state.store.read().await;
    match store.timers.get(&scope.user()) {
        Some(timer) => ok(timer),
        None => Err(error(StatusCode::NOT_FOUND, "No timer running")),
    }
}

async fn start_timer(
    Query(scope): Query<Scope>,
    State(state): State<AppState>,
    Json(input): Json<StartTimer>,
) -> ApiResult {
    let user = scope.user();
    let mut store = state.store.write().await;
    if store.timers.contains_key(&user) {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "Timer already running"));
    }
    let timer = Timer {
        user_id: user.clone(),
        date: state.config.today.to_string(),
        start_time: input.start_time.unwrap_or_else(|| Local::now().format("%H:%M").to_string()),
        task_id: input.task_id,
        time_type_id: input.time_type_id,
        project_id: input.project_id,
        note: input.note,
    };
    store.timers.insert(user, timer.clone());
    Ok((StatusCode::CREATED, Json(timer)).into_response())
}

async fn stop_timer(
    Query(scope): Query<Scope>,
    State(state): State<AppState>,
    Json(input): Json<StopTimer>,
) -> ApiResult {
    let mut store = state.store.write().await;
    let timer = store
        .timers
        .remove(&scope.user())
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "No timer running"))?;
    store.next_id += 1;
    let entry = TimeEntry {
        id: store.next_id,
        user_id: timer.user_id,
        date: timer.date,
        start_time: timer.start_time,
        end_time: input.end_time.unwrap_or_else(|| Local::now().format("%H:%M").to_string()),
        task_id: timer.task_id,
        time_type_id: timer.time_type_id,
        project_id: timer.project_id,
        note: timer.note,
    };
    store.entries.insert(entry.id, entry.clone());
    ok(entry)
}

async fn cancel_timer(Query(scope): Query<Scope>, State(state): State<AppState>) -> StatusCode {
    match state.store.write().await.timers.remove(&scope.user()) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn list_time_entries(Query(scope): Query<Scope>, State(state): State<AppState>) -> ApiResult {
    let Some(date) = scope.date.as_deref() else {
        return Err(error(StatusCode::BAD_REQUEST, "date is required"));
    };
    let user = scope.user();
    let store = state.store.read().await;
    let entries: Vec<&TimeEntry> = store
        .entries
        .values()
        .filter(|e| e.user_id == user && e.date == date)
        .collect();
    ok(entries)
}

async fn create_time_entry(
    Query(scope): Query<Scope>,
    State(state): State<AppState>,
    Json(input): Json<NewTimeEntry>,
) -> ApiResult {
    let mut store = state.store.write().await;
    store.next_id += 1;
    let entry = TimeEntry {
        id: store.next_id,
        user_id: scope.user(),
        date: input.date,
        start_time: input.start_time,
        end_time: input.end_time,
        task_id: input.task_id,
        time_type_id: input.time_type_id,
        project_id: input.project_id,
        note: input.note,
    };
    store.entries.insert(entry.id, entry.clone());
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

async fn get_time_entry(
    Path(id): Path<u64>,
    Query(scope): Query<Scope>,
    State(state): State<AppState>,
) -> ApiResult {
    let store = state.store.read().await;
    match store.entries.get(&id).filter(|e| e.user_id == scope.user()) {
        Some(entry) => ok(entry),
        None => Err(error(StatusCode::NOT_FOUND, "Time entry not found")),
    }
}

async fn update_time_entry(
    Path(id): Path<u64>,
    Query(scope): Query<Scope>,
    State(state): State<AppState>,
    Json(input): Json<PatchTimeEntry>,
) -> ApiResult {
    let mut store = state.store.write().await;
    let entry = store
        .entries
        .get_mut(&id)
        .filter(|e| e.user_id == scope.user())
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Time entry not found"))?;
    if let Some(date) = input.date {
        entry.date = date;
    }
    if let Some(start_time) = input.start_time {
        entry.start_time = start_time;
    }
    if let Some(end_time) = input.end_time {
        entry.end_time = end_time;
    }
    if input.task_id.is_some() {
        entry.task_id = input.task_id;
    }
    if input.time_type_id.is_some() {
        entry.time_type_id = input.time_type_id;
    }
    if input.project_id.is_some() {
        entry.project_id = input.project_id;
    }
    if input.note.is_some() {
        entry.note = input.note;
    }
    ok(entry.clone())
}

async fn delete_time_entry(
    Path(id): Path<u64>,
    Query(scope): Query<Scope>,
    State(state): State<AppState>,
) -> StatusCode {
    let mut store = state.store.write().await;
    if store.entries.get(&id).is_some_and(|e| e.user_id == scope.user()) {
        store.entries.remove(&id);
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn list_absences(Query(scope): Query<Scope>) -> ApiResult {
    let Some(year) = scope.year else {
        return Err(error(StatusCode::BAD_REQUEST, "year is required"));
    };
    ok(json!([{
        "user_id": scope.user(),
        "start_date": format!("{year}-07-15"),
        "end_date": format!("{year}-07-26"),
        "absence_type": { "name": "Vacation" },
    }]))
}

async fn list_projects() -> ApiResult {
    ok(json!([{ "id": 1, "name": "Internal" }, { "id": 2, "name": "Client work" }]))
}

async fn list_time_types() -> ApiResult {
    ok(json!([{ "id": 1, "name": "Work" }, { "id": 2, "name": "Meeting" }]))
}

async fn list_tasks() -> ApiResult {
    ok(json!([{ "id": 1, "name": "Development" }, { "id": 2, "name": "Support" }]))
}

async fn organization_status(headers: HeaderMap, State(state): State<AppState>) -> ApiResult {
    let by_organization = token(&headers) == Some(state.config.organization_token.as_str());
    let store = state.store.read().await;
    let users: Vec<Value> = ["1", "2"]
        .iter()
        .map(|id| json!({ "user": { "id": id }, "has_timer_running": store.timers.contains_key(*id) }))
        .collect();
    ok(json!({ "organization_key": by_organization, "users": users }))
}
