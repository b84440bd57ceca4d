#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

/// One stored list on the mock server.
#[derive(Debug, Clone)]
pub struct MockList {
    pub id: u64,
    pub name: String,
    pub entries: Vec<(u64, Option<u64>)>,
}

/// Mock server state. Each server instance is isolated, safe for parallel tests.
#[derive(Debug)]
pub struct Db {
    pub signed_in: bool,
    /// Answer every request with the HTML sign-in page and a 200.
    pub login_page: bool,
    /// Insert the entry, then reject the POST as a duplicate, the way a
    /// concurrent add from another tab looks from this client.
    pub race_on_add: bool,
    pub add_posts: usize,
    pub delete_calls: usize,
    pub next_id: u64,
    pub lists: Vec<MockList>,
}

impl Default for Db {
    fn default() -> Self {
        Self {
            signed_in: true,
            login_page: false,
            race_on_add: false,
            add_posts: 0,
            delete_calls: 0,
            next_id: 1,
            lists: Vec::new(),
        }
    }
}

type Shared = Arc<Mutex<Db>>;

/// Catalog fixture: sound 5 has two variants, sound 6 has none.
pub fn sound_json(id: u64) -> Value {
    match id {
        5 => json!({
            "id": 5,
            "name": "Sword Clash",
            "category_id": 2,
            "category_name": "Combat",
            "file_path": "combat/clash.mp3",
            "is_active": true,
            "variants": [
                {"id": 9, "file_path": "combat/clash_loud.mp3", "label": "Loud"},
                {"id": 10, "file_path": "combat/clash_soft.mp3", "label": null}
            ]
        }),
        _ => json!({
            "id": id,
            "name": format!("Sound {}", id),
            "category_id": 1,
            "category_name": "Ambience",
            "file_path": format!("ambience/{}.mp3", id),
            "is_active": true,
            "variants": []
        }),
    }
}

fn variant_fields(sound_id: u64, variant_id: Option<u64>) -> (Value, Value) {
    let Some(variant_id) = variant_id else {
        return (Value::Null, Value::Null);
    };
    let sound = sound_json(sound_id);
    let variant = sound["variants"]
        .as_array()
        .and_then(|vs| vs.iter().find(|v| v["id"] == variant_id).cloned())
        .unwrap_or(Value::Null);
    let url = variant["file_path"]
        .as_str()
        .map(|p| Value::String(format!("/static/audio/{}", p)))
        .unwrap_or(Value::Null);
    (url, variant["label"].clone())
}

fn list_json(list: &MockList) -> Value {
    let sounds: Vec<Value> = list
        .entries
        .iter()
        .enumerate()
        .map(|(i, (sound_id, variant_id))| {
            let (variant_url, variant_label) = variant_fields(*sound_id, *variant_id);
            json!({
                "id": i + 100,
                "session_list_id": list.id,
                "sound_id": sound_id,
                "sound_variant_id": variant_id,
                "sort_order": i,
                "sound": sound_json(*sound_id),
                "variant_url": variant_url,
                "variant_label": variant_label,
            })
        })
        .collect();
    json!({
        "id": list.id,
        "user_id": 1,
        "name": list.name,
        "created_at": "2026-01-01T00:00:00",
        "updated_at": "2026-01-01T00:00:00",
        "sounds": sounds,
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn gate(db: &Db) -> Option<Response> {
    if db.login_page {
        return Some(
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                "<html><body>Log in</body></html>",
            )
                .into_response(),
        );
    }
    if !db.signed_in {
        return Some(error(StatusCode::UNAUTHORIZED, "Authentication required"));
    }
    None
}

fn find(db: &mut Db, id: u64) -> Option<&mut MockList> {
    db.lists.iter_mut().find(|l| l.id == id)
}

#[derive(Deserialize)]
struct NameBody {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct AddBody {
    sound_id: u64,
    #[serde(default)]
    sound_variant_id: Option<u64>,
}

#[derive(Deserialize)]
struct ReorderBody {
    sound_ids: Vec<u64>,
}

async fn all_lists(State(db): State<Shared>) -> Response {
    let db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    let lists: Vec<Value> = db.lists.iter().map(list_json).collect();
    Json(json!({ "session_lists": lists })).into_response()
}

async fn create_list(State(db): State<Shared>, Json(body): Json<NameBody>) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "List name is required");
    }
    let list = MockList {
        id: db.next_id,
        name,
        entries: Vec::new(),
    };
    db.next_id += 1;
    db.lists.push(list.clone());
    (StatusCode::CREATED, Json(list_json(&list))).into_response()
}

async fn get_list(State(db): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    match find(&mut db, id) {
        Some(list) => Json(list_json(list)).into_response(),
        None => error(StatusCode::NOT_FOUND, "Session list not found"),
    }
}

async fn rename_list(
    State(db): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<NameBody>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    match find(&mut db, id) {
        Some(list) => {
            // Blank names leave the list as it was.
            let name = body.name.trim();
            if !name.is_empty() {
                list.name = name.to_string();
            }
            Json(list_json(list)).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Session list not found"),
    }
}

async fn delete_list(State(db): State<Shared>, Path(id): Path<u64>) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    db.delete_calls += 1;
    let before = db.lists.len();
    db.lists.retain(|l| l.id != id);
    if db.lists.len() == before {
        return error(StatusCode::NOT_FOUND, "Session list not found");
    }
    Json(json!({ "message": "Session list deleted" })).into_response()
}

async fn add_sound(
    State(db): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<AddBody>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    db.add_posts += 1;
    let race = db.race_on_add;
    let Some(list) = find(&mut db, id) else {
        return error(StatusCode::NOT_FOUND, "Session list not found");
    };
    let entry = (body.sound_id, body.sound_variant_id);
    if race {
        list.entries.push(entry);
        return error(StatusCode::BAD_REQUEST, "Sound already in the list");
    }
    if list.entries.contains(&entry) {
        return error(StatusCode::BAD_REQUEST, "Sound already in the list");
    }
    list.entries.push(entry);
    (StatusCode::CREATED, Json(json!({ "message": "Sound added" }))).into_response()
}

async fn remove_sound(
    State(db): State<Shared>,
    Path((id, sound_id)): Path<(u64, u64)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    let variant_id = query.get("variant_id").and_then(|v| v.parse::<u64>().ok());
    let Some(list) = find(&mut db, id) else {
        return error(StatusCode::NOT_FOUND, "Session list not found");
    };
    let position = list
        .entries
        .iter()
        .position(|e| *e == (sound_id, variant_id))
        .or_else(|| list.entries.iter().position(|(s, _)| *s == sound_id));
    match position {
        Some(index) => {
            list.entries.remove(index);
            Json(json!({ "message": "Sound removed" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Sound not in list"),
    }
}

async fn reorder_sounds(
    State(db): State<Shared>,
    Path(id): Path<u64>,
    Json(body): Json<ReorderBody>,
) -> Response {
    let mut db = db.lock().unwrap();
    if let Some(r) = gate(&db) {
        return r;
    }
    let Some(list) = find(&mut db, id) else {
        return error(StatusCode::NOT_FOUND, "Session list not found");
    };
    // Only the first entry of each listed sound takes the new position;
    // any other entry of that sound keeps its old one.
    let mut sort_orders: Vec<usize> = (0..list.entries.len()).collect();
    for (position, sound_id) in body.sound_ids.iter().enumerate() {
        if let Some(index) = list.entries.iter().position(|(s, _)| s == sound_id) {
            sort_orders[index] = position;
        }
    }
    let mut ordered: Vec<(usize, (u64, Option<u64>))> =
        sort_orders.into_iter().zip(list.entries.iter().cloned()).collect();
    ordered.sort_by_key(|(order, _)| *order);
    list.entries = ordered.into_iter().map(|(_, entry)| entry).collect();
    Json(list_json(list)).into_response()
}

/// Session-list API served on an ephemeral local port.
pub struct MockServer {
    pub base_url: String,
    pub db: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        let db: Shared = Arc::new(Mutex::new(Db::default()));
        let app = Router::new()
            .route("/api/session-lists", get(all_lists).post(create_list))
            .route(
                "/api/session-lists/{id}",
                get(get_list).put(rename_list).delete(delete_list),
            )
            .route("/api/session-lists/{id}/sounds", post(add_sound))
            .route("/api/session-lists/{id}/sounds/reorder", put(reorder_sounds))
            .route("/api/session-lists/{id}/sounds/{sound_id}", delete(remove_sound))
            .with_state(Arc::clone(&db));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            db,
        }
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        self.db.lock().unwrap().signed_in = signed_in;
    }

    pub fn set_login_page(&self, login_page: bool) {
        self.db.lock().unwrap().login_page = login_page;
    }

    pub fn set_race_on_add(&self, race: bool) {
        self.db.lock().unwrap().race_on_add = race;
    }

    pub fn add_posts(&self) -> usize {
        self.db.lock().unwrap().add_posts
    }

    pub fn delete_calls(&self) -> usize {
        self.db.lock().unwrap().delete_calls
    }

    pub fn entries(&self, id: u64) -> Vec<(u64, Option<u64>)> {
        let db = self.db.lock().unwrap();
        db.lists
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.entries.clone())
            .unwrap_or_default()
    }
}

/// Decodes the catalog fixture into the library's sound type.
pub fn sound(id: u64) -> sfxdeck_core::catalog::Sound {
    serde_json::from_value(sound_json(id)).expect("fixture sound decodes")
}
