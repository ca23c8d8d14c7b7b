//! In-memory stand-in for the appLariat API.
//!
//! Stores each table as a map of JSON documents keyed by `id`. Reads are
//! wrapped in `{"data": ...}`. Creates answer `{"data": "<id>"}`. Updates
//! and deletes answer with bulk-result counters.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const TABLES: [&str; 2] = ["users", "policy_schedules"];

/// Fields a client may send but the server never stores.
const WRITE_ONLY: [(&str, &str); 1] = [("users", "password")];

pub type Document = Map<String, Value>;
pub type Db = Arc<RwLock<HashMap<String, HashMap<String, Document>>>>;

/// Counters reported by update and delete.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    pub skipped: u64,
    pub deleted: u64,
    pub unchanged: u64,
    pub replaced: u64,
    pub errors: u64,
}

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (status, Json(json!({ "message": message.into() })))
}

pub fn new_db() -> Db {
    let tables: HashMap<String, HashMap<String, Document>> = TABLES
        .iter()
        .map(|t| (t.to_string(), HashMap::new()))
        .collect();
    Arc::new(RwLock::new(tables))
}

pub fn app() -> Router {
    app_with(new_db())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/{table}", get(list_rows).post(create_row))
        .route(
            "/{table}/{id}",
            get(get_row).put(update_row).patch(update_row).delete(delete_row),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn strip_write_only(table: &str, doc: &mut Document) {
    for (t, field) in WRITE_ONLY {
        if t == table {
            doc.remove(field);
        }
    }
}

/// Exact match of every query pair against the row's scalar fields.
fn matches(doc: &Document, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(key, want)| match doc.get(key) {
        Some(Value::String(s)) => s == want,
        Some(Value::Number(n)) => n.to_string() == *want,
        Some(Value::Bool(b)) => b.to_string() == *want,
        _ => false,
    })
}

fn into_object(body: Value) -> Result<Document, Failure> {
    match body {
        Value::Object(doc) => Ok(doc),
        _ => Err(failure(StatusCode::BAD_REQUEST, "body must be a JSON object")),
    }
}

async fn list_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    Query(filters): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    let db = db.read().await;
    let rows = db
        .get(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("unknown table {table}")))?;
    let data: Vec<&Document> = rows.values().filter(|doc| matches(doc, &filters)).collect();
    debug!(%table, ?filters, count = data.len(), "list");
    Ok(Json(json!({ "data": data })))
}

async fn create_row(
    State(db): State<Db>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut doc = into_object(body)?;
    let mut db = db.write().await;
    let rows = db
        .get_mut(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("unknown table {table}")))?;

    let id = match doc.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => Uuid::new_v4().to_string(),
        Some(_) => return Err(failure(StatusCode::BAD_REQUEST, "id must be a string")),
    };
    if rows.contains_key(&id) {
        return Err(failure(StatusCode::CONFLICT, format!("duplicate id {id}")));
    }

    strip_write_only(&table, &mut doc);
    let stamp = now();
    doc.insert("id".into(), Value::String(id.clone()));
    doc.insert("created_time".into(), Value::String(stamp.clone()));
    doc.insert("last_modified".into(), Value::String(stamp));
    if table == "policy_schedules" {
        doc.entry("status").or_insert_with(|| Value::String("active".into()));
    }
    rows.insert(id.clone(), doc);
    debug!(%table, %id, "created");
    Ok((StatusCode::CREATED, Json(json!({ "data": id }))))
}

async fn get_row(
    State(db): State<Db>,
    Path((table, id)): Path<(String, String)>,
) -> Result<Json<Value>, Failure> {
    let db = db.read().await;
    db.get(&table)
        .and_then(|rows| rows.get(&id))
        .map(|doc| Json(json!({ "data": doc })))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("{table}/{id} not found")))
}

async fn update_row(
    State(db): State<Db>,
    Path((table, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<BulkResult>, Failure> {
    let mut patch = into_object(body)?;
    patch.remove("id");
    patch.remove("created_time");
    strip_write_only(&table, &mut patch);

    let mut db = db.write().await;
    let rows = db
        .get_mut(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("unknown table {table}")))?;
    let Some(doc) = rows.get_mut(&id) else {
        return Ok(Json(BulkResult::default()));
    };

    let changed = patch.iter().any(|(k, v)| doc.get(k) != Some(v));
    if !changed {
        return Ok(Json(BulkResult {
            unchanged: 1,
            ..BulkResult::default()
        }));
    }
    doc.extend(patch);
    doc.insert("last_modified".into(), Value::String(now()));
    debug!(%table, %id, "replaced");
    Ok(Json(BulkResult {
        replaced: 1,
        ..BulkResult::default()
    }))
}

async fn delete_row(
    State(db): State<Db>,
    Path((table, id)): Path<(String, String)>,
) -> Result<Json<BulkResult>, Failure> {
    let mut db = db.write().await;
    let rows = db
        .get_mut(&table)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("unknown table {table}")))?;
    let deleted = u64::from(rows.remove(&id).is_some());
    debug!(%table, %id, deleted, "delete");
    Ok(Json(BulkResult {
        deleted,
        ..BulkResult::default()
    }))
}
