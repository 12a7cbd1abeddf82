//! REST API and browser UI.
//!
//! Routes:
//! - `GET /` serves the single-page UI
//! - `GET /api/notes` lists notes, optionally filtered with `view` and `q`
//! - `GET /api/counts` returns the per-tab counts
//! - `POST /api/notes` creates a note
//! - `PUT /api/notes/{id}` partially updates a note
//! - `DELETE /api/notes/{id}` deletes a note

pub mod error;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::entity::{NewNote, Note, NoteUpdate};
use crate::error::{Result, ScribbleError};
use crate::storage::JsonStore;
use crate::view::{self, NoteQuery, View, ViewCounts};
use error::{ApiError, CREATE_FAILED, DELETE_FAILED, READ_FAILED, UPDATE_FAILED};

const INDEX_HTML: &str = include_str!("index.html");

/// Shared server state.
///
/// The store sits behind one mutex so that each read-modify-write cycle on
/// the data file completes before the next one starts.
#[derive(Clone)]
pub struct NotesServer {
    pub store: Arc<Mutex<JsonStore>>,
}

impl NotesServer {
    pub fn new(store: JsonStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Run a blocking store operation on the blocking pool while holding the lock.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&JsonStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            let guard = store.blocking_lock();
            op(&guard)
        })
        .await
        .map_err(|e| ScribbleError::Server(format!("store task failed: {}", e)))?
    }
}

/// Query string of `GET /api/notes`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub view: Option<String>,
    pub q: Option<String>,
}

impl ListParams {
    /// `None` when neither parameter was given: the stored order is returned as is.
    fn to_query(&self) -> Result<Option<NoteQuery>> {
        if self.view.is_none() && self.q.is_none() {
            return Ok(None);
        }
        let view = match &self.view {
            Some(raw) => raw.parse::<View>()?,
            None => View::All,
        };
        Ok(Some(NoteQuery {
            view,
            search: self.q.clone(),
        }))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotesResponse {
    pub notes: Vec<Note>,
}

/// Build the application router.
pub fn router(server: NotesServer) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/counts", get(note_counts))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(server)
}

/// Serve until Ctrl-C.
pub async fn serve(store: JsonStore, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        data_file = %store.path().display(),
        "scribble listening"
    );

    axum::serve(listener, router(NotesServer::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown requested");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_notes(
    State(server): State<NotesServer>,
    Query(params): Query<ListParams>,
) -> std::result::Result<Json<NotesResponse>, ApiError> {
    let query = params
        .to_query()
        .map_err(|e| ApiError::internal(READ_FAILED, &e))?;

    let notes = server
        .with_store(|store| Ok(store.list()))
        .await
        .map_err(|e| ApiError::from_store(e, READ_FAILED))?;

    let notes = match query {
        Some(query) => view::apply(notes, &query),
        None => notes,
    };
    Ok(Json(NotesResponse { notes }))
}

async fn note_counts(
    State(server): State<NotesServer>,
) -> std::result::Result<Json<ViewCounts>, ApiError> {
    let notes = server
        .with_store(|store| Ok(store.list()))
        .await
        .map_err(|e| ApiError::from_store(e, READ_FAILED))?;
    Ok(Json(ViewCounts::from_notes(&notes)))
}

async fn create_note(
    State(server): State<NotesServer>,
    body: Bytes,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let new: NewNote =
        serde_json::from_slice(&body).map_err(|e| ApiError::internal(CREATE_FAILED, &e))?;

    let note = server
        .with_store(move |store| store.create(new))
        .await
        .map_err(|e| ApiError::from_store(e, CREATE_FAILED))?;

    tracing::info!(id = %note.id, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

async fn update_note(
    State(server): State<NotesServer>,
    Path(id): Path<String>,
    body: Bytes,
) -> std::result::Result<Json<Note>, ApiError> {
    let update: NoteUpdate =
        serde_json::from_slice(&body).map_err(|e| ApiError::internal(UPDATE_FAILED, &e))?;

    let note = server
        .with_store(move |store| store.update(&id, update))
        .await
        .map_err(|e| ApiError::from_store(e, UPDATE_FAILED))?;

    tracing::info!(id = %note.id, "note updated");
    Ok(Json(note))
}

async fn delete_note(
    State(server): State<NotesServer>,
    Path(id): Path<String>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let removed = server
        .with_store(move |store| store.delete(&id))
        .await
        .map_err(|e| ApiError::from_store(e, DELETE_FAILED))?;

    tracing::info!(id = %removed.id, "note deleted");
    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Priority;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use axum::response::Response;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn setup() -> (Router, JsonStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path().join("db.json"));
        let app = router(NotesServer::new(store.clone()));
        (app, store, tmp)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(raw) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };
        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let (app, _store, _tmp) = setup();

        let response = send(&app, Method::GET, "/api/notes", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "notes": [] }));
    }

    #[tokio::test]
    async fn test_create_returns_201_with_stamped_note() {
        let (app, store, _tmp) = setup();

        let response = send(
            &app,
            Method::POST,
            "/api/notes",
            Some(r#"{"title":"Hello","content":"World","priority":"high","isDraft":true}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        assert_eq!(body["title"], "Hello");
        assert_eq!(body["priority"], "high");
        assert_eq!(body["isDraft"], true);
        assert_eq!(body["isFavourite"], false);
        assert_eq!(body["createdAt"], body["updatedAt"]);

        let stored = store.list();
        assert_eq!(stored.len(), 1);
        assert_eq!(body["id"], stored[0].id.as_str());
    }

    #[tokio::test]
    async fn test_create_with_malformed_body_is_500() {
        let (app, store, _tmp) = setup();

        let response = send(&app, Method::POST, "/api/notes", Some("{oops")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to create note");
        assert!(store.list().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (app, store, _tmp) = setup();
        let note = store.create(NewNote::new("Before")).unwrap();

        let uri = format!("/api/notes/{}", note.id);
        let response = send(
            &app,
            Method::PUT,
            &uri,
            Some(r#"{"isFavourite":true,"id":"hijack","createdAt":"2000-01-01T00:00:00.000Z"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let updated = store.get(&note.id).unwrap();
        assert_eq!(updated.title, "Before");
        assert!(updated.is_favourite);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);

        let body = json_body(response).await;
        assert_eq!(body["id"], note.id.as_str());
    }

    #[tokio::test]
    async fn test_update_missing_note_is_404() {
        let (app, _store, _tmp) = setup();

        let response = send(&app, Method::PUT, "/api/notes/123", Some(r#"{"title":"x"}"#)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Note not found");
    }

    #[tokio::test]
    async fn test_update_with_malformed_body_is_500() {
        let (app, store, _tmp) = setup();
        let note = store.create(NewNote::new("x")).unwrap();

        let uri = format!("/api/notes/{}", note.id);
        let response = send(&app, Method::PUT, &uri, Some(r#"{"priority":"urgent"}"#)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to update note");
    }

    #[tokio::test]
    async fn test_delete_then_list() {
        let (app, store, _tmp) = setup();
        let note = store.create(NewNote::new("Temporary")).unwrap();

        let uri = format!("/api/notes/{}", note.id);
        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Note deleted successfully");

        let response = send(&app, Method::GET, "/api/notes", None).await;
        let body = json_body(response).await;
        assert_eq!(body["notes"].as_array().unwrap().len(), 0);

        let response = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_with_view_and_search() {
        let (app, store, _tmp) = setup();

        let mut low = NewNote::new("Draft about cats");
        low.priority = Priority::Low;
        low.is_draft = true;
        store.create(low).unwrap();

        let mut high = NewNote::new("Another draft");
        high.content = "CATS everywhere".to_string();
        high.priority = Priority::High;
        high.is_draft = true;
        store.create(high).unwrap();

        store.create(NewNote::new("Published cats")).unwrap();

        let response = send(&app, Method::GET, "/api/notes?view=drafts&q=cats", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let titles: Vec<&str> = body["notes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Another draft", "Draft about cats"]);
    }

    #[tokio::test]
    async fn test_list_without_params_keeps_stored_order() {
        let (app, store, _tmp) = setup();

        let mut low = NewNote::new("Low first");
        low.priority = Priority::Low;
        store.create(low).unwrap();
        let mut high = NewNote::new("High second");
        high.priority = Priority::High;
        store.create(high).unwrap();

        let titles = |body: serde_json::Value| -> Vec<String> {
            body["notes"]
                .as_array()
                .unwrap()
                .iter()
                .map(|n| n["title"].as_str().unwrap().to_string())
                .collect()
        };

        let response = send(&app, Method::GET, "/api/notes", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(titles(json_body(response).await), vec!["Low first", "High second"]);

        let response = send(&app, Method::GET, "/api/notes?view=all", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(titles(json_body(response).await), vec!["High second", "Low first"]);
    }

    #[tokio::test]
    async fn test_list_with_unknown_view_is_500() {
        let (app, _store, _tmp) = setup();

        let response = send(&app, Method::GET, "/api/notes?view=archived", None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to read notes");
    }

    #[tokio::test]
    async fn test_counts() {
        let (app, store, _tmp) = setup();
        let mut draft = NewNote::new("d");
        draft.is_draft = true;
        store.create(draft).unwrap();
        let mut fav = NewNote::new("f");
        fav.is_favourite = true;
        store.create(fav).unwrap();

        let response = send(&app, Method::GET, "/api/counts", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, json!({ "all": 2, "drafts": 1, "favourites": 1 }));
    }

    #[tokio::test]
    async fn test_counts_path_is_a_plain_note_id() {
        let (app, _store, _tmp) = setup();

        let response = send(&app, Method::DELETE, "/api/notes/counts", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Note not found");
    }

    #[tokio::test]
    async fn test_index_serves_ui() {
        let (app, _store, _tmp) = setup();

        let response = send(&app, Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("/api/notes"));
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_not_lost() {
        let (app, store, _tmp) = setup();

        let mut handles = Vec::new();
        for i in 0..10 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                let body = format!(r#"{{"title":"note {}"}}"#, i);
                send(&app, Method::POST, "/api/notes", Some(body.as_str()))
                    .await
                    .status()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
        }

        assert_eq!(store.list().len(), 10);
    }
}
