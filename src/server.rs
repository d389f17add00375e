use crate::config::Config;
use crate::error::{SessionError, ValidationError};
use crate::events::SessionEvent;
use crate::flashcard::CardId;
use crate::render;
use crate::session::{Session, SessionView};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::future::ready;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    events: broadcast::Sender<SessionEvent>,
    title: Arc<str>,
}

impl AppState {
    /// Takes ownership of the session and bridges its event bus to the
    /// async side. The bridge thread ends when the session is dropped.
    pub fn new(mut session: Session, title: &str) -> Self {
        let rx = session.subscribe();
        let (events, _) = broadcast::channel(64);
        let tx = events.clone();
        thread::spawn(move || {
            for event in rx {
                // no open event streams is fine
                let _ = tx.send(event);
            }
        });
        Self {
            session: Arc::new(Mutex::new(session)),
            events,
            title: title.into(),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Deserialize)]
struct NewCard {
    question: String,
    answer: String,
}

enum ApiError {
    Session(SessionError),
    Body(JsonRejection),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Session(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Session(err @ SessionError::Validation(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::Session(err @ SessionError::NoQuiz) => (StatusCode::CONFLICT, err.to_string()),
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/quiz", get(quiz_page))
        .route("/api/session", get(session_view))
        .route("/api/cards", post(create_card))
        .route("/api/cards/reset", post(reset_cards))
        .route("/api/cards/:id", delete(delete_card))
        .route("/api/quiz", post(open_quiz).delete(close_quiz))
        .route("/api/quiz/flip/:id", post(flip))
        .route("/api/quiz/reset", post(reset_flips))
        .route("/api/events", get(events))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::new(Session::new(), &config.title);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("fail to bind {}", config.listen))?;
    let addr = listener.local_addr()?;
    tracing::debug!("listening on {}", addr);
    println!("open http://{addr}");
    axum::serve(listener, router(state))
        .await
        .context("server stopped")?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.session().view();
    Html(render::index(&state.title, &view))
}

/// Opens a quiz when none is open, so the page works as a direct link.
async fn quiz_page(State(state): State<AppState>) -> Html<String> {
    let view = {
        let mut session = state.session();
        if session.quiz().is_none() {
            session.open_quiz();
        }
        session.view()
    };
    let html = match &view.quiz {
        Some(quiz) => render::quiz(&state.title, quiz),
        None => render::index(&state.title, &view),
    };
    Html(html)
}

async fn session_view(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session().view())
}

async fn create_card(
    State(state): State<AppState>,
    card: Result<Json<NewCard>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let Json(card) = card?;
    let mut session = state.session();
    let id = session.add_card(&card.question, &card.answer)?;
    tracing::info!("created card {id}");
    Ok((StatusCode::CREATED, Json(session.view())))
}

async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Json<SessionView> {
    let mut session = state.session();
    session.delete_card(id);
    Json(session.view())
}

async fn reset_cards(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session();
    let removed = session.reset_cards();
    tracing::info!("removed {removed} cards");
    Json(session.view())
}

async fn open_quiz(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session();
    session.open_quiz();
    Json(session.view())
}

async fn close_quiz(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session();
    session.close_quiz();
    Json(session.view())
}

async fn flip(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session();
    session.flip(id)?;
    Ok(Json(session.view()))
}

async fn reset_flips(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session();
    session.reset_flips()?;
    Ok(Json(session.view()))
}

async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = BroadcastStream::new(state.events.subscribe())
        // lagged receivers just skip ahead, the page reloads anyway
        .filter_map(|event| ready(event.ok()))
        .map(|event| Event::default().json_data(&event));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState::new(Session::new(), "FlashCards App")
    }

    async fn call(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = router(state.clone())
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn call_json(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, text) = call(state, method, uri, body).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    #[tokio::test]
    async fn create_and_list() {
        let state = state();
        let (status, view) = call_json(
            &state,
            "POST",
            "/api/cards",
            Some(json!({ "question": "Capital of France?", "answer": "Paris" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view["cards"][0]["question"], "Capital of France?");
        assert_eq!(view["form"]["question"], "");

        let (status, view) = call_json(&state, "GET", "/api/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["cards"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_field_is_unprocessable() {
        let state = state();
        let (status, body) = call_json(
            &state,
            "POST",
            "/api/cards",
            Some(json!({ "question": "x", "answer": " " })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "answer must not be empty");
        assert!(state.session().store().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_gets_json_error() {
        let state = state();
        let (status, body) =
            call_json(&state, "POST", "/api/cards", Some(json!({ "question": "x" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("missing field `answer`"));

        let (status, body) = call_json(&state, "POST", "/api/cards", None).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());
        assert!(state.session().store().is_empty());
    }

    #[tokio::test]
    async fn delete_known_and_unknown() {
        let state = state();
        let id = state.session().add_card("a", "1").unwrap();
        state.session().add_card("b", "2").unwrap();

        let unknown = format!("/api/cards/{}", CardId::new());
        let (status, view) = call_json(&state, "DELETE", &unknown, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["cards"].as_array().unwrap().len(), 2);

        let (_, view) = call_json(&state, "DELETE", &format!("/api/cards/{id}"), None).await;
        assert_eq!(view["cards"].as_array().unwrap().len(), 1);
        assert_eq!(view["cards"][0]["question"], "b");

        let (status, _) = call(&state, "DELETE", "/api/cards/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reset_empties_store() {
        let state = state();
        state.session().add_card("a", "1").unwrap();
        let (status, view) = call_json(&state, "POST", "/api/cards/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(view["cards"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn quiz_flow() {
        let state = state();
        let id = state.session().add_card("Capital of France?", "Paris").unwrap();

        let (status, _) = call(&state, "POST", &format!("/api/quiz/flip/{id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, view) = call_json(&state, "POST", "/api/quiz", None).await;
        assert_eq!(view["quiz"]["cards"][0]["text"], "Capital of France?");

        let (_, view) = call_json(&state, "POST", &format!("/api/quiz/flip/{id}"), None).await;
        assert_eq!(view["quiz"]["cards"][0]["text"], "Paris");
        assert_eq!(view["quiz"]["cards"][0]["side"], "answer");
        assert_eq!(view["quiz"]["revealed"], 1);

        let (_, view) = call_json(&state, "POST", "/api/quiz/reset", None).await;
        assert_eq!(view["quiz"]["cards"][0]["text"], "Capital of France?");

        let (_, view) = call_json(&state, "DELETE", "/api/quiz", None).await;
        assert!(view["quiz"].is_null());
    }

    #[tokio::test]
    async fn pages_render() {
        let state = state();
        state.session().add_card("What is Rust?", "A language").unwrap();

        let (status, html) = call(&state, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("What is Rust?"));
        assert!(html.contains("Create Flashcard"));

        let (status, html) = call(&state, "GET", "/quiz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("0 of 1 revealed"));
        assert!(state.session().quiz().is_some());
    }

    #[tokio::test]
    async fn events_reach_stream_subscribers() {
        let state = state();
        let mut rx = state.events.subscribe();
        let id = state.session().add_card("q", "a").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, SessionEvent::CardAdded { id });
    }

    #[tokio::test]
    async fn event_stream_content_type() {
        let response = router(state())
            .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }
}
