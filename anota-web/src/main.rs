//! Servidor web Axum com WebSocket para visualização das anotações em tempo real

use anota_core::{
    demo::{demo_pipeline, demo_texts},
    AnnotatedSpan, AnnotationPipeline, AnnotationUsecase, ClassificationResult, CodepointSpan, PipelineEvent,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Endereço padrão quando `ANOTA_ADDR` não está definido.
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: AnnotationPipeline,
}

#[derive(Deserialize)]
struct AnnotateRequest {
    text: String,
    #[serde(default)]
    usecase: Option<AnnotationUsecase>,
}

#[derive(Deserialize)]
struct ClassifyRequest {
    text: String,
    start: usize,
    end: usize,
    #[serde(default)]
    usecase: Option<AnnotationUsecase>,
}

#[derive(Serialize)]
struct AnnotateResponse {
    spans: Vec<AnnotatedSpan>,
    processing_ms: u64,
}

#[derive(Serialize)]
struct ClassifyResponse {
    classification: Option<ClassificationResult>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pipeline = demo_pipeline().expect("dicionários de demonstração inválidos");
    let state = Arc::new(AppState { pipeline });

    let addr = std::env::var("ANOTA_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    info!("🚀 Servidor de anotação iniciado em http://{addr}");
    axum::serve(listener, app(state)).await.unwrap();
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/annotate", post(annotate_handler))
        .route("/classify", post(classify_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state)
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Anotação via HTTP POST (sem streaming)
async fn annotate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnotateRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return bad_request("Texto vazio");
    }

    let start = Instant::now();
    let spans = state.pipeline.analyze(&req.text, req.usecase.unwrap_or_default());

    Json(AnnotateResponse {
        spans,
        processing_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
    .into_response()
}

/// Classifica uma seleção `[start, end)` em codepoints
async fn classify_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return bad_request("Texto vazio");
    }
    if req.start >= req.end || req.end > req.text.chars().count() {
        return bad_request("Seleção inválida");
    }

    let selection = CodepointSpan::new(req.start, req.end);
    let classification = state
        .pipeline
        .classify(&req.text, selection, req.usecase.unwrap_or_default());
    Json(ClassifyResponse { classification }).into_response()
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa pipeline e envia eventos em tempo real
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Aceita JSON {text, usecase} ou texto puro
                let (text, usecase) = match serde_json::from_str::<AnnotateRequest>(&text) {
                    Ok(req) => (req.text.trim().to_string(), req.usecase.unwrap_or_default()),
                    Err(_) => (text.trim().to_string(), AnnotationUsecase::default()),
                };
                if text.is_empty() {
                    continue;
                }

                info!("Anotando via WebSocket [{usecase:?}]: {} chars", text.len());

                // O pipeline é síncrono: roda fora do runtime
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    state.pipeline.analyze_streaming(&text, usecase, tx);
                });
                if let Err(err) = handle.await {
                    warn!("pipeline interrompido: {err}");
                    continue;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
