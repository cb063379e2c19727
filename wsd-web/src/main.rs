//! Servidor web Axum com WebSocket para visualização da desambiguação em tempo real

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wsd_core::{
    corpus::{demo_texts, get_corpus},
    results::AnnotatedToken,
    token::reindex,
    Disambiguator, DisambiguationResults, ParseGraph, PipelineEvent, Token, WsdConfig,
};

/// Estado compartilhado da aplicação
struct AppState {
    wsd: Disambiguator,
}

/// Corpo de `/disambiguate` e das mensagens WebSocket.
///
/// O cliente manda os tokens já marcados ou o id de um comando do corpus.
#[derive(Deserialize)]
struct DisambiguateRequest {
    #[serde(default)]
    tokens: Option<Vec<Token>>,
    #[serde(default)]
    sentence: Option<String>,
}

impl DisambiguateRequest {
    fn into_tokens(self) -> Option<Vec<Token>> {
        if let Some(tokens) = self.tokens {
            return Some(tokens);
        }
        let id = self.sentence?;
        get_corpus()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.to_tokens())
    }
}

#[derive(Serialize)]
struct DisambiguateResponse {
    annotated_tokens: Vec<AnnotatedToken>,
    results: DisambiguationResults,
    total_tokens: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("WSD_CONFIG") {
        Ok(path) => WsdConfig::from_path(path)?,
        Err(_) => WsdConfig::from_env()?,
    };
    let wsd = config.build().map_err(|e| {
        error!(error = %e, "não foi possível carregar o classificador");
        e
    })?;
    let state = Arc::new(AppState { wsd });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/disambiguate", post(disambiguate_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("WSD_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Servidor WSD iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Desambiguação via HTTP POST (sem streaming)
async fn disambiguate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DisambiguateRequest>,
) -> impl IntoResponse {
    let Some(mut tokens) = req.into_tokens().filter(|t| !t.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Sentença vazia ou desconhecida"})),
        )
            .into_response();
    };

    reindex(&mut tokens);
    let graph = ParseGraph::from_tokens(tokens.clone());
    let state_for_task = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || state_for_task.wsd.disambiguate_graph(&graph)).await;

    match outcome {
        Ok(Ok(results)) => Json(DisambiguateResponse {
            annotated_tokens: results.annotate(&tokens),
            total_tokens: tokens.len(),
            results,
        })
        .into_response(),
        Ok(Err(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// Retorna os comandos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(id, text)| {
            serde_json::json!({
                "id": id,
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

/// Lógica do WebSocket: recebe a sentença, executa o pipeline e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // JSON {tokens | sentence}; texto puro é tratado como id do corpus
                let request = serde_json::from_str::<DisambiguateRequest>(&text).unwrap_or(DisambiguateRequest {
                    tokens: None,
                    sentence: Some(text.trim().to_string()),
                });
                let Some(tokens) = request.into_tokens().filter(|t| !t.is_empty()) else {
                    let event = PipelineEvent::Error {
                        message: "Sentença vazia ou desconhecida".to_string(),
                    };
                    if let Ok(json) = serde_json::to_string(&event) {
                        let _ = socket.send(Message::Text(json)).await;
                    }
                    continue;
                };

                info!("Desambiguando via WebSocket: {} tokens", tokens.len());

                // O pipeline é síncrono: roda fora do runtime
                let (tx_std, rx_std) = std::sync::mpsc::channel::<PipelineEvent>();
                let state_for_thread = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    let graph = ParseGraph::from_tokens(tokens);
                    state_for_thread.wsd.disambiguate_streaming(&graph, tx_std);
                });
                handle.await.ok();

                let events: Vec<PipelineEvent> = rx_std.try_iter().collect();
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
