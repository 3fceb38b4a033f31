/*!
Cluster HTTP simulé pour tests sans Redis Enterprise

Serveur axum sur un port éphémère qui répond aux routes configurées
(licence, inventaire, métriques...) et enregistre chaque requête reçue,
y compris l'en-tête `Authorization`, pour les assertions de tests.
*/

use anyhow::Result;
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

pub const LICENSE_PATH: &str = "/v1/license";
pub const BDBS_PATH: &str = "/v1/bdbs";
pub const METRICS_PATH: &str = "/metrics";

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct ClusterState {
    routes: Mutex<HashMap<String, MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Faux cluster servi en local; arrêté au drop.
pub struct MockCluster {
    addr: SocketAddr,
    state: Arc<ClusterState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockCluster {
    /// Démarre le serveur sur 127.0.0.1 (port choisi par l'OS)
    pub async fn start() -> Result<Self> {
        let state = Arc::new(ClusterState::default());
        let app = Router::new().fallback(serve).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                rx.await.ok();
            });
            if let Err(e) = server.await {
                log::error!("[mock-cluster] server error: {}", e);
            }
        });

        log::info!("[mock-cluster] listening on http://{}", addr);
        Ok(Self { addr, state, shutdown: Some(tx) })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Répond `200` + JSON sur `path`
    pub fn serve_json(&self, path: &str, body: &Value) {
        self.route(path, MockResponse {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
        });
    }

    /// Répond `200` + texte brut sur `path` (format d'exposition)
    pub fn serve_text(&self, path: &str, body: &str) {
        self.route(path, MockResponse {
            status: 200,
            content_type: "text/plain; version=0.0.4",
            body: body.to_string(),
        });
    }

    /// Répond avec un statut et un corps arbitraires (erreurs, JSON invalide...)
    pub fn serve_raw(&self, path: &str, status: u16, body: &str) {
        self.route(path, MockResponse {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        });
    }

    pub fn route(&self, path: &str, response: MockResponse) {
        self.state.routes.lock().insert(path.to_string(), response);
    }

    /// Toutes les requêtes reçues, dans l'ordre d'arrivée
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_for(&self, path: &str) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

impl Drop for MockCluster {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
    }
}

async fn serve(State(state): State<Arc<ClusterState>>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().push(RecordedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        authorization,
    });

    let route = state.routes.lock().get(&path).cloned();
    match route {
        Some(resp) => {
            let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, [(header::CONTENT_TYPE, resp.content_type)], resp.body).into_response()
        }
        None => {
            log::warn!("[mock-cluster] no route for {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
