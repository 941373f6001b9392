//! Membership API Handlers
//!
//! HTTP endpoints that expose the membership engine to the cluster. These
//! handlers translate inbound requests into engine calls and never perform
//! more work than one registry operation plus a snapshot read.
//!
//! Request bodies are parsed by hand so that any malformed payload yields a
//! plain 400 with no registry mutation; the router rejects wrong methods
//! with 405.

use std::sync::Arc;

use axum::extract::Extension;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::warn;

use super::protocol::{
    HeartbeatRequest, JoinRequest, StatusResponse, ENDPOINT_GOSSIP, ENDPOINT_HEARTBEAT,
    ENDPOINT_JOIN, ENDPOINT_PEERS, ENDPOINT_STATUS,
};
use super::service::MembershipService;
use crate::peer::types::Peer;

/// Builds the membership router with the engine injected into every handler.
pub fn router(service: Arc<MembershipService>) -> Router {
    Router::new()
        .route(ENDPOINT_JOIN, post(handle_join))
        .route(ENDPOINT_HEARTBEAT, post(handle_heartbeat))
        .route(ENDPOINT_GOSSIP, post(handle_gossip))
        .route(ENDPOINT_PEERS, get(handle_peers))
        .route(ENDPOINT_STATUS, get(handle_status))
        .layer(Extension(service))
}

/// POST /join - record the joining node, reply with our peer list.
pub async fn handle_join(
    Extension(service): Extension<Arc<MembershipService>>,
    body: String,
) -> Result<Json<Vec<Peer>>, StatusCode> {
    let request: JoinRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected join with invalid body: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    if request.id.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    Ok(Json(service.accept_join(request)))
}

/// POST /heartbeat - refresh (or learn) the sending peer.
pub async fn handle_heartbeat(
    Extension(service): Extension<Arc<MembershipService>>,
    body: String,
) -> StatusCode {
    let heartbeat: HeartbeatRequest = match serde_json::from_str(&body) {
        Ok(heartbeat) => heartbeat,
        Err(e) => {
            warn!("Rejected heartbeat with invalid body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    if heartbeat.id.is_empty() {
        return StatusCode::BAD_REQUEST;
    }

    service.accept_heartbeat(heartbeat);
    StatusCode::OK
}

/// POST /gossip - merge the sender's registry snapshot into ours.
pub async fn handle_gossip(
    Extension(service): Extension<Arc<MembershipService>>,
    body: String,
) -> StatusCode {
    let peers: Vec<Peer> = match serde_json::from_str(&body) {
        Ok(peers) => peers,
        Err(e) => {
            warn!("Rejected gossip with invalid body: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    service.accept_gossip(peers);
    StatusCode::OK
}

/// GET /peers - all known peers, tombstones included.
pub async fn handle_peers(
    Extension(service): Extension<Arc<MembershipService>>,
) -> Json<Vec<Peer>> {
    Json(service.registry().all())
}

/// GET /status - this node's view of the cluster.
pub async fn handle_status(
    Extension(service): Extension<Arc<MembershipService>>,
) -> Json<StatusResponse> {
    let registry = service.registry();

    Json(StatusResponse {
        id: service.id().to_string(),
        address: service.full_address().to_string(),
        total_peers: registry.count(),
        alive_peers: registry.count_alive(),
        peers: registry.all(),
    })
}
