//! JSON HTTP API over the core operations
//!
//! Listens on `server.host:server.port` (default 127.0.0.1:8787):
//! - Public endpoints under /api/* (shop, collectables, presence, votes, users)
//! - Control endpoints under /ctl/* (health, admin awards, vote recording)
//!
//! POST routes under /ctl/ need the `X-Guildhall-Token` header when a token is
//! configured.

mod handlers;
mod types;

pub use types::{
    AddressRequest, ApiResponse, AwardRequest, CollectableClaimRequest, ProfileUpdateRequest,
    RewardClaimRequest,
};

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Result, anyhow};
use tiny_http::{Response, Server};
use tracing::{debug, error, info};

use crate::Guildhall;
use handlers::*;

const AUTH_HEADER: &str = "X-Guildhall-Token";

/// Running server; dropping it leaves the thread running until process exit
pub struct ServerHandle {
    server: Arc<Server>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Stop accepting requests and wait for the loop to finish
    pub fn shutdown(mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        info!("[guildhall:http] Server stopped");
    }
}

/// Bind and start serving in a background thread
pub fn start_http_server(app: Guildhall) -> Result<ServerHandle> {
    let settings = app.config().server.clone();
    let bind_addr = app.config().bind_addr();
    let server = Server::http(&bind_addr)
        .map(Arc::new)
        .map_err(|e| anyhow!("Failed to start server on {}: {}", bind_addr, e))?;

    let auth_enabled = !settings.token.trim().is_empty();
    info!(
        "[guildhall:http] Server listening on http://{} (auth: {})",
        bind_addr,
        if auth_enabled { "enabled" } else { "disabled" }
    );

    let loop_server = Arc::clone(&server);
    let thread = thread::spawn(move || {
        for mut request in loop_server.incoming_requests() {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

            if requires_token(&method, path) && !is_authorized(&request, &settings.token) {
                respond(request, ApiResponse::unauthorized());
                continue;
            }

            let body = if method == "POST" {
                match read_request_body(&mut request, settings.max_body_bytes) {
                    Ok(body) => body,
                    Err(response) => {
                        respond(request, response);
                        continue;
                    }
                }
            } else {
                String::new()
            };

            let response = route(&app, &method, path, query, &body);
            debug!("[guildhall:http] {} {} -> {}", method, path, response.status);
            respond(request, response);
        }
    });

    Ok(ServerHandle {
        server,
        thread: Some(thread),
    })
}

/// Dispatch one request to its handler
pub fn route(app: &Guildhall, method: &str, path: &str, query: &str, body: &str) -> ApiResponse {
    match (method, path) {
        ("GET", "/ctl/ping") => handle_ping(),
        ("GET", "/api/level") => handle_level(app, query),
        ("GET", "/api/rewards") => handle_rewards_list(app, query),
        ("POST", "/api/rewards/claim") => handle_reward_claim(app, body),
        ("GET", "/api/collectables") => handle_collectables_list(app, query),
        ("POST", "/api/collectables/claim") => handle_collectable_claim(app, body),
        ("POST", "/api/activity/ping") => handle_activity_ping(app, body),
        ("POST", "/api/activity/clear") => handle_activity_clear(app, body),
        ("GET", "/api/activity/count") => handle_activity_count(app, query),
        ("GET", "/api/vote/lock") => handle_vote_lock(app, query),
        ("GET", "/api/leaderboard") => handle_leaderboard(app, query),
        ("GET", p) if p.starts_with("/api/users/") => handle_user_profile(app, p),

        // Admin
        ("POST", "/ctl/award") => handle_award(app, body),
        ("POST", "/ctl/vote") => handle_vote(app, body),
        ("POST", "/ctl/profile") => handle_profile_update(app, body),

        _ => ApiResponse::not_found(),
    }
}

fn requires_token(method: &str, path: &str) -> bool {
    method == "POST" && path.starts_with("/ctl/")
}

fn is_authorized(request: &tiny_http::Request, expected: &str) -> bool {
    if expected.trim().is_empty() {
        return true;
    }

    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(AUTH_HEADER))
        .map(|h| h.value.as_str() == expected)
        .unwrap_or(false)
}

fn json_content_type() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

fn read_request_body(request: &mut tiny_http::Request, max_bytes: usize) -> Result<String, ApiResponse> {
    let mut body = String::new();
    let mut reader = request.as_reader().take((max_bytes + 1) as u64);
    if let Err(e) = reader.read_to_string(&mut body) {
        error!("[guildhall:http] Failed to read body: {}", e);
        return Err(ApiResponse::bad_request("unreadable body"));
    }

    if body.len() > max_bytes {
        return Err(ApiResponse::error(
            413,
            "payload_too_large",
            format!("body exceeds {max_bytes} bytes"),
        ));
    }

    Ok(body)
}

fn respond(request: tiny_http::Request, response: ApiResponse) {
    let body = serde_json::to_string(&response.body)
        .unwrap_or_else(|_| "{\"error\":\"serialize\"}".to_string());
    let response = Response::from_string(body)
        .with_status_code(response.status)
        .with_header(json_content_type());
    let _ = request.respond(response);
}
