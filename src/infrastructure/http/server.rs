//! Blocking HTTP listener shared by a pool of worker threads

use std::io::Read;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use crate::application::services::{CheckoutService, JsonReply, SERVER_ERROR_MESSAGE};
use crate::shared::errors::{AppError, RequestError};

pub const DATA_VALIDATION_PATH: &str = "/api/data-validation";
pub const SEND_RECEIPT_PATH: &str = "/api/send-receipt";
pub const HEALTH_PATH: &str = "/health";

// Workers re-check the shutdown flag at least this often
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// HTTP front for [`CheckoutService`]
pub struct ApiServer {
    server: Arc<Server>,
    service: Arc<CheckoutService>,
    runtime: Handle,
    max_body_bytes: usize,
    shutdown: Arc<AtomicBool>,
}

/// Stops the worker pool of an [`ApiServer`]
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
    shutdown: Arc<AtomicBool>,
    workers: usize,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake blocked workers early instead of waiting out the poll interval
        for _ in 0..self.workers {
            self.server.unblock();
        }
    }
}

impl ApiServer {
    /// Bind the listener. Receipt delivery runs on `runtime`, off the worker pool.
    pub fn bind(
        addr: &str,
        service: Arc<CheckoutService>,
        runtime: Handle,
        max_body_bytes: usize,
    ) -> Result<Self, AppError> {
        let server = Server::http(addr)
            .map_err(|e| AppError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;

        Ok(Self {
            server: Arc::new(server),
            service,
            runtime,
            max_body_bytes,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Start `workers` threads that serve requests until shutdown.
    pub fn spawn_workers(self, workers: usize) -> Result<(ShutdownHandle, Vec<JoinHandle<()>>), AppError> {
        let workers = workers.max(1);
        let shared = Arc::new(self);
        let mut handles = Vec::with_capacity(workers);

        for i in 0..workers {
            let worker = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("http-worker-{}", i))
                .spawn(move || worker.serve())
                .map_err(|e| AppError::ServerError(format!("Failed to spawn worker {}: {}", i, e)))?;
            handles.push(handle);
        }

        let shutdown = ShutdownHandle {
            server: Arc::clone(&shared.server),
            shutdown: Arc::clone(&shared.shutdown),
            workers,
        };
        Ok((shutdown, handles))
    }

    fn serve(&self) {
        debug!("HTTP worker started");
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => self.handle(request),
                Ok(None) => continue,
                Err(e) => {
                    if self.shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!(error = %e, "Failed to accept request");
                }
            }
        }
        debug!("HTTP worker stopped");
    }

    fn handle(&self, mut request: Request) {
        let method = request.method().clone();
        let url = request.url().to_owned();
        let path = url.split('?').next().unwrap_or("").to_string();

        let body = match read_body(&mut request, self.max_body_bytes) {
            Ok(body) => body,
            Err(RequestError::BodyTooLarge(limit)) => {
                warn!(path = %path, limit, "Request body too large");
                return respond(request, JsonReply::server_error_with_status(413, "Request body too large"));
            }
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read request body");
                return respond(request, JsonReply::server_error(SERVER_ERROR_MESSAGE));
            }
        };

        if method == Method::Post && path == SEND_RECEIPT_PATH {
            // Mailer latency must never hold a worker that validation needs
            return self.spawn_receipt(request, body);
        }

        // A panic in a handler must still produce a server-error reply
        let reply = catch_unwind(AssertUnwindSafe(|| self.route(&method, &path, &body))).unwrap_or_else(|_| {
            error!(method = %method, path = %path, "Request handler panicked");
            JsonReply::server_error(SERVER_ERROR_MESSAGE)
        });

        debug!(method = %method, path = %path, status = reply.status, "Request handled");
        respond(request, reply);
    }

    fn route(&self, method: &Method, path: &str, body: &[u8]) -> JsonReply {
        match (method, path) {
            (Method::Post, DATA_VALIDATION_PATH) => self.service.validate_data(body),
            (Method::Get, HEALTH_PATH) => JsonReply::ok(&serde_json::json!({ "status": "ok" })),
            (_, DATA_VALIDATION_PATH) | (_, SEND_RECEIPT_PATH) | (_, HEALTH_PATH) => {
                JsonReply::error(405, "Method not allowed")
            }
            _ => JsonReply::error(404, "Not found"),
        }
    }

    /// Serve `POST /api/send-receipt` on the runtime and release the worker.
    fn spawn_receipt(&self, request: Request, body: Vec<u8>) {
        let service = Arc::clone(&self.service);
        self.runtime.spawn(async move {
            // Run in its own task so a panicking mailer surfaces as a JoinError
            let task = tokio::spawn(async move { service.send_receipt(&body).await });
            let reply = match task.await {
                Ok(reply) => reply,
                Err(e) => {
                    error!(path = SEND_RECEIPT_PATH, error = %e, "Receipt handler failed");
                    JsonReply::server_error(SERVER_ERROR_MESSAGE)
                }
            };

            debug!(path = SEND_RECEIPT_PATH, status = reply.status, "Request handled");
            if let Err(e) = tokio::task::spawn_blocking(move || respond(request, reply)).await {
                warn!(error = %e, "Failed to write receipt response");
            }
        });
    }
}

fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>, RequestError> {
    if let Some(len) = request.body_length() {
        if len > limit {
            return Err(RequestError::BodyTooLarge(limit));
        }
    }

    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| RequestError::Read(e.to_string()))?;
    if body.len() > limit {
        return Err(RequestError::BodyTooLarge(limit));
    }
    Ok(body)
}

fn respond(request: Request, reply: JsonReply) {
    let mut response = Response::from_data(reply.body.into_bytes()).with_status_code(StatusCode(reply.status));
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        warn!(error = %e, "Failed to write response");
    }
}
