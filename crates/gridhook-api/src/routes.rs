//! Route table and dispatch.
//!
//! Paths are computed once at registration and never re-derived per request.
//! The table is mutated only during single-threaded bootstrap; [`RouteTable::into_router`]
//! then freezes it behind an `Arc`, so steady-state dispatch is lock-free.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{error, info, warn};

use gridhook_protocol::{
    BindRequest, BindResponse, FilterRequest, FilterResponse, PreemptionRequest, PriorityRequest,
};

use crate::error::ExtenderError;
use crate::ext::{Bind, Predicate, Preemption, Prioritize};
use crate::logging::logged;

/// Build identifier reported by `GET /version`: `GRIDHOOK_VERSION` injected
/// at compile time, falling back to the crate version.
pub const BUILD_VERSION: &str = match option_env!("GRIDHOOK_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

pub const VERSION_PATH: &str = "/version";
pub const API_PREFIX: &str = "/scheduler";
pub const BIND_PATH: &str = "/scheduler/bind";
pub const PREEMPTION_PATH: &str = "/scheduler/preemption";
pub const PREDICATES_PREFIX: &str = "/scheduler/predicates";
pub const PRIORITIES_PREFIX: &str = "/scheduler/priorities";

/// Outcome of dispatching one request.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn json(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, content_type: "application/json", body }
    }

    fn text(body: Vec<u8>) -> Self {
        Self { status: StatusCode::OK, content_type: "text/plain; charset=utf-8", body }
    }

    fn empty(status: StatusCode) -> Self {
        Self { status, content_type: "application/json", body: Vec::new() }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

pub(crate) type HandlerFn = Arc<dyn Fn(&[u8]) -> Reply + Send + Sync>;

/// A registered extension-point route.
#[derive(Clone)]
pub struct Route {
    method: Method,
    path: String,
    handler: HandlerFn,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Process-scoped route registry.
///
/// Built during bootstrap, then consumed into an axum router. The bind and
/// preemption slots are structural singletons in the protocol; registering
/// either twice keeps the first handler and logs a warning.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    /// GET `/version` — reports the supplied build identifier as a bare string.
    pub fn add_version(&mut self, version: impl Into<String>) -> &Route {
        let version = version.into();
        let handler: HandlerFn = Arc::new(move |_body| Reply::text(version.clone().into_bytes()));
        self.insert(Method::GET, VERSION_PATH.to_string(), handler)
    }

    /// POST `/scheduler/predicates/{name}` — filter callback.
    pub fn add_predicate(&mut self, predicate: Predicate) -> &Route {
        let path = format!("{PREDICATES_PREFIX}/{}", predicate.name());
        self.insert(Method::POST, path, predicate_route(predicate))
    }

    /// POST `/scheduler/priorities/{name}` — scoring callback.
    pub fn add_prioritize(&mut self, prioritize: Prioritize) -> &Route {
        let path = format!("{PRIORITIES_PREFIX}/{}", prioritize.name());
        self.insert(Method::POST, path, prioritize_route(prioritize))
    }

    /// POST `/scheduler/bind` — singleton; the first registration wins.
    pub fn add_bind(&mut self, bind: Bind) {
        if self.routes.contains_key(BIND_PATH) {
            warn!(path = BIND_PATH, "bind registered more than once; keeping the first registration");
            return;
        }
        self.insert(Method::POST, BIND_PATH.to_string(), bind_route(bind));
    }

    /// POST `/scheduler/preemption` — singleton; the first registration wins.
    pub fn add_preemption(&mut self, preemption: Preemption) {
        if self.routes.contains_key(PREEMPTION_PATH) {
            warn!(
                path = PREEMPTION_PATH,
                "preemption registered more than once; keeping the first registration"
            );
            return;
        }
        self.insert(Method::POST, PREEMPTION_PATH.to_string(), preemption_route(preemption));
    }

    fn insert(&mut self, method: Method, path: String, handler: HandlerFn) -> &Route {
        let handler = logged(&path, handler);
        let route = Route { method, path: path.clone(), handler };
        self.routes.insert(path.clone(), route);
        &self.routes[&path]
    }

    /// Look up `path` and run its handler against `body`.
    ///
    /// Unknown paths answer 404; a known path with the wrong method answers 405.
    pub fn dispatch(&self, method: &Method, path: &str, body: &[u8]) -> Reply {
        match self.routes.get(path) {
            None => Reply::empty(StatusCode::NOT_FOUND),
            Some(route) if route.method != *method => Reply::empty(StatusCode::METHOD_NOT_ALLOWED),
            Some(route) => (route.handler)(body),
        }
    }

    /// Consume the table into an axum router.
    ///
    /// From here on the table is shared read-only across concurrent requests.
    pub fn into_router(self) -> Router {
        let table = Arc::new(self);
        Router::new().fallback(move |method: Method, uri: Uri, body: Bytes| {
            let table = Arc::clone(&table);
            async move { table.dispatch(&method, uri.path(), &body) }
        })
    }
}

// ── Per-kind route handlers ────────────────────────────────────────

fn encode_json<T: serde::Serialize>(value: &T) -> Reply {
    match serde_json::to_vec(value) {
        Ok(body) => Reply::json(StatusCode::OK, body),
        Err(err) => {
            error!(error = %err, "response encoding failed");
            Reply::empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Decode → filter → encode. Decode and evaluation errors ride in the
/// response's `error` field; the status is 200 either way.
fn predicate_route(predicate: Predicate) -> HandlerFn {
    Arc::new(move |body| {
        info!(predicate = %predicate.name(), args = %String::from_utf8_lossy(body), "filter request");
        let result = match serde_json::from_slice::<FilterRequest>(body) {
            Ok(args) => predicate.filter(&args),
            Err(err) => FilterResponse {
                nodes: Vec::new(),
                failed_nodes: Default::default(),
                error: ExtenderError::Decode(err).to_string(),
            },
        };
        let reply = encode_json(&result);
        info!(predicate = %predicate.name(), result = %String::from_utf8_lossy(&reply.body), "filter result");
        reply
    })
}

/// Decode → score → encode. Unlike the filter path, any failure aborts the
/// request with a bare 500 — the scheduler accepts no partial score list.
fn prioritize_route(prioritize: Prioritize) -> HandlerFn {
    Arc::new(move |body| {
        info!(priority = %prioritize.name(), args = %String::from_utf8_lossy(body), "prioritize request");
        let args = match serde_json::from_slice::<PriorityRequest>(body) {
            Ok(args) => args,
            Err(err) => {
                error!(priority = %prioritize.name(), error = %ExtenderError::Decode(err), "prioritize aborted");
                return Reply::empty(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        match prioritize.prioritize(&args) {
            Ok(list) => {
                let reply = encode_json(&list);
                info!(priority = %prioritize.name(), result = %String::from_utf8_lossy(&reply.body), "prioritize result");
                reply
            }
            Err(err) => {
                error!(priority = %prioritize.name(), error = %err, "prioritize aborted");
                Reply::empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    })
}

/// Decode → bind → encode; errors ride in `BindResponse.error` under 200.
fn bind_route(bind: Bind) -> HandlerFn {
    Arc::new(move |body| {
        info!(args = %String::from_utf8_lossy(body), "bind request");
        let result = match serde_json::from_slice::<BindRequest>(body) {
            Ok(args) => bind.bind(&args),
            Err(err) => BindResponse { error: ExtenderError::Decode(err).to_string() },
        };
        let reply = encode_json(&result);
        info!(result = %String::from_utf8_lossy(&reply.body), "bind result");
        reply
    })
}

/// Decode → preempt → encode; a decode failure is the one place this
/// protocol uses an HTTP error status (400, empty body).
fn preemption_route(preemption: Preemption) -> HandlerFn {
    Arc::new(move |body| {
        info!(args = %String::from_utf8_lossy(body), "preemption request");
        match serde_json::from_slice::<PreemptionRequest>(body) {
            Ok(args) => {
                let reply = encode_json(&preemption.preempt(&args));
                info!(result = %String::from_utf8_lossy(&reply.body), "preemption result");
                reply
            }
            Err(err) => {
                warn!(error = %ExtenderError::Decode(err), "preemption request rejected");
                Reply::empty(StatusCode::BAD_REQUEST)
            }
        }
    })
}
