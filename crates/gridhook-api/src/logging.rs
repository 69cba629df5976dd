//! Before/after request logging.
//!
//! Every registered handler is wrapped exactly once at registration time.
//! The wrapper reads the already-buffered request and response bytes, so the
//! log path observes copies and cannot consume, alter, or stall the
//! canonical decode/response path.

use std::sync::Arc;

use tracing::debug;

use crate::routes::HandlerFn;

/// Wrap `inner` with debug-level body logging for `path`.
pub(crate) fn logged(path: &str, inner: HandlerFn) -> HandlerFn {
    let path = path.to_string();
    Arc::new(move |body| {
        debug!(path = %path, body = %String::from_utf8_lossy(body), "request");
        let reply = inner(body);
        debug!(
            path = %path,
            status = %reply.status,
            body = %String::from_utf8_lossy(&reply.body),
            "response"
        );
        reply
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::routes::Reply;

    #[test]
    fn wrapper_passes_body_and_reply_through_unchanged() {
        let inner: HandlerFn = Arc::new(|body| Reply {
            status: StatusCode::OK,
            content_type: "application/json",
            body: body.to_vec(),
        });

        let wrapped = logged("/scheduler/bind", inner);
        let reply = wrapped(b"{\"node\":\"a\"}");
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, b"{\"node\":\"a\"}");
    }
}
