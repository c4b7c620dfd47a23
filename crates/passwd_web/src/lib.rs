pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod service;
pub mod shutdown;
pub mod store;

// Re-export commonly used types at the crate root
pub use core::{Handler, Request, Response, Router};
pub use http::StatusCode;

use async_trait::async_trait;
use pingora::protocols::http::ServerSession;
use pingora::server::ShutdownWatch;
use pingora_core::apps::{
    HttpPersistentSettings, HttpServerApp, HttpServerOptions, ReusedHttpStream,
};
use pingora_http::ResponseHeader;
use std::sync::Arc;
use std::time::Instant;

/// The HTTP application: the router plus the pingora glue that feeds it.
pub struct App {
    router: Router,
}

impl App {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Handle one request end-to-end: route, run the handler (404 when
    /// nothing matches), finalize the Content-Length header.
    pub async fn handle(&self, req: Request) -> Response {
        let method = req.method().clone();
        let path = req.path().to_string();
        let start = Instant::now();

        let mut res = match self.router.find(&method, &path) {
            Some(handler) => handler.handle(req).await,
            None => Response::text(StatusCode::NOT_FOUND, "Not Found"),
        };
        self.finalize_content_length(&mut res);

        tracing::info!(
            method = %method,
            path = %path,
            status = res.status.as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "request served"
        );
        res
    }

    /// Set content-length from the body unless a handler already did.
    fn finalize_content_length(&self, res: &mut Response) {
        if res.headers.contains_key(http::header::CONTENT_LENGTH) {
            return;
        }
        if let Ok(value) = http::HeaderValue::from_str(&res.body.len().to_string()) {
            res.headers.insert(http::header::CONTENT_LENGTH, value);
        }
    }
}

#[async_trait]
impl HttpServerApp for App {
    async fn process_new_http(
        self: &Arc<Self>,
        mut http: ServerSession,
        shutdown: &ShutdownWatch,
    ) -> Option<ReusedHttpStream> {
        // Read request header
        if !(http.read_request().await.ok()?) {
            return None;
        }
        if *shutdown.borrow() {
            http.set_keepalive(None);
        } else {
            http.set_keepalive(Some(60));
        }

        let reqh = http.req_header();
        let method = reqh.method.clone();
        let uri = reqh.uri.clone();
        let headers = reqh.headers.clone();
        let is_head = method == http::Method::HEAD;

        let res = self.handle(Request::from_parts(method, uri, headers)).await;

        // Build and write the response header
        let mut builder = http::Response::builder().status(res.status);
        for (name, value) in res.headers.iter() {
            builder = builder.header(name, value);
        }
        let (parts, _) = builder.body(Vec::<u8>::new()).ok()?.into_parts();
        let resp_header: ResponseHeader = parts.into();
        if http
            .write_response_header(Box::new(resp_header))
            .await
            .is_err()
        {
            return None;
        }

        // For HEAD, the header is the whole answer
        if !is_head {
            let _ = http.write_response_body(res.body, true).await;
        }

        let persistent_settings = HttpPersistentSettings::for_session(&http);
        match http.finish().await {
            Ok(c) => c.map(|s| ReusedHttpStream::new(s, Some(persistent_settings))),
            Err(_) => None,
        }
    }

    fn h2_options(&self) -> Option<pingora::protocols::http::v2::server::H2Options> {
        None
    }

    fn server_options(&self) -> Option<&HttpServerOptions> {
        None
    }
}
