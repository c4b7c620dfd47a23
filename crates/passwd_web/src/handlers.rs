use crate::core::{Handler, Request, Response};
use crate::generator::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::service::PasswordService;
use async_trait::async_trait;
use http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

/// Built-in index page, used unless an `index.html` override is present in
/// the working directory at startup.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
	<meta charset="UTF-8">
	<title>Random Password Please</title>
	<style type="text/css">
		body { font-size: 18px; font-family: sans-serif; }
		.slider { width: 50%; }
	</style>
</head>
<body>
	<div style="text-align: center">
		<p>Your random password is:</p>
		<h1 id="password">{{password}}</h1>
		<input type="range" min="8" max="30" value="12" class="slider" id="slider">
		<p><span id="length-label">12</span> characters</p>
		<button id="another">Another Password Please</button>
		<p><span id="counter">{{counter}}</span> passwords generated</p>
		<p><abbr title="{{host}}/password.txt?len=n where n = 8-30">API</abbr></p>
	</div>
	<script>
		const password = document.getElementById('password');
		const counter = document.getElementById('counter');
		const slider = document.getElementById('slider');
		const label = document.getElementById('length-label');

		async function refresh() {
			const pw = await fetch('/password.txt?len=' + slider.value);
			password.textContent = await pw.text();
			const count = await fetch('/counter');
			counter.textContent = await count.text();
		}

		slider.addEventListener('input', () => {
			label.textContent = slider.value;
			refresh();
		});
		document.getElementById('another').addEventListener('click', refresh);
	</script>
</body>
</html>
"#;

#[derive(Deserialize)]
struct PasswordQuery {
    len: Option<String>,
}

/// Requested length from the query string. Missing or unparseable values
/// become the minimum; everything else is pulled into
/// [`MIN_PASSWORD_LENGTH`, `MAX_PASSWORD_LENGTH`].
fn requested_length(req: &Request) -> usize {
    let query: PasswordQuery = req
        .parse_query()
        .unwrap_or(PasswordQuery { len: None });
    query
        .len
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(MIN_PASSWORD_LENGTH as i64)
        .clamp(MIN_PASSWORD_LENGTH as i64, MAX_PASSWORD_LENGTH as i64) as usize
}

// Reachable only while in-flight requests drain after the generator has
// stopped; the listener is no longer accepting connections by then.
fn shutting_down() -> Response {
    Response::text(StatusCode::SERVICE_UNAVAILABLE, "shutting down")
}

/// Serves `GET /`: the browser-facing page, embedding a fresh
/// minimum-length password, the counter, and the addressed host.
pub struct IndexHandler {
    service: Arc<PasswordService>,
    template: String,
}

impl IndexHandler {
    pub fn new(service: Arc<PasswordService>, template: String) -> Arc<Self> {
        Arc::new(Self { service, template })
    }
}

#[async_trait]
impl Handler for IndexHandler {
    async fn handle(&self, req: Request) -> Response {
        let Some(password) = self.service.next_password(MIN_PASSWORD_LENGTH).await else {
            return shutting_down();
        };
        let page = self
            .template
            .replace("{{password}}", &password)
            .replace("{{counter}}", &self.service.counter().to_string())
            .replace("{{host}}", req.host().unwrap_or(""));
        Response::html(StatusCode::OK, page).header(http::header::CACHE_CONTROL, "no-cache")
    }
}

/// Serves `GET /password.txt`: the plain-text API.
pub struct PasswordTextHandler {
    service: Arc<PasswordService>,
}

impl PasswordTextHandler {
    pub fn new(service: Arc<PasswordService>) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

#[async_trait]
impl Handler for PasswordTextHandler {
    async fn handle(&self, req: Request) -> Response {
        let length = requested_length(&req);
        let Some(password) = self.service.next_password(length).await else {
            return shutting_down();
        };
        Response::text(StatusCode::OK, password).header(http::header::CACHE_CONTROL, "no-cache")
    }
}

/// Serves `GET /counter`: how many passwords have been served. Does not
/// count as a request itself.
pub struct CounterHandler {
    service: Arc<PasswordService>,
}

impl CounterHandler {
    pub fn new(service: Arc<PasswordService>) -> Arc<Self> {
        Arc::new(Self { service })
    }
}

#[async_trait]
impl Handler for CounterHandler {
    async fn handle(&self, _req: Request) -> Response {
        Response::text(StatusCode::OK, self.service.counter().to_string())
            .header(http::header::CACHE_CONTROL, "no-cache")
    }
}
