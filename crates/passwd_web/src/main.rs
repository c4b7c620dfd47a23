use anyhow::Context;
use clap::Parser;
use passwd_web::App;
use passwd_web::config::CliArgs;
use passwd_web::core::Router;
use passwd_web::generator::{PasswordGenerator, password_queue};
use passwd_web::handlers::{CounterHandler, INDEX_HTML, IndexHandler, PasswordTextHandler};
use passwd_web::service::PasswordService;
use passwd_web::shutdown::FlushOnShutdown;
use passwd_web::store::CounterStore;
use pingora::server::Server;
use pingora::services::background::background_service;
use pingora::services::listening::Service;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();

    let (store, initial) =
        CounterStore::open(args.counter.as_deref()).context("loading persisted counter")?;
    let store = Arc::new(store);
    if store.is_enabled() {
        tracing::info!(counter = initial, "loaded persisted counter");
    }

    let (tx, rx) = password_queue();
    let service = PasswordService::new(rx, store, initial);

    let mut router = Router::new();
    router.get("/", IndexHandler::new(service.clone(), load_index_template()));
    router.get("/password.txt", PasswordTextHandler::new(service.clone()));
    router.get("/counter", CounterHandler::new(service.clone()));

    let mut server = Server::new(None).map_err(|e| std::io::Error::other(e.to_string()))?;
    server.bootstrap();

    let mut web = Service::new("Password Web HTTP".to_string(), App::new(router));
    web.add_tcp(&args.http);
    server.add_service(web);
    server.add_service(background_service(
        "password generator",
        PasswordGenerator::new(tx),
    ));
    server.add_service(background_service(
        "counter flush",
        FlushOnShutdown::new(service),
    ));

    tracing::info!(addr = %args.http, "running password service");
    server.run_forever()
}

/// An `index.html` in the working directory overrides the built-in page.
fn load_index_template() -> String {
    match std::fs::read_to_string("index.html") {
        Ok(template) => {
            tracing::info!("using index.html template override");
            template
        }
        Err(_) => INDEX_HTML.to_string(),
    }
}
