//! A small app with two controllers, a rewriter and some middleware.
//!
//! ```text
//! cargo run --example getting_started -- --port 8080
//! curl http://127.0.0.1:8080/users/show/7.json
//! curl -X POST -d 'name=micro' http://127.0.0.1:8080/users/edit/7
//! curl -i http://127.0.0.1:8080/users/edit/7        # 501, only POST is bound
//! curl -i http://127.0.0.1:8080/old/users/7         # 301 to /users/show/7
//! ```

use clap::Parser;
use http::{HeaderName, HeaderValue, StatusCode};
use micro_dispatch::middleware::{DateHeader, RequestTrace, SetHeader};
use micro_dispatch::{App, Arity, Controller, RequestContext, ServerConfig, ServerError, handler_fn, init_logging, permanent_redirect};
use serde_json::json;
use tracing::info;

async fn index(_req: RequestContext) -> &'static str {
    "users: 7, 8, 9\r\n"
}

async fn show(req: RequestContext) -> (StatusCode, String) {
    let id = req.path_params()[0].to_owned();
    match req.format() {
        Some(".json") => (StatusCode::OK, json!({ "id": id, "name": "micro" }).to_string()),
        _ => (StatusCode::OK, format!("user {id}\r\n")),
    }
}

async fn edit(req: RequestContext) -> (StatusCode, String) {
    let id = req.path_params()[0].to_owned();
    match req.body().bytes().await {
        Ok(body) => (StatusCode::OK, format!("user {id} updated with {} bytes\r\n", body.len())),
        Err(e) => (StatusCode::BAD_REQUEST, format!("cannot read body: {e}\r\n")),
    }
}

async fn status(_req: RequestContext) -> &'static str {
    "ok\r\n"
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::parse();
    init_logging(config.log_level);

    let users = Controller::builder("Users")
        .action("index", handler_fn(index))
        .action_with_arity("get_show", Arity::exact(1), handler_fn(show))
        .action_with_arity("post_edit", Arity::exact(1), handler_fn(edit))
        .formats([".json"])
        .rewrite("/old/users/:id", |captures: &[&str]| permanent_redirect(&format!("/users/show/{}", captures[0])))
        .middleware(SetHeader::new(HeaderName::from_static("x-controller"), HeaderValue::from_static("users")))
        .build();

    let health = Controller::builder("Health").action_with_arity("get_index", Arity::NONE, handler_fn(status)).build();

    let mut app = App::new();
    app.global_setup(|controller| {
        controller.add_middleware(RequestTrace).add_middleware(DateHeader);
    });
    app.mount(users)?.mount(health)?;

    info!("routes:\n{}", app.url_map());
    app.run(config).await
}
