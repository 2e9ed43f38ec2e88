use std::sync::Arc;

use cookie::Cookie;
use http::StatusCode;
use mini_web::middleware::AccessLogBuilder;
use mini_web::{Dispatcher, HandleFn, RequestContext, Server};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct User {
    name: String,
    zip: String,
}

#[derive(Serialize)]
struct Failure {
    reason: String,
}

// curl -v -H 'Content-Type: application/json' -d '{"name":"hello","zip":"world"}' http://127.0.0.1:8080/user
fn create_user(ctx: &mut RequestContext) {
    let result = match ctx.bind_json::<User>() {
        Ok(user) => ctx.write_json(StatusCode::CREATED, &user),
        Err(e) => ctx.write_json(StatusCode::BAD_REQUEST, &Failure { reason: e.to_string() }),
    };
    if let Err(e) = result {
        ctx.write_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
}

// curl -v "http://127.0.0.1:8080/user/detail?id=7"
fn user_detail(ctx: &mut RequestContext) {
    match ctx.query_param("id").to_i64() {
        Ok(id) => ctx.write_text(StatusCode::OK, format!("user {id}\r\n")),
        Err(e) => ctx.write_text(StatusCode::BAD_REQUEST, format!("{e}\r\n")),
    }
}

// curl -v -d "name=hello&zip=world" http://127.0.0.1:8080/login
fn login(ctx: &mut RequestContext) {
    match ctx.form_param("name").into_string() {
        Ok(name) => {
            ctx.set_cookie(&Cookie::build(("user", name.clone())).path("/").http_only(true).build());
            ctx.write_text(StatusCode::OK, format!("welcome, {name}\r\n"));
        }
        Err(e) => ctx.write_text(StatusCode::BAD_REQUEST, format!("{e}\r\n")),
    }
}

// requests to /admin are rejected before routing
fn guard(next: HandleFn) -> HandleFn {
    Arc::new(move |ctx: &mut RequestContext| {
        if ctx.path() == "/admin" {
            ctx.write_text(StatusCode::UNAUTHORIZED, "unauthorized\r\n");
            return;
        }
        next(ctx);
    })
}

#[tokio::main]
async fn main() {
    let dispatcher = Dispatcher::builder()
        .get("/", |ctx| ctx.set_body("hello, world\r\n"))
        .get("/admin", |ctx| ctx.set_body("admin\r\n"))
        .post("/user", create_user)
        .get("/user/detail", user_detail)
        .post("/login", login)
        .middleware(AccessLogBuilder::new().build())
        .middleware(guard)
        .build();

    let server = match Server::builder().dispatcher(dispatcher).address("127.0.0.1:8080").build() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("can't build server: {e}");
            return;
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("server stopped: {e}");
    }
}
