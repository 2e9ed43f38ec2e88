//! A minimal request-dispatch core on top of `mini-http`.
//!
//! Routes are static paths registered per HTTP method. Each request gets a
//! [`RequestContext`] that buffers the response, runs through an onion-style
//! middleware chain, and is flushed to the connection only after the whole chain
//! has returned.
//!
//! # Example
//!
//! ```no_run
//! use http::StatusCode;
//! use mini_web::middleware::AccessLogBuilder;
//! use mini_web::{Dispatcher, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = Dispatcher::builder()
//!         .get("/", |ctx| ctx.set_body("hello, world"))
//!         .get("/user", |ctx| {
//!             let name = ctx.query_param("name").into_string().unwrap_or_default();
//!             ctx.write_text(StatusCode::OK, format!("hello, {name}"));
//!         })
//!         .middleware(AccessLogBuilder::new().build())
//!         .build();
//!
//!     Server::builder()
//!         .dispatcher(dispatcher)
//!         .address("127.0.0.1:8080")
//!         .build()
//!         .unwrap()
//!         .start()
//!         .await
//!         .unwrap();
//! }
//! ```

mod context;
mod dispatcher;
mod error;
mod handler;
mod query;
mod server;
mod value;

pub mod middleware;
pub mod router;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use dispatcher::DispatcherBuilder;
pub use error::BindError;
pub use error::RouteError;
pub use error::ValueError;
pub use handler::HandleFn;
pub use handler::handler_fn;
pub use query::QueryParser;
pub use query::QueryValues;
pub use query::UrlEncodedQueryParser;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
pub use server::ServerError;
pub use value::StringValue;
