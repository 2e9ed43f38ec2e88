use mini_web::{Dispatcher, Server};

#[tokio::main]
async fn main() {
    let dispatcher = Dispatcher::builder().get("/", |ctx| ctx.set_body("hello, world")).build();

    let server = match Server::builder().dispatcher(dispatcher).address("127.0.0.1:3000").build() {
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
