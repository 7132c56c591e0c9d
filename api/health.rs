use serde_json::json;
use srrc_events_proxy::proxy::cors_headers;
use srrc_events_proxy::version;
use vercel_runtime::{run, Body, Error, Request, Response, StatusCode};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(handler).await
}

pub async fn handler(_req: Request) -> Result<Response<Body>, Error> {
    Ok(health_response()?)
}

fn health_response() -> Result<Response<Body>, http::Error> {
    let payload = json!({
        "status": "ok",
        "version": version(),
    });

    let mut builder = Response::builder().status(StatusCode::OK);
    for (name, value) in cors_headers() {
        builder = builder.header(name, value);
    }
    builder.body(Body::Text(payload.to_string()))
}
