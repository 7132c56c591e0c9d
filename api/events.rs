use srrc_events_proxy::{EventsProxy, ProxyConfig, ProxyResponse};
use vercel_runtime::{run, Body, Error, Request, Response};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(handler).await
}

/// GET|POST|OPTIONS /api/events: relay the latest release's events file.
///
/// OPTIONS answers the CORS preflight without touching GitHub. Any other
/// method fetches the release metadata, then the `srrc_events.json` asset,
/// and returns it verbatim. Upstream failures become a 500 with
/// `{"error": "Failed to fetch events data", "message": ...}`.
pub async fn handler(req: Request) -> Result<Response<Body>, Error> {
    let response = match EventsProxy::new(ProxyConfig::from_env()) {
        Ok(proxy) => proxy.respond(req.method()).await,
        Err(err) => {
            log::error!("could not build upstream client: {err}");
            ProxyResponse::failure(&err)
        }
    };

    Ok(response.into_http()?.map(Body::Text))
}
