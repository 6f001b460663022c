use actix_web::{web, App, HttpServer};
use scoreboard::config::redis::redis_url;
use scoreboard::config::server::bind_addr;
use scoreboard::infra::state::build_state;
use scoreboard::middleware::{RequestTrace, StructuredLogger};
use scoreboard::routes;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or sourced manually for local runs).
    let (host, port) = match bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    let redis = match redis_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let app_state = match build_state().with_redis(redis).build().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(%host, port, "scoreboard listening");

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
