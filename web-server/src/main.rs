// Web Server - main.rs
// goai/web-server/src/main.rs
use actix_web::{web, App, HttpServer};
use goai_common::{setup_tracing, Config};
use goai_web::{api, middleware::RateLimiter, static_files, upstream::UpstreamClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration once; handlers receive it through app data
    let config = Config::from_env();

    let upstream = UpstreamClient::new(&config.upstream)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    // Save address before moving config into web::Data
    let server_addr = config.web_server_addr.clone();

    tracing::info!("Starting Web Server on {}", server_addr);
    tracing::info!("Proxying to upstream {}", upstream.base_url());
    if !config.secure_cookies() {
        tracing::warn!("Session cookies are issued without the Secure flag (run mode: {})", config.run_mode);
    }

    // Shared across workers so the limit holds per process
    let limiter = RateLimiter::from_config(&config.rate_limit);
    let static_config = config.static_files.clone();

    let config_data = web::Data::new(config);
    let upstream_data = web::Data::new(upstream);

    HttpServer::new(move || {
        let static_config = static_config.clone();
        App::new()
            .app_data(config_data.clone())
            .app_data(upstream_data.clone())
            .wrap(limiter.clone())
            .configure(api::configure)
            .configure(move |cfg| static_files::configure(cfg, static_config))
    })
    .bind(&server_addr)?
    .run()
    .await
}
