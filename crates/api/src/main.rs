use std::sync::Arc;

use anyhow::Context;

use workforce_api::app::{self, AppServices};
use workforce_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load().context("invalid configuration")?;
    workforce_observability::init(config.log_format);
    if config.using_dev_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = Arc::new(AppServices::seeded(config.default_company_id));
    if let Some(user) = config.bootstrap_super_admin {
        services
            .bootstrap_super_admin(user)
            .context("failed to assign bootstrap super admin")?;
    }

    let app = app::build_app(services, &config.jwt_secret);

    let addr = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
