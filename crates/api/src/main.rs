use penstack_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    penstack_observability::init(config.log_format);

    let app = penstack_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        cors_origin = %config.cors_origin,
        token_ttl_secs = config.token_ttl.num_seconds(),
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
