use actix_web::{middleware, App, HttpServer};
use anyhow::Context;
use hospital_server::{config::Config, database, upload::UploadKind, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    let pool = database::build_pool(&config.database_url)?;
    database::init_schema(&pool)?;

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        database::seed_admin(&pool, email, password)?;
    }

    for kind in [UploadKind::Resume, UploadKind::Image, UploadKind::Video] {
        let dir = config.upload_dir.join(kind.dir());
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    }

    let bind = config.bind_address.clone();
    let state = AppState::new(pool, config)?;
    info!(%bind, "starting hospital server");

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(&bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await?;

    Ok(())
}
