use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fringe_academy::{config::Config, configure, errors::AppError, mailer, store, GlobalState};

#[actix_web::main]
async fn main() -> Result<(), AppError> {

    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "fringe_academy=info,actix_web=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let address = config.bind_address.clone();

    let store = store::connect(&config).await?;

    let mailer = mailer::from_config(&config).map_err(|e| AppError::Config(e.to_string()))?;

    let global_state = GlobalState{store, mailer, config};

    let app_data = web::Data::new(global_state);

    tracing::info!(%address, store = app_data.store.backend(), "server starting");

    HttpServer::new(
        move||{
            App::new()
            .app_data(app_data.clone())
            .wrap(Logger::default())
            .configure(configure)
        }
    ).bind(&address)
    .map_err(|_e|AppError::SocketBind)?
    .run()
    .await
    .map_err(|_e|AppError::ServerStart)?;

    Ok(())

}
