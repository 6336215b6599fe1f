use actix_web::{get, post, put, web::{self, Json}, HttpResponse};

use crate::{errors::AppError, models::settings::SettingsChanges, GlobalState};

#[get("/settings")]
pub async fn public_settings(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let settings = data.store.get_settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[put("")]
pub async fn update_settings(data:web::Data<GlobalState>, changes:Json<SettingsChanges>) -> Result<HttpResponse, AppError>{
    let changes = changes.into_inner();

    if changes.contact_email.as_deref().is_some_and(|e| !crate::models::newsletter::is_valid_email(e)){
        return Err(AppError::bad_request("Invalid contact email"));
    }

    let settings = data.store.update_settings(changes).await?;

    tracing::info!(show_prices = settings.show_prices, "site settings updated");

    Ok(HttpResponse::Ok().json(settings))
}

#[post("/toggle-prices")]
pub async fn toggle_prices(data:web::Data<GlobalState>) -> Result<HttpResponse, AppError>{
    let current = data.store.get_settings().await?;

    let settings = data.store.update_settings(SettingsChanges{
        show_prices: Some(!current.show_prices),
        ..Default::default()
    }).await?;

    tracing::info!(show_prices = settings.show_prices, "price display toggled");

    Ok(HttpResponse::Ok().json(settings))
}
