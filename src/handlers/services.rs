use actix_web::{delete, get, patch, post, put, web::{self, Json}, HttpResponse};

use crate::{
    errors::AppError,
    models::{filter_value, service::{NewService, Service, ServiceChanges, ServiceFilter}},
    schema::{admin::{CreateService, DeleteResponse, PatchService, ServiceList, ServiceResponse, UpdateService}, ListQuery},
    GlobalState,
};

fn category(query:&ListQuery) -> Option<String>{
    filter_value(query.category.as_deref()).map(str::to_string)
}

#[get("")]
pub async fn list_services(data:web::Data<GlobalState>, query:web::Query<ListQuery>) -> Result<HttpResponse, AppError>{
    let filter = ServiceFilter{
        category: category(&query),
        search: query.search(),
        active: query.active,
    };

    let services = data.store.list_services(&filter).await?;

    Ok(HttpResponse::Ok().json(ServiceList{ services }))
}

#[post("")]
pub async fn create_service(data:web::Data<GlobalState>, service:Json<CreateService>) -> Result<HttpResponse, AppError>{
    let service = service.into_inner();

    let title = service.title.trim().to_string();
    let category = service.category.trim().to_string();
    if title.is_empty() || category.is_empty(){
        return Err(AppError::bad_request("Title and category are required"));
    }
    if service.price.is_some_and(|p| p < 0){
        return Err(AppError::bad_request("Price cannot be negative"));
    }

    let created = data.store.create_service(NewService{
        title,
        description: service.description,
        category,
        price: service.price,
        duration: service.duration,
        image: service.image,
    }).await?;

    tracing::info!(id = %created.id, title = %created.title, "service created");

    Ok(HttpResponse::Created().json(ServiceResponse{ success: true, service: created }))
}

#[put("/{id}")]
pub async fn update_service(data:web::Data<GlobalState>, path:web::Path<String>, changes:Json<UpdateService>) -> Result<HttpResponse, AppError>{
    let changes = changes.into_inner();

    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty())
        || changes.category.as_deref().is_some_and(|c| c.trim().is_empty()){
        return Err(AppError::bad_request("Title and category cannot be empty"));
    }
    if changes.price.is_some_and(|p| p < 0){
        return Err(AppError::bad_request("Price cannot be negative"));
    }

    let service = data.store
        .update_service(&path.into_inner(), changes.into())
        .await?
        .ok_or_else(|| AppError::not_found("Service"))?;

    Ok(HttpResponse::Ok().json(ServiceResponse{ success: true, service }))
}

#[patch("/{id}")]
pub async fn patch_service(data:web::Data<GlobalState>, path:web::Path<String>, body:Json<PatchService>) -> Result<HttpResponse, AppError>{
    let id = path.into_inner();
    let changes = ServiceChanges{ is_active: Some(body.is_active), ..Default::default() };

    let service = data.store
        .update_service(&id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Service"))?;

    tracing::info!(%id, active = service.is_active, "service visibility set");

    Ok(HttpResponse::Ok().json(ServiceResponse{ success: true, service }))
}

#[delete("/{id}")]
pub async fn delete_service(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, AppError>{
    let id = path.into_inner();

    if !data.store.delete_service(&id).await?{
        return Err(AppError::not_found("Service"));
    }

    tracing::info!(%id, "service deleted");

    Ok(HttpResponse::Ok().json(DeleteResponse{ success: true, id }))
}

/// Catalogue of the public site: active services only, category matched exactly.
#[get("")]
pub async fn public_services(data:web::Data<GlobalState>, query:web::Query<ListQuery>) -> Result<HttpResponse, AppError>{
    let filter = ServiceFilter{
        category: category(&query),
        search: query.search(),
        active: Some(true),
    };

    let mut services = data.store.list_services(&filter).await?;

    if !data.store.get_settings().await?.show_prices{
        services = services.into_iter().map(Service::hide_price).collect();
    }

    Ok(HttpResponse::Ok().json(ServiceList{ services }))
}
