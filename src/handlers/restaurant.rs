use crate::services::CatalogService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/restaurants",
    tag = "restaurant",
    responses(
        (status = 200, description = "营业中的餐厅", body = [crate::models::RestaurantResponse])
    )
)]
pub async fn list_restaurants(catalog: web::Data<CatalogService>) -> Result<HttpResponse> {
    match catalog.list_restaurants().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    tag = "restaurant",
    params(
        ("id" = i64, Path, description = "餐厅ID")
    ),
    responses(
        (status = 200, description = "餐厅详情", body = crate::models::RestaurantResponse),
        (status = 404, description = "餐厅不存在", body = crate::models::ApiError)
    )
)]
pub async fn get_restaurant(
    catalog: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog.get_restaurant(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}/menu",
    tag = "restaurant",
    params(
        ("id" = i64, Path, description = "餐厅ID")
    ),
    responses(
        (status = 200, description = "菜单", body = [crate::models::MenuItemResponse]),
        (status = 404, description = "餐厅不存在", body = crate::models::ApiError)
    )
)]
pub async fn get_menu(
    catalog: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match catalog.get_menu(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn restaurant_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/restaurants")
            .route("", web::get().to(list_restaurants))
            .route("/{id}", web::get().to(get_restaurant))
            .route("/{id}/menu", web::get().to(get_menu)),
    );
}
