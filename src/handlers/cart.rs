use super::current_actor;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "购物车及价格明细", body = CartResponse),
        (status = 401, description = "未授权", body = ApiError)
    )
)]
pub async fn get_cart(cart_service: web::Data<CartService>, req: HttpRequest) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    let cart = cart_service.get_cart(actor.id).await;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": cart })))
}

#[utoipa::path(
    post,
    path = "/cart",
    tag = "cart",
    request_body = AddCartItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "加入购物车成功", body = CartResponse),
        (status = 400, description = "数量无效 / 跨餐厅 / 餐厅已打烊", body = ApiError),
        (status = 404, description = "菜品不存在", body = ApiError)
    )
)]
pub async fn add_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    request: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service
        .add_item(actor.id, request.menu_item_id, request.quantity)
        .await
    {
        Ok(cart) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": cart }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/{menu_item_id}",
    tag = "cart",
    params(
        ("menu_item_id" = i64, Path, description = "菜品ID")
    ),
    request_body = UpdateCartItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新成功（数量 <= 0 时移除）", body = CartResponse),
        (status = 404, description = "购物车中无此菜品", body = ApiError)
    )
)]
pub async fn update_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service
        .update_item(actor.id, path.into_inner(), request.quantity)
        .await
    {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": cart }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart/{menu_item_id}",
    tag = "cart",
    params(
        ("menu_item_id" = i64, Path, description = "菜品ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "移除成功", body = CartResponse),
        (status = 404, description = "购物车中无此菜品", body = ApiError)
    )
)]
pub async fn remove_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.remove_item(actor.id, path.into_inner()).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": cart }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart",
    tag = "cart",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已清空", body = CartResponse)
    )
)]
pub async fn clear_cart(cart_service: web::Data<CartService>, req: HttpRequest) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    cart_service.clear(actor.id).await;
    let cart = cart_service.get_cart(actor.id).await;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": cart })))
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(get_cart))
            .route("", web::post().to(add_item))
            .route("", web::delete().to(clear_cart))
            .route("/{menu_item_id}", web::put().to(update_item))
            .route("/{menu_item_id}", web::delete().to(remove_item)),
    );
}
