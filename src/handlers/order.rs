use super::current_actor;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订单列表成功", body = [OrderResponse]),
        (status = 401, description = "未授权", body = ApiError)
    )
)]
/// 顾客看自己的订单, 餐厅管理员看名下餐厅订单, 配送员看指派给自己的订单
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.list_orders(&actor).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "下单成功", body = OrderDetailResponse),
        (status = 400, description = "购物车为空或地址无效", body = ApiError),
        (status = 403, description = "非顾客账号", body = ApiError)
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service
        .place_order(&actor, &request.delivery_address)
        .await
    {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取订单成功", body = OrderDetailResponse),
        (status = 403, description = "无权查看", body = ApiError),
        (status = 404, description = "订单不存在", body = ApiError)
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.get_order(&actor, path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    tag = "order",
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    request_body = UpdateOrderStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态更新成功", body = OrderResponse),
        (status = 400, description = "非法状态转移", body = ApiError),
        (status = 403, description = "无权操作", body = ApiError),
        (status = 404, description = "订单不存在", body = ApiError),
        (status = 409, description = "并发冲突", body = ApiError)
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };
    let request = request.into_inner();

    match order_service
        .update_status(
            &actor,
            path.into_inner(),
            request.status,
            request.delivery_partner_id,
        )
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/assign",
    tag = "order",
    params(
        ("id" = i64, Path, description = "订单ID")
    ),
    request_body = AssignDeliveryPartnerRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "指派成功", body = OrderResponse),
        (status = 400, description = "订单状态或配送员无效", body = ApiError),
        (status = 403, description = "无权操作", body = ApiError),
        (status = 404, description = "订单不存在", body = ApiError)
    )
)]
pub async fn assign_delivery_partner(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AssignDeliveryPartnerRequest>,
) -> Result<HttpResponse> {
    let actor = match current_actor(&req) {
        Ok(actor) => actor,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service
        .assign_delivery_partner(&actor, path.into_inner(), request.delivery_partner_id)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(list_orders))
            .route("", web::post().to(create_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/status", web::put().to(update_order_status))
            .route("/{id}/assign", web::post().to(assign_delivery_partner)),
    );
}
