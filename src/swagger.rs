use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{LoyaltyAction, OrderStatus, RewardTier, UserRole};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::order::list_orders,
        handlers::order::create_order,
        handlers::order::get_order,
        handlers::order::update_order_status,
        handlers::order::assign_delivery_partner,
        handlers::cart::get_cart,
        handlers::cart::add_item,
        handlers::cart::update_item,
        handlers::cart::remove_item,
        handlers::cart::clear_cart,
        handlers::loyalty::get_points,
        handlers::loyalty::get_activities,
        handlers::reward::list_rewards,
        handlers::reward::redeem_reward,
        handlers::reward::verify_reward_code,
        handlers::reward::use_reward_code,
        handlers::reward::list_user_rewards,
        handlers::challenge::list_challenges,
        handlers::challenge::join_challenge,
        handlers::challenge::update_progress,
        handlers::challenge::list_user_challenges,
        handlers::restaurant::list_restaurants,
        handlers::restaurant::get_restaurant,
        handlers::restaurant::get_menu,
        handlers::user::get_profile,
        handlers::user::list_delivery_partners,
    ),
    components(
        schemas(
            UserRole,
            RewardTier,
            OrderStatus,
            LoyaltyAction,
            OrderResponse,
            OrderItemResponse,
            OrderDetailResponse,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            AssignDeliveryPartnerRequest,
            CartItem,
            PriceBreakdown,
            CartResponse,
            AddCartItemRequest,
            UpdateCartItemRequest,
            LoyaltyPointsResponse,
            LoyaltyActivityResponse,
            RewardResponse,
            UserRewardResponse,
            RewardCodeRequest,
            ChallengeResponse,
            UserChallengeResponse,
            ActiveUserChallengeResponse,
            RestaurantResponse,
            MenuItemResponse,
            UserResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "order", description = "Order lifecycle API"),
        (name = "cart", description = "Shopping cart API"),
        (name = "loyalty", description = "Loyalty points API"),
        (name = "reward", description = "Reward redemption API"),
        (name = "challenge", description = "Challenge API"),
        (name = "restaurant", description = "Restaurant catalog API"),
        (name = "user", description = "User API"),
    ),
    info(
        title = "FoodDash Backend API",
        version = "1.0.0",
        description = "FoodDash food delivery and loyalty REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
