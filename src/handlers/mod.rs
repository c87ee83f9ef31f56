pub mod cart;
pub mod challenge;
pub mod loyalty;
pub mod order;
pub mod restaurant;
pub mod reward;
pub mod user;

pub use cart::cart_config;
pub use challenge::challenge_config;
pub use loyalty::loyalty_config;
pub use order::order_config;
pub use restaurant::restaurant_config;
pub use reward::reward_config;
pub use user::user_config;

use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use crate::services::Actor;
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取当前用户（中间件在鉴权后注入）
fn current_actor(req: &HttpRequest) -> AppResult<Actor> {
    req.extensions()
        .get::<CurrentUser>()
        .map(|u| Actor::new(u.id, u.role))
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
