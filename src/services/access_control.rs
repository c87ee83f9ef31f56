//! 角色 / 归属校验
//!
//! 订单状态转移权限以数据表形式给出 (角色, 当前状态, 目标状态),
//! 表外的组合一律拒绝。

use crate::entities::{OrderStatus, UserRole, order_entity as orders};
use crate::error::{AppError, AppResult};

/// 已认证的调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn require_role(&self, role: UserRole) -> AppResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Requires role {role}")))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub role: UserRole,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

const fn rule(role: UserRole, from: OrderStatus, to: OrderStatus) -> TransitionRule {
    TransitionRule { role, from, to }
}

pub const TRANSITION_RULES: &[TransitionRule] = &[
    rule(UserRole::RestaurantAdmin, OrderStatus::Placed, OrderStatus::Confirmed),
    rule(UserRole::RestaurantAdmin, OrderStatus::Confirmed, OrderStatus::Preparing),
    rule(UserRole::RestaurantAdmin, OrderStatus::Placed, OrderStatus::Cancelled),
    rule(UserRole::RestaurantAdmin, OrderStatus::Confirmed, OrderStatus::Cancelled),
    rule(UserRole::RestaurantAdmin, OrderStatus::Preparing, OrderStatus::Cancelled),
    rule(UserRole::DeliveryPartner, OrderStatus::Preparing, OrderStatus::OutForDelivery),
    rule(UserRole::DeliveryPartner, OrderStatus::OutForDelivery, OrderStatus::Delivered),
];

/// 该角色是否有权把订单推进到 `target`（不看当前状态）
pub fn role_may_target(role: UserRole, target: OrderStatus) -> bool {
    TRANSITION_RULES
        .iter()
        .any(|r| r.role == role && r.to == target)
}

pub fn is_transition_allowed(role: UserRole, from: OrderStatus, to: OrderStatus) -> bool {
    TRANSITION_RULES
        .iter()
        .any(|r| r.role == role && r.from == from && r.to == to)
}

/// 订单的归属关系: 下单人 / 餐厅管理员 / 被指派的配送员
pub fn is_order_customer(actor: &Actor, order: &orders::Model) -> bool {
    actor.role == UserRole::Customer && order.user_id == actor.id
}

pub fn is_restaurant_admin_of(actor: &Actor, restaurant_owner_id: Option<i64>) -> bool {
    actor.role == UserRole::RestaurantAdmin && restaurant_owner_id == Some(actor.id)
}

pub fn is_assigned_partner(actor: &Actor, order: &orders::Model) -> bool {
    actor.role == UserRole::DeliveryPartner && order.delivery_partner_id == Some(actor.id)
}

pub fn can_view_order(
    actor: &Actor,
    order: &orders::Model,
    restaurant_owner_id: Option<i64>,
) -> bool {
    is_order_customer(actor, order)
        || is_restaurant_admin_of(actor, restaurant_owner_id)
        || is_assigned_partner(actor, order)
}

/// 校验顺序: 角色无权该目标状态 -> Forbidden; 不拥有订单 -> Forbidden;
/// (角色, 当前, 目标) 不在表中 -> InvalidTransition
pub fn authorize_transition(
    actor: &Actor,
    order: &orders::Model,
    restaurant_owner_id: Option<i64>,
    target: OrderStatus,
) -> AppResult<()> {
    if !role_may_target(actor.role, target) {
        return Err(AppError::Forbidden(format!(
            "Role {} may not move orders to {target}",
            actor.role
        )));
    }

    let owns = match actor.role {
        UserRole::RestaurantAdmin => is_restaurant_admin_of(actor, restaurant_owner_id),
        UserRole::DeliveryPartner => is_assigned_partner(actor, order),
        UserRole::Customer => false,
    };
    if !owns {
        return Err(AppError::Forbidden(format!(
            "User {} has no rights on order {}",
            actor.id, order.id
        )));
    }

    if !is_transition_allowed(actor.role, order.status, target) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot move order {} from {} to {target}",
            order.id, order.status
        )));
    }

    Ok(())
}
