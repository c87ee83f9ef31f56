pub mod challenges;
pub mod loyalty_activities;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod restaurants;
pub mod rewards;
pub mod user_challenges;
pub mod user_rewards;
pub mod users;

pub use challenges as challenge_entity;
pub use loyalty_activities as loyalty_activity_entity;
pub use menu_items as menu_item_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use restaurants as restaurant_entity;
pub use rewards as reward_entity;
pub use user_challenges as user_challenge_entity;
pub use user_rewards as user_reward_entity;
pub use users as user_entity;

pub use loyalty_activities::LoyaltyAction;
pub use orders::OrderStatus;
pub use users::{RewardTier, UserRole};
