pub mod access_control;
pub mod cart_service;
pub mod catalog_service;
pub mod challenge_service;
pub mod loyalty_service;
pub mod order_service;
pub mod pricing;
pub mod reward_service;

pub use access_control::Actor;
pub use cart_service::*;
pub use catalog_service::*;
pub use challenge_service::*;
pub use loyalty_service::*;
pub use order_service::*;
pub use reward_service::*;
