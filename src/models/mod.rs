pub mod cart;
pub mod challenge;
pub mod common;
pub mod loyalty;
pub mod order;
pub mod restaurant;
pub mod reward;
pub mod user;

pub use cart::*;
pub use challenge::*;
pub use common::*;
pub use loyalty::*;
pub use order::*;
pub use restaurant::*;
pub use reward::*;
pub use user::*;
