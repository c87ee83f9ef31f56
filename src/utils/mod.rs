pub mod code_generator;
pub mod jwt;

pub use code_generator::{generate_redemption_code, is_redemption_code_format};
pub use jwt::*;
