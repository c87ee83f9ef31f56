pub mod connection;
pub mod retry;

pub use connection::*;
pub use retry::*;
