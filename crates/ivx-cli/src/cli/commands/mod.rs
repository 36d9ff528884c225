pub mod health;
pub mod interview;
pub mod session;
