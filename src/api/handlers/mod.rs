pub mod auth;
pub mod booking;
pub mod health;
pub mod host;
pub mod property;
