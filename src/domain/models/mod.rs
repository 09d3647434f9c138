pub mod auth;
pub mod booking;
pub mod job;
pub mod money;
pub mod notification;
pub mod property;
pub mod user;
