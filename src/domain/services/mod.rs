pub mod auth_service;
pub mod availability;
pub mod booking_validator;
pub mod calendar;
pub mod dashboard;
