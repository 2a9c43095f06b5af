pub mod account_service;
pub mod admin_service;
pub mod auth_service;
pub mod password_service;
