pub mod auth_service;
pub mod lead_service;
pub mod user_service;
pub mod zalo_service;
