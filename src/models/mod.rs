pub mod lead;
pub mod user;
