pub mod bind;
pub mod manager;
pub mod models;
