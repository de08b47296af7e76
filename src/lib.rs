pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod roles;
pub mod services;
pub mod tenancy;
