//! # RBAC API Library
//!
//! This library provides the core functionality for the RBAC API service,
//! including handlers, models, repositories, and server configuration.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
