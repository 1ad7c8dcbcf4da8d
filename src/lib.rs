//! Chirpy 认证核心
//! 密码哈希、访问令牌、刷新令牌与会话生命周期

pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod telemetry;
