//! 数据模型模块
//! 凭据、刷新令牌记录与边界请求/响应结构

pub mod auth;
pub mod token;
pub mod user;

pub use auth::*;
pub use token::*;
pub use user::*;
