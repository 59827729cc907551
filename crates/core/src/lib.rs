//! # `bursa-core` - 领域核心
//!
//! 定义行情客户端的实体、错误与端口 (Port)。
//! 本 crate 不包含任何网络或运行时实现，只描述契约。

pub mod common;
pub mod config;
pub mod market;
