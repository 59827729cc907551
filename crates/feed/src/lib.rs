//! # `bursa-feed` - 行情后端适配器
//!
//! 通过 REST 接口访问行情后端，并把各端点不一致的响应外层结构
//! 规范化为 `bursa-core` 定义的实体。

pub mod envelope;
pub mod rest;
