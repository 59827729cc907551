//! # `bursa-market` - 行情数据聚合与分析层
//!
//! - `chart`: 从日线序列派生 K 线、均线与成交量柱
//! - `report`: 财报网格的并发抓取与合并
//! - `broker`: 经纪商汇总的容错加载与并排展示
//! - `detail`: 单只股票详情视图模型的组装
//! - `listing` / `controller`: 股票列表的状态机与其异步驱动

pub mod broker;
pub mod chart;
pub mod controller;
pub mod detail;
pub mod listing;
pub mod report;
