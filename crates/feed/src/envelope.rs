//! 响应外层结构规范化。
//!
//! 同一后端的不同端点会返回三种外层结构：
//! - `{code, message, data}` 单层包装
//! - `{code, message, data: {data: [...], total, total_pages}}` 分页包装
//! - 不带任何包装的裸数据
//!
//! 本模块按调用方给出的结构提示剥离外层，缺失的可选层一律降级为默认值，不返回错误。

use bursa_core::market::entity::{
    BrokerSummary, FinancialReport, ListingPage, OhlcvPoint, SearchResult, StockProfile,
};
use bursa_core::market::error::MarketError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// # Summary
/// 调用方预期的响应结构提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    // 裸数据
    Bare,
    // `{code, message, data}` 单层包装
    SingleWrapped,
    // 分页包装，目标为页对象 `{data: [...], total, total_pages}`
    Paginated,
}

/// # Summary
/// 已知外层结构的标签联合。
///
/// # Invariants
/// - 只有当对象中存在非 null 的 `data` 字段时才视为包装结构。
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Wrapped {
        code: Option<i64>,
        message: Option<String>,
        data: Value,
    },
    Bare(Value),
}

impl Envelope {
    /// # Summary
    /// 对已解码的响应体进行外层结构分类。
    ///
    /// # Logic
    /// 1. 若响应体为对象且含非 null 的 `data`，拆出 `code` / `message` / `data`。
    /// 2. 否则原样作为裸数据。
    ///
    /// # Arguments
    /// * `body`: 已解码的 JSON 响应体。
    ///
    /// # Returns
    /// 分类后的 Envelope。
    pub fn classify(body: Value) -> Self {
        match body {
            Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
                let data = map.remove("data").unwrap_or(Value::Null);
                Envelope::Wrapped {
                    code: map.get("code").and_then(Value::as_i64),
                    message: map
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    data,
                }
            }
            other => Envelope::Bare(other),
        }
    }

    /// 剥掉一层包装后的内容
    pub fn into_inner(self) -> Value {
        match self {
            Envelope::Wrapped { data, .. } => data,
            Envelope::Bare(body) => body,
        }
    }
}

/// # Summary
/// 按结构提示选出最内层的有效载荷。
///
/// # Logic
/// 1. `Bare`：原样返回。
/// 2. `SingleWrapped`：有包装则返回 `data`，否则原样返回。
/// 3. `Paginated`：若 `data` 本身是含 `data` 的页对象则返回它；
///    若响应体自身就是页对象（`data` 为数组）则返回响应体；否则原样返回。
///
/// # Arguments
/// * `body`: 已解码的 JSON 响应体。
/// * `shape`: 结构提示。
///
/// # Returns
/// 选中的 JSON 层，永不失败。
pub fn peel(body: Value, shape: Shape) -> Value {
    match shape {
        Shape::Bare => body,
        Shape::SingleWrapped => Envelope::classify(body).into_inner(),
        Shape::Paginated => match body {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or(Value::Null)
            }
            // 页对象自身：{data: [...], total, total_pages}
            other => other,
        },
    }
}

/// # Summary
/// 剥离外层并解码为目标类型，失败时降级为默认值。
///
/// # Logic
/// 1. 调用 `peel` 选出有效载荷。
/// 2. 反序列化为 `T`；失败记录 `EnvelopeMismatch` 并返回 `T::default()`。
///
/// # Arguments
/// * `body`: 已解码的 JSON 响应体。
/// * `shape`: 结构提示。
///
/// # Returns
/// 解码结果或默认值。
pub fn normalize<T: DeserializeOwned + Default>(body: Value, shape: Shape) -> T {
    match decode(body, shape) {
        Ok(value) => value,
        Err(e) => {
            warn!("{}; falling back to default payload", e);
            T::default()
        }
    }
}

/// 剥离外层并严格解码
fn decode<T: DeserializeOwned>(body: Value, shape: Shape) -> Result<T, MarketError> {
    serde_json::from_value(peel(body, shape)).map_err(|e| {
        MarketError::EnvelopeMismatch(format!(
            "{:?} payload is not a {}: {}",
            shape,
            std::any::type_name::<T>(),
            e
        ))
    })
}

/// # Summary
/// 分页页对象的线上结构。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageBody {
    data: Vec<StockProfile>,
    total: u64,
    page: u32,
    limit: u32,
    total_pages: u32,
}

/// # Summary
/// 分页列表端点的规范化。
///
/// # Logic
/// 1. 以 `Paginated` 提示剥离外层。
/// 2. 缺失的页码、页大小以请求参数补齐。
///
/// # Arguments
/// * `body`: 响应体。
/// * `page`: 请求的页码。
/// * `limit`: 请求的页大小。
///
/// # Returns
/// 规范化后的 ListingPage。
pub fn listing_page(body: Value, page: u32, limit: u32) -> ListingPage {
    let raw: PageBody = normalize(body, Shape::Paginated);
    ListingPage {
        items: raw.data,
        total_items: raw.total,
        page_index: if raw.page == 0 { page } else { raw.page },
        page_size: if raw.limit == 0 { limit } else { raw.limit },
        total_pages: raw.total_pages,
    }
}

/// 搜索端点的规范化
pub fn search_result(body: Value) -> SearchResult {
    SearchResult {
        items: normalize(body, Shape::SingleWrapped),
    }
}

/// 单只股票档案端点的规范化
pub fn stock_profile(body: Value) -> StockProfile {
    normalize(body, Shape::SingleWrapped)
}

/// 日线序列端点的规范化（可能是裸数组，也可能是包装数组）
pub fn summaries(body: Value) -> Vec<OhlcvPoint> {
    normalize(body, Shape::SingleWrapped)
}

/// # Summary
/// 财报端点的规范化。
///
/// # Logic
/// 1. 以 `SingleWrapped` 提示剥离外层。
/// 2. 载荷缺失、为 null 或仍是未剥开的包装时视为不存在。
///
/// # Returns
/// 存在则返回财报。
pub fn financial_report(body: Value) -> Option<FinancialReport> {
    match peel(body, Shape::SingleWrapped) {
        Value::Object(map) if !map.contains_key("code") && !map.is_empty() => {
            match serde_json::from_value(Value::Object(map)) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("financial report payload mismatch: {}", e);
                    None
                }
            }
        }
        _ => None,
    }
}

/// 经纪商汇总端点的规范化
pub fn broker_summary(body: Value) -> BrokerSummary {
    normalize(body, Shape::SingleWrapped)
}
