use thiserror::Error;

/// # Summary
/// 行情数据域错误枚举，处理网络、HTTP 状态、解析及数据缺失等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 外层结构不匹配 (`EnvelopeMismatch`) 只用于日志，调用方拿到的是降级后的默认值。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    // 网络层错误（连接失败、超时），包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 后端返回非 2xx 且非 404 的状态码
    #[error("HTTP status {0}")]
    Status(u16),
    // 请求的数据未找到 (404 或内容为空)
    #[error("Data not found")]
    NotFound,
    // 响应体不是合法 JSON
    #[error("Parse error: {0}")]
    Parse(String),
    // 响应外层结构与预期不符
    #[error("Envelope mismatch: {0}")]
    EnvelopeMismatch(String),
}

impl MarketError {
    /// 是否为数据缺失
    pub fn is_not_found(&self) -> bool {
        matches!(self, MarketError::NotFound)
    }
}
