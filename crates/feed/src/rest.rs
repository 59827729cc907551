use crate::envelope;
use async_trait::async_trait;
use bursa_core::common::{DateRange, ReportPeriod};
use bursa_core::config::BackendConfig;
use bursa_core::market::entity::{
    BrokerSummary, FinancialReport, ListingPage, OhlcvPoint, SearchResult, StockProfile,
};
use bursa_core::market::error::MarketError;
use bursa_core::market::port::{BrokerQuery, MarketDataProvider};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// # Summary
/// 行情后端 REST 数据提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，所有请求均为无鉴权的 `GET`。
/// - 所有端点共享同一个请求原语 `get_json`。
#[derive(Clone)]
pub struct RestProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 后端根地址，不带末尾斜杠
    base_url: String,
}

impl RestProvider {
    /// # Summary
    /// 创建一个新的 RestProvider 实例。
    ///
    /// # Logic
    /// 1. 安装进程级 TLS 加密提供者（已安装则忽略）。
    /// 2. 按配置设置超时与 `Accept: application/json`。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `config`: 后端连接配置。
    ///
    /// # Returns
    /// 成功返回 RestProvider，客户端构建失败返回 `MarketError::Network`。
    pub fn new(config: &BackendConfig) -> Result<Self, MarketError> {
        // 重复安装会返回 Err，这里只需保证进程内至少装过一次
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("TLS crypto provider already installed");
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// # Summary
    /// 共享请求原语：发起 GET 请求并解码 JSON 响应体。
    ///
    /// # Logic
    /// 1. 拼接根地址与路径，附加查询参数。
    /// 2. 传输失败映射为 `Network`。
    /// 3. 404 映射为 `NotFound`，其他非 2xx 映射为 `Status`。
    /// 4. 响应体不是 JSON 映射为 `Parse`。
    ///
    /// # Arguments
    /// * `path`: 以 `/` 开头的端点路径。
    /// * `query`: 查询参数。
    ///
    /// # Returns
    /// 成功返回未剥离外层的 JSON 响应体。
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, MarketError> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        let status = resp.status();
        debug!("GET {} {:?} -> {}", url, query, status);
        if status == StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound);
        }
        if !status.is_success() {
            return Err(MarketError::Status(status.as_u16()));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for RestProvider {
    async fn list_stocks(&self, page: u32, limit: u32) -> Result<ListingPage, MarketError> {
        let (page_param, limit_param) = (page.to_string(), limit.to_string());
        let body = self
            .get_json(
                "/api/v1/stocks",
                &[("page", page_param.as_str()), ("limit", limit_param.as_str())],
            )
            .await?;
        Ok(envelope::listing_page(body, page, limit))
    }

    /// # Summary
    /// 全文搜索股票。
    ///
    /// # Logic
    /// 1. 去除首尾空白；空关键字直接返回空结果，不发请求（后端会以 400 拒绝）。
    /// 2. 请求搜索端点并规范化。
    async fn search_stocks(&self, query: &str) -> Result<SearchResult, MarketError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResult::default());
        }
        let body = self
            .get_json("/api/v1/stocks/search", &[("q", query)])
            .await?;
        Ok(envelope::search_result(body))
    }

    async fn fetch_stock(&self, stock_code: &str) -> Result<StockProfile, MarketError> {
        let body = self
            .get_json("/api/v1/stock", &[("stock_code", stock_code)])
            .await?;
        Ok(envelope::stock_profile(body))
    }

    async fn fetch_summaries(
        &self,
        stock_code: &str,
        range: DateRange,
    ) -> Result<Vec<OhlcvPoint>, MarketError> {
        let (start, end) = (range.start_param(), range.end_param());
        let body = self
            .get_json(
                "/api/v1/stock/summaries",
                &[
                    ("stock_code", stock_code),
                    ("start_date", start.as_str()),
                    ("end_date", end.as_str()),
                ],
            )
            .await?;
        Ok(envelope::summaries(body))
    }

    /// # Summary
    /// 获取单个报表网格单元。
    ///
    /// # Logic
    /// 1. 请求财报端点。
    /// 2. 响应中没有财报载荷时同样视为 `NotFound`。
    async fn fetch_financial_report(
        &self,
        stock_code: &str,
        period: ReportPeriod,
        year: &str,
    ) -> Result<FinancialReport, MarketError> {
        let period = period.to_string();
        let body = self
            .get_json(
                "/api/v1/financial_report",
                &[
                    ("stock_code", stock_code),
                    ("report_period", period.as_str()),
                    ("report_year", year),
                ],
            )
            .await?;
        envelope::financial_report(body).ok_or(MarketError::NotFound)
    }

    async fn fetch_broker_summary(
        &self,
        query: &BrokerQuery,
    ) -> Result<BrokerSummary, MarketError> {
        let (start, end) = (query.range.start_param(), query.range.end_param());
        let body = self
            .get_json(
                "/api/v1/brokers/summaries",
                &[
                    ("stock_code", query.stock_code.as_str()),
                    ("start_date", start.as_str()),
                    ("end_date", end.as_str()),
                    ("investor_type", query.investor_type.wire_code()),
                    ("transaction_type", query.transaction_type.wire_code()),
                ],
            )
            .await?;
        Ok(envelope::broker_summary(body))
    }
}
