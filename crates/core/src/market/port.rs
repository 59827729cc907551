use crate::common::{DateRange, InvestorType, ReportPeriod, TransactionType};
use crate::market::entity::{
    BrokerSummary, FinancialReport, ListingPage, OhlcvPoint, SearchResult, StockProfile,
};
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 经纪商汇总查询条件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerQuery {
    pub stock_code: String,
    pub range: DateRange,
    pub investor_type: InvestorType,
    pub transaction_type: TransactionType,
}

impl BrokerQuery {
    /// 使用"全部"过滤条件构造查询
    pub fn unfiltered(stock_code: &str, range: DateRange) -> Self {
        Self {
            stock_code: stock_code.to_string(),
            range,
            investor_type: InvestorType::All,
            transaction_type: TransactionType::All,
        }
    }
}

/// # Summary
/// 行情后端数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 实现者负责把各端点不一致的响应外层结构规范化为此处的实体。
/// - 每次调用都返回全新的值对象，调用之间不共享可变状态。
/// - 不做自动重试；重试由调用方重新发起同一请求。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 分页浏览股票列表。
    ///
    /// # Arguments
    /// * `page`: 页码，从 1 开始。
    /// * `limit`: 每页条数。
    ///
    /// # Returns
    /// 成功返回以服务端分页信息为准的 ListingPage。
    async fn list_stocks(&self, page: u32, limit: u32) -> Result<ListingPage, MarketError>;

    /// # Summary
    /// 按代码或名称全文搜索股票。
    ///
    /// # Arguments
    /// * `query`: 搜索关键字。
    ///
    /// # Returns
    /// 成功返回不分页的搜索结果。
    async fn search_stocks(&self, query: &str) -> Result<SearchResult, MarketError>;

    /// # Summary
    /// 获取单只股票的公司档案。
    ///
    /// # Arguments
    /// * `stock_code`: 股票代码。
    ///
    /// # Returns
    /// 成功返回 StockProfile。
    async fn fetch_stock(&self, stock_code: &str) -> Result<StockProfile, MarketError>;

    /// # Summary
    /// 获取日线 OHLCV 序列。
    ///
    /// # Logic
    /// 1. 请求指定日期范围内的日线数据。
    /// 2. 返回顺序与后端一致，不保证按日期排序。
    ///
    /// # Arguments
    /// * `stock_code`: 股票代码。
    /// * `range`: 日期范围。
    ///
    /// # Returns
    /// 成功返回 OHLCV 列表。
    async fn fetch_summaries(
        &self,
        stock_code: &str,
        range: DateRange,
    ) -> Result<Vec<OhlcvPoint>, MarketError>;

    /// # Summary
    /// 获取某一 (周期, 年份) 的财报。
    ///
    /// # Returns
    /// 成功返回财报；不存在时返回 `MarketError::NotFound`。
    async fn fetch_financial_report(
        &self,
        stock_code: &str,
        period: ReportPeriod,
        year: &str,
    ) -> Result<FinancialReport, MarketError>;

    /// # Summary
    /// 获取经纪商买卖汇总。
    ///
    /// # Arguments
    /// * `query`: 股票、日期范围与过滤条件。
    ///
    /// # Returns
    /// 成功返回 BrokerSummary。
    async fn fetch_broker_summary(&self, query: &BrokerQuery)
    -> Result<BrokerSummary, MarketError>;
}
