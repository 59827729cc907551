use crate::broker::BrokerSummaryLoader;
use crate::chart::ChartSeries;
use crate::report::ReportAggregator;
use bursa_core::common::DateRange;
use bursa_core::common::time::TimeProvider;
use bursa_core::config::ClientConfig;
use bursa_core::market::entity::{BrokerSummary, FinancialReport, OhlcvPoint, StockProfile};
use bursa_core::market::error::MarketError;
use bursa_core::market::port::{BrokerQuery, MarketDataProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// # Summary
/// 个股页的主数据：资料、日线与由日线派生的图表。
///
/// # Invariants
/// - `chart` 始终由同一份 `summaries` 构建。
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub profile: StockProfile,
    pub range: DateRange,
    pub summaries: Vec<OhlcvPoint>,
    pub chart: ChartSeries,
}

/// # Summary
/// 个股页完整数据。
///
/// # Invariants
/// - 只有主数据成功时才会构造；财报与经纪商汇总为尽力而为的辅助数据。
#[derive(Debug, Clone, PartialEq)]
pub struct StockDetail {
    pub history: PriceHistory,
    pub reports: Vec<FinancialReport>,
    pub broker: BrokerSummary,
}

/// # Summary
/// 个股页加载器，组合主数据请求、财报网格与经纪商汇总。
pub struct StockDetailLoader {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn TimeProvider>,
    reports: ReportAggregator,
    broker: BrokerSummaryLoader,
    sma_window: usize,
    range_days: u32,
}

impl StockDetailLoader {
    /// # Summary
    /// 创建加载器。
    ///
    /// # Arguments
    /// * `provider`: 行情数据提供者。
    /// * `clock`: 时钟，用于默认日期范围与财报年份。
    /// * `config`: 客户端配置。
    ///
    /// # Returns
    /// 加载器实例。
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            reports: ReportAggregator::new(provider.clone(), clock.clone(), &config.reports),
            broker: BrokerSummaryLoader::new(provider.clone()),
            provider,
            clock,
            sma_window: config.chart.sma_window,
            range_days: config.chart.default_range_days,
        }
    }

    /// 以今天为终点的默认日期范围
    pub fn default_range(&self) -> DateRange {
        DateRange::trailing_days(self.clock.today(), self.range_days)
    }

    /// # Summary
    /// 加载个股页全部数据。
    ///
    /// # Logic
    /// 1. 主数据、财报网格与经纪商汇总三路并发。
    /// 2. 主数据任一请求失败即返回错误，辅助数据的失败已在各自加载器内降级。
    ///
    /// # Arguments
    /// * `stock_code`: 股票代码。
    /// * `range`: 日线与经纪商汇总的日期范围。
    ///
    /// # Returns
    /// 成功返回 StockDetail，主数据失败返回对应的 MarketError。
    pub async fn load(
        &self,
        stock_code: &str,
        range: DateRange,
    ) -> Result<StockDetail, MarketError> {
        let query = BrokerQuery::unfiltered(stock_code, range);
        let (history, reports, broker) = tokio::join!(
            self.reload_history(stock_code, range),
            self.reports.load(stock_code),
            self.broker.load(&query),
        );

        let history = history?;
        info!(
            "Loaded {}: {} summaries, {} reports, {}/{} broker rows",
            stock_code,
            history.summaries.len(),
            reports.len(),
            broker.buyers.len(),
            broker.sellers.len()
        );
        Ok(StockDetail {
            history,
            reports,
            broker,
        })
    }

    /// # Summary
    /// 加载主数据，日期范围变化时单独调用。
    ///
    /// # Logic
    /// 1. 资料与日线并发请求，任一失败即整体失败。
    /// 2. 由日线构建图表数据。
    pub async fn reload_history(
        &self,
        stock_code: &str,
        range: DateRange,
    ) -> Result<PriceHistory, MarketError> {
        let (profile, summaries) = tokio::try_join!(
            self.provider.fetch_stock(stock_code),
            self.provider.fetch_summaries(stock_code, range),
        )
        .inspect_err(|e| warn!("Primary data for {} failed: {}", stock_code, e))?;

        let chart = ChartSeries::build(&summaries, self.sma_window);
        Ok(PriceHistory {
            profile,
            range,
            summaries,
            chart,
        })
    }

    /// 过滤条件或日期范围变化时重新加载经纪商汇总
    pub async fn reload_broker(&self, query: &BrokerQuery) -> BrokerSummary {
        self.broker.load(query).await
    }
}
