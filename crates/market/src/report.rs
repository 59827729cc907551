use bursa_core::common::ReportPeriod;
use bursa_core::common::time::TimeProvider;
use bursa_core::config::ReportConfig;
use bursa_core::market::entity::FinancialReport;
use bursa_core::market::error::MarketError;
use bursa_core::market::port::MarketDataProvider;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 网格最多回溯的年数（4 个周期 × 5 年 = 20 个单元）
pub const MAX_YEARS: u32 = 5;

/// # Summary
/// 报表网格中的一个单元：(周期, 年份)。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportCell {
    pub period: ReportPeriod,
    pub year: String,
}

/// # Summary
/// 某只股票的 (年份 × 周期) 报表网格。
///
/// # Invariants
/// - 迭代顺序固定：年份从近到远，同一年内周期按声明顺序。
/// - 单元数不超过 `4 × MAX_YEARS`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGrid {
    stock_code: String,
    cells: Vec<ReportCell>,
}

impl ReportGrid {
    /// # Summary
    /// 构造以 `current_year` 结尾、回溯 `years` 年的网格。
    ///
    /// # Logic
    /// 1. 年数截断到 `MAX_YEARS`。
    /// 2. 外层按年份递减，内层按 `ReportPeriod::ALL` 展开。
    ///
    /// # Arguments
    /// * `stock_code`: 股票代码。
    /// * `current_year`: 当前年份。
    /// * `years`: 回溯年数，0 表示空网格。
    ///
    /// # Returns
    /// 构造好的网格。
    pub fn trailing(stock_code: &str, current_year: i32, years: u32) -> Self {
        let years = years.min(MAX_YEARS);
        let cells = (0..years)
            .filter_map(|offset| i32::try_from(offset).ok())
            .flat_map(|offset| {
                let year = (current_year - offset).to_string();
                ReportPeriod::ALL.into_iter().map(move |period| ReportCell {
                    period,
                    year: year.clone(),
                })
            })
            .collect();
        Self {
            stock_code: stock_code.to_string(),
            cells,
        }
    }

    pub fn stock_code(&self) -> &str {
        &self.stock_code
    }

    /// 按迭代顺序排列的全部单元
    pub fn cells(&self) -> &[ReportCell] {
        &self.cells
    }
}

/// # Summary
/// 合并各单元的结算结果。
///
/// # Logic
/// 丢弃缺失单元，保留的财报按输入（即网格）顺序排列，与结算先后无关。
///
/// # Arguments
/// * `settled`: 与网格单元一一对应的结果。
///
/// # Returns
/// 过滤后的财报列表。
pub fn merge(settled: Vec<Option<FinancialReport>>) -> Vec<FinancialReport> {
    settled.into_iter().flatten().collect()
}

/// # Summary
/// 财报网格聚合器：对每个单元并发请求，容忍单元失败。
///
/// # Invariants
/// - 单元失败（网络、不存在、结构不符）只记录日志并视为缺失，不影响其他单元。
/// - 对外只暴露合并后的列表，不暴露单元级错误。
pub struct ReportAggregator {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn TimeProvider>,
    years: u32,
}

impl ReportAggregator {
    /// # Summary
    /// 创建聚合器。
    ///
    /// # Arguments
    /// * `provider`: 行情数据提供者。
    /// * `clock`: 用于确定当前年份的时钟。
    /// * `config`: 报表配置。
    ///
    /// # Returns
    /// 聚合器实例。
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        config: &ReportConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            years: config.years,
        }
    }

    /// 以当前年份为终点加载网格内全部财报
    pub async fn load(&self, stock_code: &str) -> Vec<FinancialReport> {
        let grid = ReportGrid::trailing(stock_code, self.clock.current_year(), self.years);
        self.gather(&grid).await
    }

    /// # Summary
    /// 并发请求网格内所有单元并合并。
    ///
    /// # Logic
    /// 1. 为每个单元构造请求 future。
    /// 2. `join_all` 等待全部结算，结果顺序与网格一致。
    /// 3. 调用 `merge` 过滤缺失单元。
    ///
    /// # Arguments
    /// * `grid`: 报表网格。
    ///
    /// # Returns
    /// 按网格顺序排列的财报列表。
    pub async fn gather(&self, grid: &ReportGrid) -> Vec<FinancialReport> {
        let fetches = grid
            .cells()
            .iter()
            .map(|cell| self.fetch_cell(grid.stock_code(), cell));
        let settled = join_all(fetches).await;

        let total = settled.len();
        let reports = merge(settled);
        info!(
            "Report grid for {}: {}/{} cells present",
            grid.stock_code(),
            reports.len(),
            total
        );
        reports
    }

    async fn fetch_cell(&self, stock_code: &str, cell: &ReportCell) -> Option<FinancialReport> {
        match self
            .provider
            .fetch_financial_report(stock_code, cell.period, &cell.year)
            .await
        {
            Ok(report) => Some(report),
            Err(MarketError::NotFound) => {
                debug!("No {} {} report for {}", cell.period, cell.year, stock_code);
                None
            }
            Err(e) => {
                warn!(
                    "Report cell {} {} for {} failed: {}",
                    cell.period, cell.year, stock_code, e
                );
                None
            }
        }
    }
}
