#![allow(dead_code)]

use async_trait::async_trait;
use bursa_core::common::{DateRange, ReportPeriod};
use bursa_core::market::entity::{
    BrokerRow, BrokerSummary, CompanyProfile, FinancialReport, ListingPage, OhlcvPoint,
    SearchResult, StockProfile,
};
use bursa_core::market::error::MarketError;
use bursa_core::market::port::{BrokerQuery, MarketDataProvider};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// 模拟提供者记录下的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List { page: u32, limit: u32 },
    Search(String),
    Stock(String),
    Summaries(String),
    Report(ReportPeriod, String),
    Broker(BrokerQuery),
}

/// # Summary
/// 可编排的模拟行情后端：固定股票池、可配置延迟与失败。
pub struct MockProvider {
    pub stocks: Vec<StockProfile>,
    pub page_delays: HashMap<u32, Duration>,
    pub search_delay: Duration,
    pub fail_listing: AtomicBool,
    pub fail_profile: bool,
    pub fail_broker: bool,
    // 返回 NotFound 的财报单元
    pub missing_reports: HashSet<(ReportPeriod, String)>,
    // 返回网络错误的财报单元
    pub broken_reports: HashSet<(ReportPeriod, String)>,
    calls: Mutex<Vec<Call>>,
}

const SECTORS: [&str; 3] = ["Financials", "Energy", "Infrastructures"];

impl MockProvider {
    /// 构造含 `count` 只股票的股票池，行业轮流分配
    pub fn with_stocks(count: usize) -> Self {
        let stocks = (0..count)
            .map(|i| StockProfile {
                code: format!("S{:03}", i),
                name: format!("Stock {}", i),
                profiles: vec![CompanyProfile {
                    sector: SECTORS[i % SECTORS.len()].to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .collect();
        Self {
            stocks,
            page_delays: HashMap::new(),
            search_delay: Duration::ZERO,
            fail_listing: AtomicBool::new(false),
            fail_profile: false,
            fail_broker: false,
            missing_reports: HashSet::new(),
            broken_reports: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub fn listings(&self) -> Vec<(u32, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::List { page, limit } => Some((page, limit)),
                _ => None,
            })
            .collect()
    }

    pub fn report_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Report(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// 越新的单元延迟越长，使结算顺序与网格顺序相反
pub fn report_delay(period: ReportPeriod, year: &str) -> Duration {
    let year: u64 = year.parse().unwrap_or(2000);
    let period_rank = ReportPeriod::ALL
        .iter()
        .position(|p| *p == period)
        .unwrap_or(0) as u64;
    Duration::from_millis((year - 2000) * 40 + (4 - period_rank) * 5)
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn list_stocks(&self, page: u32, limit: u32) -> Result<ListingPage, MarketError> {
        self.record(Call::List { page, limit });
        if let Some(delay) = self.page_delays.get(&page) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(MarketError::Network("connection refused".to_string()));
        }
        let limit_len = limit as usize;
        let items: Vec<StockProfile> = self
            .stocks
            .iter()
            .skip((page as usize - 1) * limit_len)
            .take(limit_len)
            .cloned()
            .collect();
        let total = self.stocks.len() as u32;
        Ok(ListingPage {
            items,
            total_items: u64::from(total),
            page_index: page,
            page_size: limit,
            total_pages: total.div_ceil(limit),
        })
    }

    async fn search_stocks(&self, query: &str) -> Result<SearchResult, MarketError> {
        self.record(Call::Search(query.to_string()));
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        let needle = query.to_lowercase();
        let items = self
            .stocks
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(SearchResult { items })
    }

    async fn fetch_stock(&self, stock_code: &str) -> Result<StockProfile, MarketError> {
        self.record(Call::Stock(stock_code.to_string()));
        tokio::time::sleep(Duration::from_millis(30)).await;
        if self.fail_profile {
            return Err(MarketError::NotFound);
        }
        Ok(StockProfile {
            code: stock_code.to_string(),
            name: format!("{} Tbk", stock_code),
            ..Default::default()
        })
    }

    async fn fetch_summaries(
        &self,
        stock_code: &str,
        range: DateRange,
    ) -> Result<Vec<OhlcvPoint>, MarketError> {
        self.record(Call::Summaries(stock_code.to_string()));
        // 倒序返回，模拟后端不保证排序
        let mut points = Vec::new();
        let mut date = range.end;
        let mut close = 130.0;
        while date >= range.start {
            points.push(OhlcvPoint {
                date,
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: close * 100.0,
                previous_close: None,
            });
            close -= 1.0;
            date = date.pred_opt().unwrap();
        }
        Ok(points)
    }

    async fn fetch_financial_report(
        &self,
        stock_code: &str,
        period: ReportPeriod,
        year: &str,
    ) -> Result<FinancialReport, MarketError> {
        self.record(Call::Report(period, year.to_string()));
        tokio::time::sleep(report_delay(period, year)).await;
        let cell = (period, year.to_string());
        if self.missing_reports.contains(&cell) {
            return Err(MarketError::NotFound);
        }
        if self.broken_reports.contains(&cell) {
            return Err(MarketError::Network("timed out".to_string()));
        }
        Ok(FinancialReport {
            stock_code: stock_code.to_string(),
            report_period: period.to_string(),
            report_year: year.to_string(),
            ..Default::default()
        })
    }

    async fn fetch_broker_summary(
        &self,
        query: &BrokerQuery,
    ) -> Result<BrokerSummary, MarketError> {
        self.record(Call::Broker(query.clone()));
        if self.fail_broker {
            return Err(MarketError::Status(500));
        }
        let row = |code: &str| BrokerRow {
            broker_code: code.to_string(),
            lot: 10.0,
            value: "1.2B".to_string(),
            average: 4500.0,
        };
        Ok(BrokerSummary {
            stock_code: query.stock_code.clone(),
            start_date: query.range.start_param(),
            end_date: query.range.end_param(),
            buyers: vec![row("YP"), row("CC")],
            sellers: vec![row("ZP")],
            ..Default::default()
        })
    }
}
