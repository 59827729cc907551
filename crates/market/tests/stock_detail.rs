mod common;

use bursa_core::common::time::FakeClockProvider;
use bursa_core::common::{DateRange, InvestorType, TransactionType};
use bursa_core::config::ClientConfig;
use bursa_core::market::error::MarketError;
use bursa_core::market::port::BrokerQuery;
use bursa_market::broker::BrokerSummaryExt;
use bursa_market::detail::StockDetailLoader;
use chrono::{NaiveDate, TimeZone, Utc};
use common::{Call, MockProvider};
use std::sync::Arc;

fn loader(mock: MockProvider) -> (Arc<MockProvider>, StockDetailLoader) {
    let provider = Arc::new(mock);
    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2025, 6, 30, 9, 0, 0).unwrap(),
    ));
    let loader = StockDetailLoader::new(provider.clone(), clock, &ClientConfig::default());
    (provider, loader)
}

#[test]
fn test_default_range_is_trailing_thirty_days() {
    let (_, loader) = loader(MockProvider::with_stocks(0));
    let range = loader.default_range();
    assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    assert_eq!(range.start, NaiveDate::from_ymd_opt(2025, 5, 31).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_full_detail_load() -> anyhow::Result<()> {
    let (provider, loader) = loader(MockProvider::with_stocks(0));
    let range = loader.default_range();

    let detail = loader.load("BBRI", range).await?;

    assert_eq!(detail.history.profile.code, "BBRI");
    assert_eq!(detail.history.summaries.len(), 31);
    // 图表数据按日期升序
    let candles = &detail.history.chart.candles;
    assert_eq!(candles.first().unwrap().x, range.start);
    assert_eq!(candles.last().unwrap().x, range.end);
    assert_eq!(detail.history.chart.moving_average.len(), 31 - 20 + 1);
    assert_eq!(detail.reports.len(), 20);
    assert_eq!(detail.broker.paired_rows(10).len(), 2);

    let broker_queries: Vec<BrokerQuery> = provider
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Broker(q) => Some(q),
            _ => None,
        })
        .collect();
    assert_eq!(broker_queries, vec![BrokerQuery::unfiltered("BBRI", range)]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_primary_failure_is_surfaced() {
    let mut mock = MockProvider::with_stocks(0);
    mock.fail_profile = true;
    let (_, loader) = loader(mock);

    let err = loader.load("XXXX", loader.default_range()).await.unwrap_err();
    assert_eq!(err, MarketError::NotFound);
}

#[tokio::test(start_paused = true)]
async fn test_secondary_failures_degrade_quietly() {
    let mut mock = MockProvider::with_stocks(0);
    mock.fail_broker = true;
    for year in ["2021", "2022", "2023", "2024", "2025"] {
        for period in bursa_core::common::ReportPeriod::ALL {
            mock.broken_reports.insert((period, year.to_string()));
        }
    }
    let (_, loader) = loader(mock);

    let detail = loader.load("BBRI", loader.default_range()).await.unwrap();
    assert!(detail.reports.is_empty());
    assert!(detail.broker.buyers.is_empty());
    assert!(detail.broker.sellers.is_empty());
    assert_eq!(detail.broker.stock_code, "BBRI");
    assert_eq!(detail.broker.aggregate.total_value, "0");
    assert_eq!(detail.broker.aggregate.foreign_net_value, "0");
}

#[tokio::test(start_paused = true)]
async fn test_reload_broker_passes_filters() {
    let (provider, loader) = loader(MockProvider::with_stocks(0));
    let query = BrokerQuery {
        stock_code: "BBRI".to_string(),
        range: DateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        },
        investor_type: InvestorType::Domestic,
        transaction_type: TransactionType::Negotiated,
    };

    let summary = loader.reload_broker(&query).await;

    assert_eq!(summary.start_date, "2025-01-01");
    assert_eq!(provider.calls(), vec![Call::Broker(query)]);
}

#[tokio::test(start_paused = true)]
async fn test_reload_history_rebuilds_chart() {
    let (_, loader) = loader(MockProvider::with_stocks(0));
    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
    };
    let history = loader.reload_history("TLKM", range).await.unwrap();
    assert_eq!(history.range, range);
    assert_eq!(history.chart.candles.len(), 10);
    // 不足一个完整窗口时均线为空
    assert!(history.chart.moving_average.is_empty());
}
