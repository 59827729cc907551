mod settings;

use bursa_core::common::time::{RealTimeProvider, TimeProvider};
use bursa_core::market::port::MarketDataProvider;
use bursa_feed::rest::RestProvider;
use bursa_market::broker::BrokerSummaryExt;
use bursa_market::controller::ListingController;
use bursa_market::detail::{StockDetail, StockDetailLoader};
use bursa_market::listing::LoadStatus;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 未设置 `BURSA_STOCK` 时展示的股票
const DEFAULT_STOCK: &str = "BBRI";

/// # Summary
/// 应用启动入口：装配各层组件并输出一次行情摘要。
///
/// # Logic
/// 1. 初始化日志（`RUST_LOG` 控制级别，默认 info）。
/// 2. 加载配置，实例化 REST 数据源与真实时钟。
/// 3. 驱动列表控制器加载第一页。
/// 4. 加载单只股票详情并输出摘要；主数据失败时以非零状态退出。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志，guard 必须存活到进程结束以刷新缓冲
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();
    info!("Bursa client starting...");

    // 2. 实例化基础设施层
    let config = settings::load()?;
    info!("Backend: {}", config.backend.base_url);
    let provider: Arc<dyn MarketDataProvider> = Arc::new(RestProvider::new(&config.backend)?);
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);

    // 3. 列表第一页
    let listing = ListingController::new(provider.clone(), &config.listing);
    let mut views = listing.subscribe();
    listing.start();
    let view = views
        .wait_for(|v| matches!(v.status, LoadStatus::Ready | LoadStatus::Failed(_)))
        .await?
        .clone();
    match &view.status {
        LoadStatus::Failed(reason) => warn!("Stock listing unavailable: {}", reason),
        _ => info!(
            "Listing page {}/{}: {} of {} stocks, sectors {:?}",
            view.page_index,
            view.total_pages,
            view.items.len(),
            view.total_items,
            view.sectors
        ),
    }

    // 4. 个股详情
    let code = std::env::var("BURSA_STOCK").unwrap_or_else(|_| DEFAULT_STOCK.to_string());
    let loader = StockDetailLoader::new(provider, clock, &config);
    let detail = loader.load(&code, loader.default_range()).await?;
    log_digest(&detail, config.broker.display_rows);

    Ok(())
}

fn log_digest(detail: &StockDetail, broker_rows: usize) {
    let history = &detail.history;
    info!(
        "{} {} [{}] {} .. {}",
        history.profile.code,
        history.profile.name,
        history.profile.sector().unwrap_or("-"),
        history.range.start_param(),
        history.range.end_param()
    );

    match history.chart.candles.last() {
        Some(last) => info!(
            "{} candles, last {} close {}",
            history.chart.candles.len(),
            last.x,
            last.y[3]
        ),
        None => info!("No price history in range"),
    }
    if let Some(sma) = history.chart.moving_average.last() {
        info!("SMA{} on {}: {:.2}", history.chart.window, sma.date, sma.value);
    }

    info!("{} financial reports available", detail.reports.len());
    if let Some(latest) = detail.reports.first() {
        info!(
            "Latest report {} {} ({} attachments)",
            latest.report_period,
            latest.report_year,
            latest.attachments.len()
        );
    }

    for pair in detail.broker.paired_rows(broker_rows) {
        let side = |row: Option<&bursa_core::market::entity::BrokerRow>| {
            row.map(|r| format!("{} {} lot {}", r.broker_code, r.value, r.lot))
                .unwrap_or_else(|| "-".to_string())
        };
        info!("#{:<2} buy {:<24} sell {}", pair.rank, side(pair.buyer), side(pair.seller));
    }
    info!(
        "Broker totals: value {}, foreign net {}",
        detail.broker.aggregate.total_value, detail.broker.aggregate.foreign_net_value
    );
}
