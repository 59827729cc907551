use bursa_core::market::entity::{BrokerAggregate, BrokerRow, BrokerSummary};
use bursa_core::market::port::{BrokerQuery, MarketDataProvider};
use std::sync::Arc;
use tracing::warn;

/// # Summary
/// 买卖对照表中的一行，按展示位置配对。
///
/// # Invariants
/// - 买方与卖方仅因下标相同而并列，不代表任何数据关联。
/// - 较短一侧超出自身长度的位置为 `None`，由展示层渲染占位。
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerRowPair<'a> {
    // 展示名次，从 1 开始
    pub rank: usize,
    pub buyer: Option<&'a BrokerRow>,
    pub seller: Option<&'a BrokerRow>,
}

/// # Summary
/// BrokerSummary 的展示扩展接口。
pub trait BrokerSummaryExt {
    /// # Summary
    /// 将买卖两张排名表按下标并排。
    ///
    /// # Logic
    /// 1. 行数取两侧较长者，再截断到 `limit`。
    /// 2. 每行取各自同一下标的记录，不存在则为 `None`。
    ///
    /// # Arguments
    /// * `limit`: 最多展示的行数。
    ///
    /// # Returns
    /// 配对后的行列表。
    fn paired_rows(&self, limit: usize) -> Vec<BrokerRowPair<'_>>;
}

impl BrokerSummaryExt for BrokerSummary {
    fn paired_rows(&self, limit: usize) -> Vec<BrokerRowPair<'_>> {
        let rows = self.buyers.len().max(self.sellers.len()).min(limit);
        (0..rows)
            .map(|i| BrokerRowPair {
                rank: i + 1,
                buyer: self.buyers.get(i),
                seller: self.sellers.get(i),
            })
            .collect()
    }
}

/// 查询失败时使用的空汇总：空排名表与全零总计
pub fn empty_summary(query: &BrokerQuery) -> BrokerSummary {
    BrokerSummary {
        stock_code: query.stock_code.clone(),
        start_date: query.range.start_param(),
        end_date: query.range.end_param(),
        buyers: Vec::new(),
        sellers: Vec::new(),
        aggregate: BrokerAggregate::default(),
    }
}

/// # Summary
/// 经纪商汇总加载器。
///
/// # Invariants
/// - 属于辅助数据：失败只记录日志，返回空汇总，不向调用方抛错。
pub struct BrokerSummaryLoader {
    provider: Arc<dyn MarketDataProvider>,
}

impl BrokerSummaryLoader {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// # Summary
    /// 按股票、日期范围与过滤条件加载汇总。
    ///
    /// # Logic
    /// 1. 发起单次请求。
    /// 2. 失败时记录 warn 并返回 `empty_summary`。
    ///
    /// # Arguments
    /// * `query`: 查询条件。
    ///
    /// # Returns
    /// 汇总结果，永不失败。
    pub async fn load(&self, query: &BrokerQuery) -> BrokerSummary {
        match self.provider.fetch_broker_summary(query).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    "Broker summary for {} ({} {}) unavailable: {}",
                    query.stock_code, query.investor_type, query.transaction_type, e
                );
                empty_summary(query)
            }
        }
    }
}
