use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单个交易日的 OHLCV 记录。
///
/// # Invariants
/// - 假定 `low <= min(open, close) <= max(open, close) <= high`，但不做校验；
///   违反时只会得到形状异常的 K 线，不会导致计算失败。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OhlcvPoint {
    // 交易日
    #[serde(with = "wire_date")]
    pub date: NaiveDate,
    // 开盘价
    #[serde(alias = "open_price")]
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量（保留符号）
    pub volume: f64,
    // 前收盘价
    #[serde(alias = "previous")]
    pub previous_close: Option<f64>,
}

/// # Summary
/// 上市公司档案，同时用作单只股票详情与列表项。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockProfile {
    // 股票代码 (例如: BBRI, TLKM)
    pub code: String,
    // 公司名称
    pub name: String,
    // 流通股数
    pub share: f64,
    // 上市日期，按后端原样保存
    pub listing_date: String,
    // 交易板块
    pub board: String,
    pub profiles: Vec<CompanyProfile>,
    pub directors: Vec<Director>,
    pub commissioners: Vec<Commissioner>,
    pub shareholders: Vec<Shareholder>,
    pub subsidiaries: Vec<Subsidiary>,
    pub dividends: Vec<Dividend>,
}

impl StockProfile {
    /// # Summary
    /// 获取公司所属行业板块。
    ///
    /// # Logic
    /// 取第一条档案记录的 `sector`，空字符串视为缺失。
    ///
    /// # Returns
    /// 存在则返回板块名称。
    pub fn sector(&self) -> Option<&str> {
        self.profiles
            .first()
            .map(|p| p.sector.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// # Summary
/// 公司档案明细。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub address: String,
    pub industry: String,
    pub sub_industry: String,
    pub sector: String,
    pub sub_sector: String,
    pub main_business: String,
    pub email: String,
    pub phone: String,
    pub fax: String,
    pub website: String,
    pub listing_date: String,
    pub logo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Director {
    pub name: String,
    pub position: String,
    pub is_affiliated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commissioner {
    pub name: String,
    pub position: String,
    pub is_independent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shareholder {
    pub name: String,
    pub category: String,
    pub share: f64,
    pub percentage: f64,
    pub is_controller: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subsidiary {
    pub name: String,
    pub business_fields: String,
    pub location: String,
    pub currency: String,
    pub total_asset: f64,
    pub percentage: f64,
    pub operation_status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dividend {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub year: String,
    pub cash_dividend_per_share: f64,
    pub cash_dividend_per_share_currency: String,
    pub cum_date: String,
    pub ex_date: String,
    pub record_date: String,
    pub payment_date: String,
}

/// # Summary
/// 某一 (周期, 年份) 的财报披露记录。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialReport {
    pub stock_code: String,
    pub stock_name: String,
    pub report_period: String,
    pub report_year: String,
    pub file_modified: String,
    // 附件描述列表
    #[serde(rename = "attachment")]
    pub attachments: Vec<Attachment>,
}

/// # Summary
/// 财报附件描述，只保存元数据，不下载文件。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub file_id: String,
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
    pub file_type: String,
    pub file_modified: String,
    pub report_type: String,
}

/// # Summary
/// 经纪商排名表中的一行。
///
/// # Invariants
/// - `value` 按后端原样保存为文本，不做数值解析。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerRow {
    pub broker_code: String,
    pub lot: f64,
    #[serde(rename = "val", with = "wire_text")]
    pub value: String,
    #[serde(rename = "avg")]
    pub average: f64,
}

/// # Summary
/// 经纪商汇总的总计数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerAggregate {
    pub total_lot: f64,
    #[serde(rename = "total_val", with = "wire_text")]
    pub total_value: String,
    #[serde(rename = "foreign_net_val", with = "wire_text")]
    pub foreign_net_value: String,
    #[serde(rename = "avg")]
    pub average: f64,
}

impl Default for BrokerAggregate {
    fn default() -> Self {
        Self {
            total_lot: 0.0,
            total_value: "0".to_string(),
            foreign_net_value: "0".to_string(),
            average: 0.0,
        }
    }
}

/// # Summary
/// 单只股票在某日期范围内的经纪商买卖汇总。
///
/// # Invariants
/// - `buyers` 与 `sellers` 是相互独立的排名，长度可以不同。
/// - 同一下标的买方与卖方之间不存在数据关联，仅用于并排展示。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSummary {
    pub stock_code: String,
    // 日期按后端原样保存（可能是日期或时间戳）
    pub start_date: String,
    pub end_date: String,
    pub buyers: Vec<BrokerRow>,
    pub sellers: Vec<BrokerRow>,
    #[serde(rename = "summary")]
    pub aggregate: BrokerAggregate,
}

/// # Summary
/// 分页浏览结果。
///
/// # Invariants
/// - `page_index` 从 1 开始。
/// - 浏览模式下 `total_pages` / `total_items` 以服务端返回值为准。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<StockProfile>,
    pub total_items: u64,
    pub page_index: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// # Summary
/// 全文搜索结果，天然不分页。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<StockProfile>,
}

impl SearchResult {
    /// # Summary
    /// 将搜索结果合成为单页的分页结构。
    ///
    /// # Logic
    /// 1. 页码固定为 1，总页数固定为 1。
    /// 2. 总条数与页大小均取结果数量。
    ///
    /// # Returns
    /// 合成后的 ListingPage。
    pub fn into_single_page(self) -> ListingPage {
        let count = self.items.len();
        ListingPage {
            total_items: u64::try_from(count).unwrap_or(u64::MAX),
            page_index: 1,
            page_size: u32::try_from(count).unwrap_or(u32::MAX),
            total_pages: 1,
            items: self.items,
        }
    }
}

/// 线上日期字段：接受 `YYYY-MM-DD` 或 RFC 3339 时间戳，输出 `YYYY-MM-DD`。
pub mod wire_date {
    use crate::common::WIRE_DATE_FORMAT;
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(WIRE_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {}", raw)))
    }

    /// 解析线上日期
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, WIRE_DATE_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}

/// 金额文本字段：后端可能返回字符串或数字，统一保存为文本。
mod wire_text {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    pub fn serialize<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match TextOrNumber::deserialize(deserializer)? {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Number(n) => n.to_string(),
        })
    }
}
