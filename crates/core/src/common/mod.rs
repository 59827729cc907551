use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod time;

/// 线上日期格式 (ISO `YYYY-MM-DD`)
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// # Summary
/// 闭区间日期范围，用于行情与经纪商汇总查询。
///
/// # Invariants
/// - 不校验 `start <= end`，由后端决定空区间的返回结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    // 起始日期（包含）
    pub start: NaiveDate,
    // 截止日期（包含）
    pub end: NaiveDate,
}

impl DateRange {
    /// # Summary
    /// 构造一个以 `today` 结尾、向前回溯 `days` 天的日期范围。
    ///
    /// # Arguments
    /// * `today`: 截止日期。
    /// * `days`: 回溯天数。
    ///
    /// # Returns
    /// `[today - days, today]`。
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        Self {
            start: today - Duration::days(i64::from(days)),
            end: today,
        }
    }

    /// 起始日期的线上表示
    pub fn start_param(&self) -> String {
        self.start.format(WIRE_DATE_FORMAT).to_string()
    }

    /// 截止日期的线上表示
    pub fn end_param(&self) -> String {
        self.end.format(WIRE_DATE_FORMAT).to_string()
    }
}

/// # Summary
/// 财报披露周期。
///
/// # Invariants
/// - 枚举声明顺序即报表网格中的周期迭代顺序。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReportPeriod {
    // 第一季度
    #[serde(rename = "TW1")]
    Tw1,
    // 第二季度
    #[serde(rename = "TW2")]
    Tw2,
    // 第三季度
    #[serde(rename = "TW3")]
    Tw3,
    // 经审计年报
    Audit,
}

impl ReportPeriod {
    /// 按声明顺序排列的全部周期
    pub const ALL: [ReportPeriod; 4] = [
        ReportPeriod::Tw1,
        ReportPeriod::Tw2,
        ReportPeriod::Tw3,
        ReportPeriod::Audit,
    ];
}

impl FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tw1" => Ok(ReportPeriod::Tw1),
            "tw2" => Ok(ReportPeriod::Tw2),
            "tw3" => Ok(ReportPeriod::Tw3),
            "audit" => Ok(ReportPeriod::Audit),
            _ => Err(format!("Unknown ReportPeriod: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportPeriod::Tw1 => write!(f, "TW1"),
            ReportPeriod::Tw2 => write!(f, "TW2"),
            ReportPeriod::Tw3 => write!(f, "TW3"),
            ReportPeriod::Audit => write!(f, "Audit"),
        }
    }
}

/// # Summary
/// 经纪商汇总的投资者类型过滤条件。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InvestorType {
    // 全部
    #[default]
    All,
    // 境内投资者
    Domestic,
    // 境外投资者
    Foreign,
}

impl InvestorType {
    /// 后端识别的过滤代码
    pub fn wire_code(&self) -> &'static str {
        match self {
            InvestorType::All => "ALL",
            InvestorType::Domestic => "D",
            InvestorType::Foreign => "F",
        }
    }
}

impl FromStr for InvestorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(InvestorType::All),
            "d" | "domestic" => Ok(InvestorType::Domestic),
            "f" | "foreign" => Ok(InvestorType::Foreign),
            _ => Err(format!("Unknown InvestorType: {}", s)),
        }
    }
}

impl std::fmt::Display for InvestorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_code())
    }
}

/// # Summary
/// 经纪商汇总的成交类型过滤条件。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    // 全部
    #[default]
    All,
    // 常规市场
    Regular,
    // 现金市场
    Cash,
    // 协议交易
    Negotiated,
}

impl TransactionType {
    /// 后端识别的过滤代码
    pub fn wire_code(&self) -> &'static str {
        match self {
            TransactionType::All => "ALL",
            TransactionType::Regular => "RG",
            TransactionType::Cash => "TN",
            TransactionType::Negotiated => "NG",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TransactionType::All),
            "rg" | "regular" => Ok(TransactionType::Regular),
            "tn" | "cash" => Ok(TransactionType::Cash),
            "ng" | "negotiated" => Ok(TransactionType::Negotiated),
            _ => Err(format!("Unknown TransactionType: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_code())
    }
}
