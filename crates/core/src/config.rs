use serde::{Deserialize, Serialize};

/// 全局客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub listing: ListingConfig,
    pub reports: ReportConfig,
    pub chart: ChartConfig,
    pub broker: BrokerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub debounce_ms: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    // 从当前年份向前回溯的年数
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub sma_window: usize,
    pub default_range_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    // 买卖双方对照表展示的行数上限
    pub display_rows: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            listing: ListingConfig::default(),
            reports: ReportConfig::default(),
            chart: ChartConfig::default(),
            broker: BrokerConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { years: 5 }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            sma_window: 20,
            default_range_days: 30,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self { display_rows: 10 }
    }
}
