use bursa_core::market::entity::OhlcvPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线图点，`y` 依次为 `[open, high, low, close]`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub x: NaiveDate,
    pub y: [f64; 4],
}

/// # Summary
/// 均线上的一个点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// # Summary
/// 成交量柱，`y` 保留原始符号。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBar {
    pub x: NaiveDate,
    pub y: f64,
}

/// # Summary
/// 成交量柱的着色区间，阈值固定：`<= 0` 与 `> 0`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeBand {
    NonPositive,
    Positive,
}

impl VolumeBar {
    /// 所属着色区间，具体颜色由展示层决定
    pub fn band(&self) -> VolumeBand {
        if self.y > 0.0 {
            VolumeBand::Positive
        } else {
            VolumeBand::NonPositive
        }
    }
}

/// # Summary
/// 返回按日期升序排列的副本。
///
/// # Logic
/// 1. 克隆输入，调用方持有的序列保持原顺序。
/// 2. 稳定排序，同一日期的记录保持相对顺序，保证重复排序结果一致。
///
/// # Arguments
/// * `series`: 后端返回的日线序列（顺序不保证）。
///
/// # Returns
/// 升序副本。
pub fn sorted_by_date(series: &[OhlcvPoint]) -> Vec<OhlcvPoint> {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|p| p.date);
    sorted
}

/// 映射为 K 线图点，不做任何过滤
pub fn candlesticks(series: &[OhlcvPoint]) -> Vec<CandlePoint> {
    sorted_by_date(series).iter().map(candle_of).collect()
}

/// # Summary
/// 计算收盘价的简单移动平均。
///
/// # Logic
/// 1. 排序副本。
/// 2. 窗口为 0 或数据不足一个完整窗口时返回空，不补齐、不报错。
/// 3. 第 i 个输出点取排序后下标 `[i, i + window)` 的收盘价均值，日期取窗口末尾。
///
/// # Arguments
/// * `series`: 日线序列。
/// * `window`: 回看窗口大小。
///
/// # Returns
/// 长度为 `max(0, n - window + 1)` 的均线序列。
pub fn simple_moving_average(series: &[OhlcvPoint], window: usize) -> Vec<MovingAveragePoint> {
    moving_average_of_sorted(&sorted_by_date(series), window)
}

/// 映射为成交量柱
pub fn volume_bars(series: &[OhlcvPoint]) -> Vec<VolumeBar> {
    sorted_by_date(series).iter().map(volume_of).collect()
}

fn candle_of(p: &OhlcvPoint) -> CandlePoint {
    CandlePoint {
        x: p.date,
        y: [p.open, p.high, p.low, p.close],
    }
}

fn volume_of(p: &OhlcvPoint) -> VolumeBar {
    VolumeBar {
        x: p.date,
        y: p.volume,
    }
}

fn moving_average_of_sorted(sorted: &[OhlcvPoint], window: usize) -> Vec<MovingAveragePoint> {
    let Some(divisor) = u32::try_from(window).ok().filter(|w| *w > 0).map(f64::from) else {
        return Vec::new();
    };
    if sorted.len() < window {
        return Vec::new();
    }
    sorted
        .windows(window)
        .filter_map(|w| {
            let last = w.last()?;
            let sum: f64 = w.iter().map(|p| p.close).sum();
            Some(MovingAveragePoint {
                date: last.date,
                value: sum / divisor,
            })
        })
        .collect()
}

/// # Summary
/// 同一序列的全部图表数据，只排序一次。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub candles: Vec<CandlePoint>,
    pub moving_average: Vec<MovingAveragePoint>,
    pub volume: Vec<VolumeBar>,
    pub window: usize,
}

impl ChartSeries {
    /// # Summary
    /// 从日线序列构建图表数据。
    ///
    /// # Arguments
    /// * `series`: 日线序列。
    /// * `window`: 均线窗口。
    ///
    /// # Returns
    /// K 线、均线与成交量柱的组合。
    pub fn build(series: &[OhlcvPoint], window: usize) -> Self {
        let sorted = sorted_by_date(series);
        Self {
            candles: sorted.iter().map(candle_of).collect(),
            moving_average: moving_average_of_sorted(&sorted, window),
            volume: sorted.iter().map(volume_of).collect(),
            window,
        }
    }
}
