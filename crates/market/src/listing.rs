use bursa_core::config::ListingConfig;
use bursa_core::market::entity::{ListingPage, StockProfile};
use bursa_core::market::error::MarketError;
use tracing::debug;

/// # Summary
/// 列表的两种数据来源模式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingMode {
    // 服务端分页浏览，页码从 1 开始
    Browsing { page: u32 },
    // 全文搜索，结果不分页
    Searching { query: String },
}

/// # Summary
/// 状态机要求执行的一次后端请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRequest {
    Browse { page: u32, page_size: u32 },
    Search { query: String },
}

/// # Summary
/// 驱动列表状态机的输入事件。
#[derive(Debug, Clone, PartialEq)]
pub enum ListingEvent {
    /// 搜索框内容变化（每次按键）
    QueryChanged(String),
    /// 防抖计时到期，`token` 标识发起计时的那次编辑
    DebounceElapsed { token: u64 },
    PageChanged(u32),
    PageSizeChanged(u32),
    /// 选择行业，`None` 表示全部
    SectorSelected(Option<String>),
    /// 清空关键字与行业过滤
    ClearFilters,
    /// 重新请求当前模式的数据（首次加载与失败重试）
    Refresh,
    /// 请求结算，`generation` 为发起请求时分配的代号
    Loaded {
        generation: u64,
        outcome: Result<ListingPage, MarketError>,
    },
}

/// # Summary
/// 状态迁移产生的副作用，由运行时负责执行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// 取消旧计时并重新计时
    ScheduleDebounce { token: u64 },
    /// 取消尚未到期的计时
    CancelDebounce,
    Fetch {
        generation: u64,
        request: ListingRequest,
    },
}

/// # Summary
/// 列表加载状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// # Summary
/// 对外发布的列表快照。
///
/// # Invariants
/// - 分页字段与条目来自同一次已采纳的响应，不会出现新旧数据混杂。
/// - `items` 已按 `selected_sector` 在客户端过滤，分页字段不受过滤影响。
#[derive(Debug, Clone, PartialEq)]
pub struct ListingView {
    pub status: LoadStatus,
    pub items: Vec<StockProfile>,
    pub total_items: u64,
    pub page_index: u32,
    pub page_size: u32,
    pub total_pages: u32,
    // 当前已加载条目中出现的行业，按首次出现顺序去重
    pub sectors: Vec<String>,
    pub selected_sector: Option<String>,
    // 搜索框原始内容
    pub query: String,
    pub searching: bool,
}

/// # Summary
/// 列表控制器的纯状态机：`apply` 只修改自身并返回副作用，不做任何 I/O。
///
/// # Invariants
/// - 每次发起请求都分配新的 `generation`；只有代号等于最新值的结算会被采纳。
/// - 每次编辑搜索框都分配新的防抖 `token`；只有最新 token 的到期事件会触发搜索。
/// - 清空关键字立即回到浏览模式第 1 页，不经过防抖。
/// - 行业过滤只作用于已加载条目，不触发请求。
#[derive(Debug, Clone)]
pub struct ListingState {
    mode: ListingMode,
    page_size: u32,
    max_page_size: u32,
    input: String,
    sector: Option<String>,
    debounce_token: u64,
    generation: u64,
    status: LoadStatus,
    loaded: ListingPage,
}

impl ListingState {
    /// # Summary
    /// 初始状态：浏览模式第 1 页，尚未加载。
    ///
    /// # Arguments
    /// * `config`: 列表配置，提供默认页大小与上限。
    ///
    /// # Returns
    /// 初始状态。
    pub fn new(config: &ListingConfig) -> Self {
        let max_page_size = config.max_page_size.max(1);
        Self {
            mode: ListingMode::Browsing { page: 1 },
            page_size: config.default_page_size.clamp(1, max_page_size),
            max_page_size,
            input: String::new(),
            sector: None,
            debounce_token: 0,
            generation: 0,
            status: LoadStatus::Idle,
            loaded: ListingPage::default(),
        }
    }

    pub fn mode(&self) -> &ListingMode {
        &self.mode
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// 最近一次发起请求的代号
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 以不可变方式执行一次迁移，返回新状态与副作用
    pub fn next(&self, event: ListingEvent) -> (Self, Effect) {
        let mut state = self.clone();
        let effect = state.apply(event);
        (state, effect)
    }

    /// # Summary
    /// 执行一次状态迁移。
    ///
    /// # Logic
    /// 按事件类型分派，详见各分支辅助函数。
    ///
    /// # Arguments
    /// * `event`: 输入事件。
    ///
    /// # Returns
    /// 运行时需要执行的副作用。
    pub fn apply(&mut self, event: ListingEvent) -> Effect {
        match event {
            ListingEvent::QueryChanged(text) => self.on_query_changed(text),
            ListingEvent::DebounceElapsed { token } => self.on_debounce_elapsed(token),
            ListingEvent::PageChanged(page) => self.on_page_changed(page),
            ListingEvent::PageSizeChanged(size) => self.on_page_size_changed(size),
            ListingEvent::SectorSelected(sector) => {
                self.sector = sector.filter(|s| !s.is_empty());
                Effect::None
            }
            ListingEvent::ClearFilters => {
                self.sector = None;
                self.on_query_changed(String::new())
            }
            ListingEvent::Refresh => self.fetch(),
            ListingEvent::Loaded {
                generation,
                outcome,
            } => self.on_loaded(generation, outcome),
        }
    }

    fn on_query_changed(&mut self, text: String) -> Effect {
        self.input = text;
        // 任何编辑都使尚未到期的计时失效
        self.debounce_token += 1;

        if !self.input.trim().is_empty() {
            return Effect::ScheduleDebounce {
                token: self.debounce_token,
            };
        }
        match self.mode {
            ListingMode::Searching { .. } => {
                self.mode = ListingMode::Browsing { page: 1 };
                self.fetch()
            }
            ListingMode::Browsing { .. } => Effect::CancelDebounce,
        }
    }

    fn on_debounce_elapsed(&mut self, token: u64) -> Effect {
        if token != self.debounce_token {
            debug!("Ignoring stale debounce token {}", token);
            return Effect::None;
        }
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return Effect::None;
        }
        self.mode = ListingMode::Searching { query };
        self.fetch()
    }

    fn on_page_changed(&mut self, page: u32) -> Effect {
        let ListingMode::Browsing { page: current } = self.mode else {
            return Effect::None;
        };
        let last = self.loaded.total_pages.max(1);
        if page == 0 || page > last || page == current {
            return Effect::None;
        }
        self.mode = ListingMode::Browsing { page };
        self.fetch()
    }

    fn on_page_size_changed(&mut self, size: u32) -> Effect {
        let size = size.clamp(1, self.max_page_size);
        if size == self.page_size {
            return Effect::None;
        }
        self.page_size = size;
        match self.mode {
            ListingMode::Browsing { .. } => {
                self.mode = ListingMode::Browsing { page: 1 };
                self.fetch()
            }
            // 搜索结果不分页，新页大小在回到浏览模式时生效
            ListingMode::Searching { .. } => Effect::None,
        }
    }

    fn on_loaded(&mut self, generation: u64, outcome: Result<ListingPage, MarketError>) -> Effect {
        if generation != self.generation {
            debug!(
                "Discarding superseded listing response {} (latest {})",
                generation, self.generation
            );
            return Effect::None;
        }
        match outcome {
            Ok(page) => {
                self.loaded = page;
                self.status = LoadStatus::Ready;
            }
            Err(e) => self.status = LoadStatus::Failed(e.to_string()),
        }
        Effect::None
    }

    fn fetch(&mut self) -> Effect {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        let request = match &self.mode {
            ListingMode::Browsing { page } => ListingRequest::Browse {
                page: *page,
                page_size: self.page_size,
            },
            ListingMode::Searching { query } => ListingRequest::Search {
                query: query.clone(),
            },
        };
        Effect::Fetch {
            generation: self.generation,
            request,
        }
    }

    /// # Summary
    /// 生成对外快照。
    ///
    /// # Logic
    /// 1. 分页字段取自最近一次采纳的响应。
    /// 2. 行业列表从已加载条目中按首次出现顺序去重。
    /// 3. 条目按所选行业过滤。
    pub fn view(&self) -> ListingView {
        let mut sectors: Vec<String> = Vec::new();
        for sector in self.loaded.items.iter().filter_map(StockProfile::sector) {
            if !sectors.iter().any(|s| s == sector) {
                sectors.push(sector.to_string());
            }
        }

        let items = match &self.sector {
            Some(selected) => self
                .loaded
                .items
                .iter()
                .filter(|item| item.sector() == Some(selected.as_str()))
                .cloned()
                .collect(),
            None => self.loaded.items.clone(),
        };

        ListingView {
            status: self.status.clone(),
            items,
            total_items: self.loaded.total_items,
            page_index: self.loaded.page_index,
            page_size: self.loaded.page_size,
            total_pages: self.loaded.total_pages,
            sectors,
            selected_sector: self.sector.clone(),
            query: self.input.clone(),
            searching: matches!(self.mode, ListingMode::Searching { .. }),
        }
    }
}

/// # Summary
/// 计算分页导航中可见的页码窗口。
///
/// # Logic
/// 1. 窗口尽量以当前页为中心。
/// 2. 靠近末尾时向前补齐，窗口不超过 `[1, total]`。
///
/// # Arguments
/// * `current`: 当前页。
/// * `total`: 总页数。
/// * `max_visible`: 最多展示的页码数。
///
/// # Returns
/// 升序的页码列表。
pub fn visible_pages(current: u32, total: u32, max_visible: u32) -> Vec<u32> {
    if total == 0 || max_visible == 0 {
        return Vec::new();
    }
    // 服务端回显的页码可能超出当前总页数
    let current = current.clamp(1, total);
    let mut start = current.saturating_sub(max_visible / 2).max(1);
    let end = start.saturating_add(max_visible - 1).min(total);
    if end.saturating_sub(start) + 1 < max_visible {
        start = end.saturating_sub(max_visible - 1).max(1);
    }
    (start..=end).collect()
}
