use crate::listing::{Effect, ListingEvent, ListingRequest, ListingState, ListingView};
use bursa_core::config::ListingConfig;
use bursa_core::market::entity::{ListingPage, SearchResult};
use bursa_core::market::error::MarketError;
use bursa_core::market::port::MarketDataProvider;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// # Summary
/// 列表控制器的共享内部状态。
///
/// # Invariants
/// - 状态机只在 `state` 锁内迁移，快照也在同一把锁内发布，锁内不做任何 await。
/// - 同一时刻至多存在一个防抖计时任务。
/// - 后台任务只持有弱引用，控制器释放后其结果被静默丢弃。
struct ControllerInner {
    provider: Arc<dyn MarketDataProvider>,
    debounce: Duration,
    state: Mutex<ListingState>,
    // 尚未到期的防抖计时任务
    pending: Mutex<Option<JoinHandle<()>>>,
    view_tx: watch::Sender<ListingView>,
}

impl ControllerInner {
    /// # Summary
    /// 投递事件：迁移状态、发布快照、执行副作用。
    ///
    /// # Logic
    /// 1. 持锁执行纯状态迁移。
    /// 2. 仍在锁内发布快照，保证发布顺序与迁移顺序一致。
    /// 3. 释放锁后执行迁移返回的副作用。
    fn dispatch(self: &Arc<Self>, event: ListingEvent) {
        let effect = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let effect = state.apply(event);
            self.view_tx.send_replace(state.view());
            effect
        };
        self.execute(effect);
    }

    fn execute(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::CancelDebounce => self.replace_pending(None),
            Effect::ScheduleDebounce { token } => {
                let weak = Arc::downgrade(self);
                let delay = self.debounce;
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch(ListingEvent::DebounceElapsed { token });
                    }
                });
                self.replace_pending(Some(handle));
            }
            Effect::Fetch {
                generation,
                request,
            } => {
                debug!("Listing fetch #{}: {:?}", generation, request);
                let weak = Arc::downgrade(self);
                let provider = self.provider.clone();
                tokio::spawn(async move {
                    let outcome = perform(provider.as_ref(), &request).await;
                    if let Err(e) = &outcome {
                        warn!("Listing request {:?} failed: {}", request, e);
                    }
                    Self::deliver(weak, ListingEvent::Loaded { generation, outcome });
                });
            }
        }
    }

    fn deliver(weak: Weak<Self>, event: ListingEvent) {
        if let Some(inner) = weak.upgrade() {
            inner.dispatch(event);
        }
    }

    /// 替换防抖计时任务，旧任务被中止
    fn replace_pending(&self, next: Option<JoinHandle<()>>) {
        let previous = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *pending, next)
        };
        if let Some(handle) = previous {
            handle.abort();
        }
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

/// 执行一次列表请求，搜索结果合成为单页
async fn perform(
    provider: &dyn MarketDataProvider,
    request: &ListingRequest,
) -> Result<ListingPage, MarketError> {
    match request {
        ListingRequest::Browse { page, page_size } => provider.list_stocks(*page, *page_size).await,
        ListingRequest::Search { query } => provider
            .search_stocks(query)
            .await
            .map(SearchResult::into_single_page),
    }
}

/// # Summary
/// 股票列表控制器：在纯状态机外包装防抖计时、后台请求与快照发布。
///
/// # Invariants
/// - 所有方法必须在 Tokio 运行时内调用。
/// - 克隆得到的句柄共享同一状态。
#[derive(Clone)]
pub struct ListingController {
    inner: Arc<ControllerInner>,
}

impl ListingController {
    /// # Summary
    /// 创建控制器，初始为浏览模式第 1 页且尚未加载。
    ///
    /// # Arguments
    /// * `provider`: 行情数据提供者。
    /// * `config`: 列表配置。
    ///
    /// # Returns
    /// 控制器实例，需调用 `start` 触发首次加载。
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &ListingConfig) -> Self {
        let state = ListingState::new(config);
        let (view_tx, _) = watch::channel(state.view());
        Self {
            inner: Arc::new(ControllerInner {
                provider,
                debounce: Duration::from_millis(config.debounce_ms),
                state: Mutex::new(state),
                pending: Mutex::new(None),
                view_tx,
            }),
        }
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<ListingView> {
        self.inner.view_tx.subscribe()
    }

    /// 当前快照
    pub fn view(&self) -> ListingView {
        self.inner.view_tx.borrow().clone()
    }

    /// 首次加载
    pub fn start(&self) {
        self.dispatch(ListingEvent::Refresh);
    }

    /// 失败后重试当前模式的请求
    pub fn retry(&self) {
        self.dispatch(ListingEvent::Refresh);
    }

    pub fn set_query(&self, text: &str) {
        self.dispatch(ListingEvent::QueryChanged(text.to_string()));
    }

    pub fn go_to_page(&self, page: u32) {
        self.dispatch(ListingEvent::PageChanged(page));
    }

    pub fn set_page_size(&self, size: u32) {
        self.dispatch(ListingEvent::PageSizeChanged(size));
    }

    pub fn select_sector(&self, sector: Option<&str>) {
        self.dispatch(ListingEvent::SectorSelected(sector.map(str::to_string)));
    }

    pub fn clear_filters(&self) {
        self.dispatch(ListingEvent::ClearFilters);
    }

    /// 投递任意事件
    pub fn dispatch(&self, event: ListingEvent) {
        self.inner.dispatch(event);
    }
}
