//! 联系人联想搜索会话
//!
//! 防抖由视图层的 `Debouncer` 完成，这里只维护请求序号与分页状态：
//! 只有携带最新 `request_id` 的响应才会被应用，与响应到达顺序无关。

use dafonow_shared::{ContactId, ContactRecord, ContactSearchQuery, DEFAULT_PAGE_SIZE};

use crate::api::{ApiResult, SignupApi};

pub const MIN_QUERY_LENGTH: usize = 3;
pub const SEARCH_DEBOUNCE_MS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub min_query_length: usize,
    pub page_size: u32,
    pub debounce_ms: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: MIN_QUERY_LENGTH,
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: SEARCH_DEBOUNCE_MS,
        }
    }
}

/// 一次已发出的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub request_id: u64,
    pub query: String,
    pub page: u32,
    pub page_size: u32,
}

impl SearchTicket {
    /// `include_inactive` 为 false 时只搜索活跃联系人
    pub fn to_query(&self, include_inactive: bool) -> ContactSearchQuery {
        ContactSearchQuery::practitioners(
            self.query.clone(),
            self.page,
            self.page_size,
            include_inactive,
        )
    }
}

/// 输入变化后的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// 查询过短，结果已清空，不发请求
    Cleared,
    /// 需要在防抖延迟后调用 `start_search`
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession<T> {
    config: SearchConfig,
    query: String,
    page: u32,
    results: Vec<T>,
    has_more: bool,
    latest_request_id: u64,
    /// 正在等待响应的最新请求
    in_flight: Option<u64>,
}

impl<T> Default for SearchSession<T> {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl<T> SearchSession<T> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            query: String::new(),
            page: 1,
            results: Vec::new(),
            has_more: false,
            latest_request_id: 0,
            in_flight: None,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn latest_request_id(&self) -> u64 {
        self.latest_request_id
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight == Some(self.latest_request_id)
    }

    /// 查询长度按字符计算
    pub fn query_is_searchable(&self) -> bool {
        self.query.chars().count() >= self.config.min_query_length
    }

    // --- Transitions ---

    /// 查询变化后旧查询的分页随之作废：防抖期间 `load_more` 不会发出请求，
    /// 旧结果保留显示，直到新查询的第一页替换它们
    pub fn input_changed(&mut self, query: &str) -> InputAction {
        let changed = self.query != query;
        self.query = query.to_string();

        if changed {
            self.invalidate();
        }
        if self.query_is_searchable() {
            return InputAction::Schedule;
        }

        self.results.clear();
        InputAction::Cleared
    }

    /// 作废所有在途请求并重置分页
    fn invalidate(&mut self) {
        self.latest_request_id += 1;
        self.in_flight = None;
        self.has_more = false;
        self.page = 1;
    }

    /// 防抖到期后发起第一页搜索
    pub fn start_search(&mut self) -> Option<SearchTicket> {
        if !self.query_is_searchable() {
            return None;
        }
        self.page = 1;
        Some(self.issue())
    }

    /// 滚动到底部时加载下一页
    pub fn load_more(&mut self) -> Option<SearchTicket> {
        if self.is_loading() || !self.has_more || !self.query_is_searchable() {
            return None;
        }
        self.page += 1;
        Some(self.issue())
    }

    fn issue(&mut self) -> SearchTicket {
        self.latest_request_id += 1;
        self.in_flight = Some(self.latest_request_id);
        log::debug!(
            "[Search] request #{} query={:?} page={}",
            self.latest_request_id,
            self.query,
            self.page
        );
        SearchTicket {
            request_id: self.latest_request_id,
            query: self.query.clone(),
            page: self.page,
            page_size: self.config.page_size,
        }
    }

    /// 应用响应；过期的响应被丢弃并返回 false
    pub fn apply(&mut self, ticket: &SearchTicket, items: Vec<T>) -> bool {
        if ticket.request_id != self.latest_request_id {
            log::debug!(
                "[Search] discard stale response #{} (latest #{})",
                ticket.request_id,
                self.latest_request_id
            );
            return false;
        }

        self.in_flight = None;
        self.has_more = items.len() == self.config.page_size as usize;
        if ticket.page == 1 {
            self.results = items;
        } else {
            self.results.extend(items);
        }
        true
    }

    /// 请求失败：只结束加载状态，保留已有结果
    pub fn fail(&mut self, ticket: &SearchTicket) {
        if ticket.request_id == self.latest_request_id {
            self.in_flight = None;
            self.has_more = false;
        }
    }
}

// =========================================================
// 联系人选项
// =========================================================

/// 下拉列表中的一项
#[derive(Debug, Clone, PartialEq)]
pub struct ContactOption {
    pub id: ContactId,
    pub label: String,
    pub record: ContactRecord,
}

impl From<ContactRecord> for ContactOption {
    fn from(record: ContactRecord) -> Self {
        Self {
            id: record.id.clone(),
            label: record.display_label(),
            record,
        }
    }
}

/// 执行一次页请求，并用 `transform` 转换结果
pub async fn fetch_page<T>(
    api: &dyn SignupApi,
    ticket: &SearchTicket,
    include_inactive: bool,
    transform: impl Fn(ContactRecord) -> T,
) -> ApiResult<Vec<T>> {
    let records = api.search_contacts(&ticket.to_query(include_inactive)).await?;
    Ok(records.into_iter().map(transform).collect())
}
