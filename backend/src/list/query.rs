use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    #[error("page numbers start at 1")]
    ZeroPage,
    #[error("page {requested} is beyond the last page ({last})")]
    PageOutOfRange { requested: u32, last: u32 },
    #[error("page size must be at least 1")]
    ZeroPageSize,
}

/// ListQuery
///
/// Filter and pagination parameters of one listing screen. Starts empty on page 1
/// with ten rows per page and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub text_filter: String,
    pub category_filter: Option<String>,
    page: u32,
    page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            text_filter: String::new(),
            category_filter: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn with_text_filter(mut self, text: impl Into<String>) -> Self {
        self.text_filter = text.into();
        self
    }

    pub fn with_category_filter(mut self, category: Option<String>) -> Self {
        self.category_filter = category.filter(|id| !id.is_empty());
        self
    }

    pub fn with_page(mut self, page: u32) -> Result<Self, ListError> {
        self.set_page(page)?;
        Ok(self)
    }

    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, ListError> {
        self.set_page_size(page_size)?;
        Ok(self)
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ListError> {
        if page == 0 {
            return Err(ListError::ZeroPage);
        }
        self.page = page;
        Ok(())
    }

    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), ListError> {
        if page_size == 0 {
            return Err(ListError::ZeroPageSize);
        }
        self.page_size = page_size;
        Ok(())
    }

    /// The outbound request for the current parameters. Sorting is always ascending.
    pub fn request(&self) -> ListRequest {
        let text = self.text_filter.trim();
        ListRequest {
            text: (!text.is_empty()).then(|| text.to_string()),
            category: self.category_filter.clone(),
            sort_order: SortOrder::Asc,
            page: self.page,
            limit: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// ListRequest
///
/// Request descriptor for a listing endpoint. The free-text parameter is named per
/// endpoint (`title` for articles, `name` for categories).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub text: Option<String>,
    pub category: Option<String>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

impl ListRequest {
    pub fn query_pairs(&self, text_key: &str) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(text) = &self.text {
            pairs.push((text_key.to_string(), text.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category".to_string(), category.clone()));
        }
        pairs.push(("sortOrder".to_string(), self.sort_order.as_str().to_string()));
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs
    }

    /// Same filters, ordering and page size; only the page may differ.
    pub fn same_listing(&self, other: &ListRequest) -> bool {
        self.text == other.text
            && self.category == other.category
            && self.sort_order == other.sort_order
            && self.limit == other.limit
    }
}

/// ceil(total / page_size); zero when the page size is zero.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total_count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// ListResult
///
/// One fetched page plus the totals needed for the paginator. Replaced wholesale on
/// every successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0, DEFAULT_PAGE_SIZE)
    }
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            page_size,
            total_pages: total_pages(total_count, page_size),
        }
    }

    /// For responses that only report a page count. `total_count` is then an upper
    /// bound (`total_pages * page_size`), never less than the rows at hand.
    pub fn from_page_count(items: Vec<T>, total_pages: u32, page_size: u32) -> Self {
        let upper_bound = u64::from(total_pages) * u64::from(page_size);
        Self {
            total_count: upper_bound.max(items.len() as u64),
            items,
            page_size,
            total_pages,
        }
    }

    /// Whether `page` lies past the last page. An empty set has no out-of-range page 1.
    pub fn is_beyond_last_page(&self, page: u32) -> bool {
        self.total_pages > 0 && page > self.total_pages
    }
}
