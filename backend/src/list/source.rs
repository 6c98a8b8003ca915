use async_trait::async_trait;

use super::{ListQuery, ListRequest, ListResult};
use crate::{
    api::{ApiError, ApiState},
    models::{Article, Category},
};

/// ListSource
///
/// One listing endpoint. The controller is generic over this, so the article and
/// category screens share the same query/pagination machinery.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn fetch(&self, request: &ListRequest) -> Result<ListResult<Self::Item>, ApiError>;
}

/// `GET /articles`.
#[derive(Clone)]
pub struct ArticleSource {
    api: ApiState,
}

impl ArticleSource {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for ArticleSource {
    type Item = Article;

    async fn fetch(&self, request: &ListRequest) -> Result<ListResult<Article>, ApiError> {
        self.api.list_articles(request).await
    }
}

/// `GET /categories`. Categories have no category filter of their own, so it is
/// dropped from the request.
#[derive(Clone)]
pub struct CategorySource {
    api: ApiState,
}

impl CategorySource {
    pub fn new(api: ApiState) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource for CategorySource {
    type Item = Category;

    async fn fetch(&self, request: &ListRequest) -> Result<ListResult<Category>, ApiError> {
        let request = ListRequest {
            category: None,
            ..request.clone()
        };
        self.api.list_categories(&request).await
    }
}

/// fetch_clamped
///
/// Single fetch for `query`. When the result shows the requested page lies past the
/// last page, the query is moved to the last page and fetched once more, so the caller
/// never renders an out-of-range page.
pub async fn fetch_clamped<S: ListSource + ?Sized>(
    source: &S,
    query: &mut ListQuery,
) -> Result<ListResult<S::Item>, ApiError> {
    let result = source.fetch(&query.request()).await?;
    if !result.is_beyond_last_page(query.page()) {
        return Ok(result);
    }

    tracing::debug!(
        requested = query.page(),
        last = result.total_pages,
        "page beyond last page, clamping"
    );
    // total_pages > 0 here, so the page is valid.
    query.set_page(result.total_pages).ok();
    source.fetch(&query.request()).await
}
