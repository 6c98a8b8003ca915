//! List query state shared by the article and category listings.
//!
//! [`ListQuery`] holds the filter and pagination parameters, [`ListRequest`] is the
//! outbound request derived from it, and [`ListResult`] is one fetched page. The
//! [`ListController`] keeps a result synchronized with a query that changes over time;
//! page handlers use [`fetch_clamped`] for a single server-side fetch.

mod controller;
mod query;
mod source;

pub use controller::{ListController, ListState};
pub use query::{
    DEFAULT_PAGE_SIZE, ListError, ListQuery, ListRequest, ListResult, SortOrder, total_pages,
};
pub use source::{ArticleSource, CategorySource, ListSource, fetch_clamped};
