use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{Article, Category, Profile};

// --- Paginator ---

/// One button of the paginator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum PageSlot {
    Page { number: u32, active: bool },
    Ellipsis,
}

/// PaginatorView
///
/// Previous/next state plus the page buttons. Up to seven pages are listed in full;
/// longer ranges keep the first and last page and a window around the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaginatorView {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub slots: Vec<PageSlot>,
}

impl PaginatorView {
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        let current_page = current_page.clamp(1, total_pages.max(1));
        Self {
            current_page,
            total_pages,
            has_previous: current_page > 1,
            has_next: current_page < total_pages,
            slots: visible_slots(current_page, total_pages),
        }
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                PageSlot::Page { number, .. } => Some(*number),
                PageSlot::Ellipsis => None,
            })
            .collect()
    }
}

fn visible_slots(current: u32, total: u32) -> Vec<PageSlot> {
    let page = |number: u32| PageSlot::Page {
        number,
        active: number == current,
    };

    if total <= 7 {
        return (1..=total).map(page).collect();
    }

    let (start, end) = if current <= 3 {
        (2, 5)
    } else if current + 2 >= total {
        (total - 4, total - 1)
    } else {
        (current - 1, current + 1)
    };

    let mut slots = vec![page(1)];
    if start > 2 {
        slots.push(PageSlot::Ellipsis);
    }
    slots.extend((start..=end).map(page));
    if end < total - 1 {
        slots.push(PageSlot::Ellipsis);
    }
    slots.push(page(total));
    slots
}

// --- Rows and cards ---

const EXCERPT_CHARS: usize = 150;

/// ArticleCard
///
/// Article as shown in the public grid and in the related-articles strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Article> for ArticleCard {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            excerpt: excerpt(&article.content, EXCERPT_CHARS),
            image_url: article.image_url.clone(),
            category: article.category.as_ref().map(|c| c.name.clone()),
            author: article.author.as_ref().map(|a| a.username.clone()),
            created_at: article.created_at,
        }
    }
}

/// Plain-text preview of HTML content: markup and `<script>`/`<style>` bodies
/// dropped, entities decoded, whitespace collapsed, cut at `max_chars` characters
/// with an ellipsis.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    // Adjacent block elements must not glue their words together.
    let spaced = html.replace('<', " <");
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(&spaced)
        .to_string();
    let text = unescape_text(&cleaned);

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

// The sanitizer re-escapes text nodes with exactly these entities.
fn unescape_text(escaped: &str) -> String {
    escaped
        .replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Row of the admin article table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleRow {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Article> for ArticleRow {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            category: article.category.as_ref().map(|c| c.name.clone()),
            image_url: article.image_url.clone(),
            created_at: article.created_at,
        }
    }
}

/// Row of the admin category table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
            created_at: category.created_at,
        }
    }
}

/// Entry of a category select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

impl From<&Category> for CategoryOption {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            name: category.name.clone(),
        }
    }
}

// --- Pages ---

/// The filter values a list page was rendered with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedFilters {
    pub text: String,
    pub category: Option<String>,
    pub page: u32,
}

/// ArticleListPage
///
/// Public home page: the article grid with its filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleListPage {
    pub filters: AppliedFilters,
    pub articles: Vec<ArticleCard>,
    pub total_count: u64,
    pub paginator: PaginatorView,
    pub categories: Vec<CategoryOption>,
}

/// AdminArticlePage
///
/// Admin article table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminArticlePage {
    pub filters: AppliedFilters,
    pub rows: Vec<ArticleRow>,
    pub total_count: u64,
    pub paginator: PaginatorView,
    pub categories: Vec<CategoryOption>,
}

/// CategoryPage
///
/// Admin category table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryPage {
    pub filters: AppliedFilters,
    pub rows: Vec<CategoryRow>,
    pub total_count: u64,
    pub paginator: PaginatorView,
}

/// Article body for the detail and edit pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: Option<CategoryOption>,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            content: article.content,
            image_url: article.image_url,
            category: article.category.map(|c| CategoryOption {
                id: c.id,
                name: c.name,
            }),
            author: article.author.map(|a| a.username),
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// ArticleDetailPage
///
/// Article detail with up to three related articles from the same category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleDetailPage {
    pub article: ArticleView,
    pub related: Vec<ArticleCard>,
}

/// ArticleEditPage
///
/// Edit form: the article as stored plus the category choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleEditPage {
    pub article: ArticleView,
    pub categories: Vec<CategoryOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileView {
    pub id: String,
    pub username: String,
    pub role: String,
    // First letter of the username, shown as the avatar.
    pub initial: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Profile> for ProfileView {
    fn from(profile: Profile) -> Self {
        let initial = profile
            .username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();
        Self {
            id: profile.id,
            username: profile.username,
            role: profile.role,
            initial,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginPage {
    pub submit_path: String,
    pub register_path: String,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            submit_path: "/login".to_string(),
            register_path: "/register".to_string(),
        }
    }
}

// --- Notifications ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

const TOAST_DURATION_MS: u32 = 5000;

/// Notification
///
/// Toast shown by the client. Every API failure ends up as one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub message: String,
    pub duration_ms: u32,
}

impl Notification {
    fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            message: message.into(),
            duration_ms: TOAST_DURATION_MS,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

