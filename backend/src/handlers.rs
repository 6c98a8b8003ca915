use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState,
    api::{ApiState, ImageUpload},
    auth::ApiSession,
    error::{AppError, ErrorBody},
    guard::LOGIN_PATH,
    list::{
        ArticleSource, CategorySource, ListError, ListQuery, ListRequest, SortOrder,
        fetch_clamped,
    },
    models::{
        ArticlePayload, CategoryPayload, LoginRequest, RegisterRequest, UploadResponse,
    },
    session::{Credentials, clear_cookies, write_cookies},
    views::{
        AdminArticlePage, AppliedFilters, ArticleCard, ArticleDetailPage, ArticleEditPage,
        ArticleListPage, ArticleRow, ArticleView, CategoryOption, CategoryPage, CategoryRow,
        LoginPage, Notification, PaginatorView, ProfileView,
    },
};

/// Rows requested to fill a category select.
const CATEGORY_OPTIONS_LIMIT: u32 = 100;
/// Candidates fetched for the related-articles strip, before the article itself is
/// excluded.
const RELATED_FETCH_LIMIT: u32 = 5;
const RELATED_SHOWN: usize = 3;

// --- Filter Structs ---

/// ArticleFilter
///
/// Query parameters of the article grid and the admin article table.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ArticleFilter {
    /// Case-insensitive match on the title.
    pub title: Option<String>,
    /// Category id.
    pub category: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl ArticleFilter {
    fn query(&self) -> Result<ListQuery, ListError> {
        ListQuery::default()
            .with_text_filter(self.title.clone().unwrap_or_default())
            .with_category_filter(self.category.clone())
            .with_page(self.page.unwrap_or(1))
    }
}

/// CategoryFilter
///
/// Query parameters of the admin category table.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct CategoryFilter {
    /// Case-insensitive match on the name.
    pub name: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl CategoryFilter {
    fn query(&self) -> Result<ListQuery, ListError> {
        ListQuery::default()
            .with_text_filter(self.name.clone().unwrap_or_default())
            .with_page(self.page.unwrap_or(1))
    }
}

fn applied(query: &ListQuery) -> AppliedFilters {
    AppliedFilters {
        text: query.text_filter.clone(),
        category: query.category_filter.clone(),
        page: query.page(),
    }
}

async fn category_options(api: &ApiState) -> Result<Vec<CategoryOption>, AppError> {
    let request = ListRequest {
        text: None,
        category: None,
        sort_order: SortOrder::Asc,
        page: 1,
        limit: CATEGORY_OPTIONS_LIMIT,
    };
    let categories = api.list_categories(&request).await?;
    Ok(categories.items.iter().map(CategoryOption::from).collect())
}

// --- Authentication ---

/// get_login_page
///
/// [Guarded: anonymous only] Signed-in callers are sent to their home page by the guard
/// before this runs.
#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Login form", body = LoginPage))
)]
pub async fn get_login_page() -> Json<LoginPage> {
    Json(LoginPage::default())
}

/// login
///
/// Validates the form, exchanges it for a token at `/auth/login`, writes the `token`
/// and `role` cookies together and redirects to the role's home page.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in, redirect to the role's home page"),
        (status = 401, description = "Rejected by the blog API", body = ErrorBody),
        (status = 422, description = "Invalid form", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiSession { session, api }: ApiSession,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Redirect), AppError> {
    payload.validate()?;

    let response = api.login(&payload).await?;
    let credentials = Credentials::new(response.token, response.role);
    let jar = write_cookies(jar, &credentials, state.config.cookie_secure);
    session.set(credentials);

    tracing::info!(role = %response.role, "user signed in");
    Ok((jar, Redirect::to(response.role.home_path())))
}

/// register
///
/// [Public Route] Creates an account at `/auth/register`.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Notification),
        (status = 422, description = "Invalid form", body = ErrorBody)
    )
)]
pub async fn register(
    ApiSession { api, .. }: ApiSession,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    payload.validate()?;
    api.register(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Notification::success("Account created. You can now sign in.")),
    ))
}

/// logout
///
/// Clears both session cookies and returns to the login page.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out, redirect to /login"))
)]
pub async fn logout(ApiSession { session, .. }: ApiSession, jar: CookieJar) -> (CookieJar, Redirect) {
    session.clear();
    (clear_cookies(jar), Redirect::to(LOGIN_PATH))
}

// --- Public pages ---

/// get_home
///
/// [User Route] The article grid. An out-of-range page is clamped to the last page.
#[utoipa::path(
    get,
    path = "/",
    params(ArticleFilter),
    responses(
        (status = 200, description = "Article grid", body = ArticleListPage),
        (status = 502, description = "Blog API unavailable", body = ErrorBody)
    )
)]
pub async fn get_home(
    ApiSession { api, .. }: ApiSession,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<ArticleListPage>, AppError> {
    let mut query = filter.query()?;
    let source = ArticleSource::new(api.clone());

    let (articles, categories) =
        tokio::join!(fetch_clamped(&source, &mut query), category_options(&api));
    let articles = articles?;

    Ok(Json(ArticleListPage {
        filters: applied(&query),
        articles: articles.items.iter().map(ArticleCard::from).collect(),
        total_count: articles.total_count,
        paginator: PaginatorView::new(query.page(), articles.total_pages),
        categories: categories?,
    }))
}

/// get_article_detail
///
/// [User Route] One article plus up to three others from its category.
#[utoipa::path(
    get,
    path = "/articles/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article detail", body = ArticleDetailPage),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_article_detail(
    ApiSession { api, .. }: ApiSession,
    Path(id): Path<String>,
) -> Result<Json<ArticleDetailPage>, AppError> {
    let article = api.get_article(&id).await?;

    let related = match &article.category {
        Some(category) => {
            let request = ListRequest {
                text: None,
                category: Some(category.id.clone()),
                sort_order: SortOrder::Asc,
                page: 1,
                limit: RELATED_FETCH_LIMIT,
            };
            api.list_articles(&request)
                .await?
                .items
                .iter()
                .filter(|candidate| candidate.id != article.id)
                .take(RELATED_SHOWN)
                .map(ArticleCard::from)
                .collect()
        }
        None => Vec::new(),
    };

    Ok(Json(ArticleDetailPage {
        article: ArticleView::from(article),
        related,
    }))
}

/// get_profile
///
/// [User Route] The signed-in reader's profile.
#[utoipa::path(
    get,
    path = "/profile",
    responses((status = 200, description = "Profile", body = ProfileView))
)]
pub async fn get_profile(ApiSession { api, .. }: ApiSession) -> Result<Json<ProfileView>, AppError> {
    Ok(Json(ProfileView::from(api.profile().await?)))
}

/// get_unauthorized
///
/// Target of the admin-section redirect for non-admin callers. Not guarded.
#[utoipa::path(
    get,
    path = "/unauthorized",
    responses((status = 403, description = "Access denied", body = Notification))
)]
pub async fn get_unauthorized() -> (StatusCode, Json<Notification>) {
    (
        StatusCode::FORBIDDEN,
        Json(
            Notification::error("You do not have permission to view this page.")
                .with_title("Unauthorized"),
        ),
    )
}

// --- Admin: articles ---

/// get_admin_articles
///
/// [Admin Route] The article table.
#[utoipa::path(
    get,
    path = "/admin/articles",
    params(ArticleFilter),
    responses((status = 200, description = "Article table", body = AdminArticlePage))
)]
pub async fn get_admin_articles(
    ApiSession { api, .. }: ApiSession,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<AdminArticlePage>, AppError> {
    let mut query = filter.query()?;
    let source = ArticleSource::new(api.clone());

    let (articles, categories) =
        tokio::join!(fetch_clamped(&source, &mut query), category_options(&api));
    let articles = articles?;

    Ok(Json(AdminArticlePage {
        filters: applied(&query),
        rows: articles.items.iter().map(ArticleRow::from).collect(),
        total_count: articles.total_count,
        paginator: PaginatorView::new(query.page(), articles.total_pages),
        categories: categories?,
    }))
}

/// create_article
///
/// [Admin Route] Validates and forwards a new article.
#[utoipa::path(
    post,
    path = "/admin/articles",
    request_body = ArticlePayload,
    responses(
        (status = 201, description = "Created", body = Notification),
        (status = 422, description = "Invalid form", body = ErrorBody)
    )
)]
pub async fn create_article(
    ApiSession { api, .. }: ApiSession,
    Json(payload): Json<ArticlePayload>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    payload.validate()?;
    api.create_article(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Notification::success("Article created.")),
    ))
}

/// get_article_edit
///
/// [Admin Route] Model of the edit form: the stored article and the category choices.
#[utoipa::path(
    get,
    path = "/admin/articles/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Edit form", body = ArticleEditPage),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_article_edit(
    ApiSession { api, .. }: ApiSession,
    Path(id): Path<String>,
) -> Result<Json<ArticleEditPage>, AppError> {
    let (article, categories) = tokio::join!(api.get_article(&id), category_options(&api));
    Ok(Json(ArticleEditPage {
        article: ArticleView::from(article?),
        categories: categories?,
    }))
}

#[utoipa::path(
    put,
    path = "/admin/articles/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body = ArticlePayload,
    responses(
        (status = 200, description = "Updated", body = Notification),
        (status = 422, description = "Invalid form", body = ErrorBody)
    )
)]
pub async fn update_article(
    ApiSession { api, .. }: ApiSession,
    Path(id): Path<String>,
    Json(payload): Json<ArticlePayload>,
) -> Result<Json<Notification>, AppError> {
    payload.validate()?;
    api.update_article(&id, &payload).await?;
    Ok(Json(Notification::success("Article updated.")))
}

#[utoipa::path(
    delete,
    path = "/admin/articles/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses((status = 200, description = "Deleted", body = Notification))
)]
pub async fn delete_article(
    ApiSession { api, .. }: ApiSession,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    api.delete_article(&id).await?;
    Ok(Json(Notification::success("Article deleted.")))
}

/// upload_image
///
/// [Admin Route] Forwards the multipart `image` field to the blog API's `/upload` and
/// returns the hosted URL, used for thumbnails and images inside the editor.
#[utoipa::path(
    post,
    path = "/admin/upload",
    responses(
        (status = 200, description = "Uploaded", body = UploadResponse),
        (status = 400, description = "Missing or unsupported file", body = ErrorBody)
    )
)]
pub async fn upload_image(
    ApiSession { api, .. }: ApiSession,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Upload(err.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Upload(err.body_text()))?;

        let upload = ImageUpload::new(file_name, content_type, bytes.to_vec())?;
        tracing::debug!(file = upload.file_name(), "forwarding image upload");
        return Ok(Json(api.upload_image(upload).await?));
    }

    Err(AppError::Upload("missing `image` field".to_string()))
}

// --- Admin: categories ---

/// get_admin_categories
///
/// [Admin Route] The category table.
#[utoipa::path(
    get,
    path = "/admin/category",
    params(CategoryFilter),
    responses((status = 200, description = "Category table", body = CategoryPage))
)]
pub async fn get_admin_categories(
    ApiSession { api, .. }: ApiSession,
    Query(filter): Query<CategoryFilter>,
) -> Result<Json<CategoryPage>, AppError> {
    let mut query = filter.query()?;
    let categories = fetch_clamped(&CategorySource::new(api), &mut query).await?;

    Ok(Json(CategoryPage {
        filters: applied(&query),
        rows: categories.items.iter().map(CategoryRow::from).collect(),
        total_count: categories.total_count,
        paginator: PaginatorView::new(query.page(), categories.total_pages),
    }))
}

#[utoipa::path(
    post,
    path = "/admin/category",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Created", body = Notification),
        (status = 422, description = "Invalid form", body = ErrorBody)
    )
)]
pub async fn create_category(
    ApiSession { api, .. }: ApiSession,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    payload.validate()?;
    api.create_category(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Notification::success("Category created.")),
    ))
}

#[utoipa::path(
    put,
    path = "/admin/category/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Updated", body = Notification),
        (status = 422, description = "Invalid form", body = ErrorBody)
    )
)]
pub async fn update_category(
    ApiSession { api, .. }: ApiSession,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Notification>, AppError> {
    payload.validate()?;
    api.update_category(&id, &payload).await?;
    Ok(Json(Notification::success("Category updated.")))
}

#[utoipa::path(
    delete,
    path = "/admin/category/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses((status = 200, description = "Deleted", body = Notification))
)]
pub async fn delete_category(
    ApiSession { api, .. }: ApiSession,
    Path(id): Path<String>,
) -> Result<Json<Notification>, AppError> {
    api.delete_category(&id).await?;
    Ok(Json(Notification::success("Category deleted.")))
}

/// get_admin_profile
///
/// [Admin Route] Profile shown in the admin header.
#[utoipa::path(
    get,
    path = "/admin/profile",
    responses((status = 200, description = "Profile", body = ProfileView))
)]
pub async fn get_admin_profile(
    ApiSession { api, .. }: ApiSession,
) -> Result<Json<ProfileView>, AppError> {
    Ok(Json(ProfileView::from(api.profile().await?)))
}
