use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use folio_catalog::{AuthorView, Book, CatalogService, NewBook, Page, User};
use folio_core::{Validate, Violations};
use http::{HeaderMap, StatusCode};

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParams, QueryParams, required_header};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;
const CLIENT_ID_HEADER: &str = "x-client-id";

/// Book, author and user routes
pub fn catalog_router(service: CatalogService) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/page", get(list_book_page))
        .route("/books/{id}", get(find_book))
        .route("/authors", get(list_authors))
        .route("/authors/{id}", get(find_author))
        .route("/authors/{id}/books", get(list_author_books))
        .route("/users", get(list_users))
        .route("/users/{id}", get(find_user))
        .with_state(service)
}

/// Query parameters of a paged listing, checked as constraints
struct PageRequest {
    page: i64,
    size: i64,
}

impl Validate for PageRequest {
    const ORIGIN: &'static str = "ConstraintViolation";

    fn validate(&self, violations: &mut Violations) {
        violations.at_least("page", self.page, 0);
        violations.between("size", self.size, 1, MAX_PAGE_SIZE);
    }
}

async fn list_books(State(service): State<CatalogService>, query: QueryParams) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(service.list_all(query.get("sort")).await?))
}

async fn list_book_page(
    State(service): State<CatalogService>,
    query: QueryParams,
) -> Result<Json<Page<Book>>, ApiError> {
    let request = PageRequest {
        page: query.required("page")?,
        size: query.optional("size")?.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    request.check("listPage")?;

    let page = service
        .list_page(request.page.unsigned_abs(), request.size.unsigned_abs(), query.get("sort"))
        .await?;

    Ok(Json(page))
}

async fn find_book(State(service): State<CatalogService>, path: PathParams) -> Result<Json<Book>, ApiError> {
    let id = path.required("id")?;
    Ok(Json(service.find_book(id).await?))
}

async fn create_book(
    State(service): State<CatalogService>,
    headers: HeaderMap,
    JsonBody(book): JsonBody<NewBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let client = required_header(&headers, CLIENT_ID_HEADER)?;
    book.check("createBook")?;

    let created = service.create_book(book).await?;
    tracing::info!(client, book_id = created.id, "book created");

    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_authors(State(service): State<CatalogService>) -> Result<Json<Vec<AuthorView>>, ApiError> {
    let authors = service.list_authors().await?;
    Ok(Json(authors.into_iter().map(AuthorView::from).collect()))
}

async fn find_author(State(service): State<CatalogService>, path: PathParams) -> Result<Json<AuthorView>, ApiError> {
    let id = path.required("id")?;
    Ok(Json(service.find_author(id).await?.into()))
}

async fn list_author_books(
    State(service): State<CatalogService>,
    path: PathParams,
) -> Result<Json<Vec<Book>>, ApiError> {
    let id = path.required("id")?;
    Ok(Json(service.list_author_books(id).await?))
}

async fn list_users(State(service): State<CatalogService>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(service.list_users().await?))
}

async fn find_user(State(service): State<CatalogService>, path: PathParams) -> Result<Json<User>, ApiError> {
    let id = path.required("id")?;
    Ok(Json(service.find_user(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_bounds() {
        assert!(PageRequest { page: 0, size: 1 }.check("listPage").is_ok());
        assert!(PageRequest { page: 3, size: 100 }.check("listPage").is_ok());

        let failure = PageRequest { page: -1, size: 101 }.check("listPage").unwrap_err();
        let paths: Vec<_> = failure.violations.iter().map(|v| v.property_path.to_string()).collect();

        assert_eq!(failure.origin, "ConstraintViolation");
        assert_eq!(paths, ["listPage.page", "listPage.size"]);
    }
}
