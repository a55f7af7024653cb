//! Book Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::ListBooks;
use crate::infrastructure::http::dto::{ApiResponse, BookDto};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BookDto>>>, ApiError> {
    let books = state.list_books_handler.handle(ListBooks).await?;
    Ok(Json(ApiResponse::success(books.iter().map(BookDto::from).collect())))
}
