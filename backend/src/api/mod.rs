//! Client for the remote blog API.

mod client;
mod error;

pub use client::{BlogApi, ApiState, HttpBlogApi, ImageUpload};
pub use error::ApiError;
