//! Data Transfer Objects - request bodies for the API.
//!
//! Every field is optional on the wire so that missing fields surface as
//! per-field validation errors instead of a generic deserialization failure.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/blogs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

/// Body of `PUT /api/blogs/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}
