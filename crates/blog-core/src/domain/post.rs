use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldError};

/// Minimum title length accepted when a title is changed.
pub const MIN_UPDATED_TITLE_CHARS: usize = 3;

/// Post entity - a blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with generated ID and timestamps.
    pub fn new(input: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            author: input.author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a set of changes in place and bump `updated_at`.
    pub fn apply(&mut self, changes: PostChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(author) = changes.author {
            self.author = author;
        }
        self.updated_at = now.max(self.created_at);
    }
}

/// Validated input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl NewPost {
    /// Check the raw create payload. All three fields are required and non-empty.
    pub fn validate(
        title: Option<String>,
        content: Option<String>,
        author: Option<String>,
    ) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let title = required(title, "title", "Title is required", &mut errors);
        let content = required(content, "content", "Content is required", &mut errors);
        let author = required(author, "author", "Author is required", &mut errors);

        match (title, content, author) {
            (Some(title), Some(content), Some(author)) if errors.is_empty() => Ok(Self {
                title,
                content,
                author,
            }),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}

/// Validated partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

impl PostChanges {
    /// Check the raw update payload.
    ///
    /// A supplied title must be at least three characters. Supplied content and
    /// author must not be empty, so a persisted post never loses them.
    pub fn validate(
        title: Option<String>,
        content: Option<String>,
        author: Option<String>,
    ) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        if let Some(title) = &title {
            if title.chars().count() < MIN_UPDATED_TITLE_CHARS {
                errors.push(FieldError::new(
                    "title",
                    "Title must be at least 3 characters",
                ));
            }
        }
        if content.as_deref() == Some("") {
            errors.push(FieldError::new("content", "Content cannot be empty"));
        }
        if author.as_deref() == Some("") {
            errors.push(FieldError::new("author", "Author cannot be empty"));
        }

        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        Ok(Self {
            title,
            content,
            author,
        })
    }
}

fn required(
    value: Option<String>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn field_names(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_post_requires_all_fields() {
        let err = NewPost::validate(None, Some(String::new()), Some("Ada".into())).unwrap_err();
        assert_eq!(field_names(err), vec!["title", "content"]);
    }

    #[test]
    fn test_new_post_accepts_short_title() {
        let post = NewPost::validate(Some("Hi".into()), Some("Body".into()), Some("Ada".into()))
            .unwrap();
        assert_eq!(post.title, "Hi");
    }

    #[test]
    fn test_changes_reject_short_title() {
        let err = PostChanges::validate(Some("ab".into()), None, None).unwrap_err();
        assert_eq!(field_names(err), vec!["title"]);
    }

    #[test]
    fn test_changes_count_characters_not_bytes() {
        assert!(PostChanges::validate(Some("héé".into()), None, None).is_ok());
    }

    #[test]
    fn test_changes_reject_empty_content_and_author() {
        let err = PostChanges::validate(None, Some(String::new()), Some(String::new()))
            .unwrap_err();
        assert_eq!(field_names(err), vec!["content", "author"]);
    }

    #[test]
    fn test_apply_bumps_updated_at_only() {
        let mut post = Post::new(NewPost {
            title: "Title".into(),
            content: "Body".into(),
            author: "Ada".into(),
        });
        let created = post.created_at;
        let later = created + Duration::seconds(5);

        post.apply(
            PostChanges {
                content: Some("New body".into()),
                ..Default::default()
            },
            later,
        );

        assert_eq!(post.title, "Title");
        assert_eq!(post.content, "New body");
        assert_eq!(post.created_at, created);
        assert_eq!(post.updated_at, later);
    }

    #[test]
    fn test_apply_never_moves_updated_at_before_created_at() {
        let mut post = Post::new(NewPost {
            title: "Title".into(),
            content: "Body".into(),
            author: "Ada".into(),
        });
        let earlier = post.created_at - Duration::hours(1);
        post.apply(PostChanges::default(), earlier);
        assert_eq!(post.updated_at, post.created_at);
    }

    #[test]
    fn test_post_serializes_camel_case() {
        let post = Post::new(NewPost {
            title: "Title".into(),
            content: "Body".into(),
            author: "Ada".into(),
        });
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
