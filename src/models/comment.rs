use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::validation::{check_char_len, FieldErrors};

const MIN_TEXT_LEN: usize = 5;
const MAX_TEXT_LEN: usize = 250;

// A remark left on a stock. `stock_id` is cleared when the stock is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_on: DateTime<Utc>,
    pub stock_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub title: String,
    pub content: String,
    pub created_on: DateTime<Utc>,
    pub stock_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_on: DateTime<Utc>,
    pub stock_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub title: String,
    pub content: String,
}

pub type UpdateCommentRequest = CreateCommentRequest;

impl CreateCommentRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        check_char_len(&mut errors, "title", "Title", &self.title, MIN_TEXT_LEN, MAX_TEXT_LEN);
        check_char_len(&mut errors, "content", "Content", &self.content, MIN_TEXT_LEN, MAX_TEXT_LEN);
        errors.into_result()
    }
}
