use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Model;

/// Comment embedded in an admin post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminComment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl AdminComment {
    pub fn new(user: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Post in the admin community feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminPost {
    pub content: String,
    pub author: Uuid,
    #[serde(default)]
    pub likes: Vec<Uuid>,
    #[serde(default)]
    pub comments: Vec<AdminComment>,
}

impl AdminPost {
    pub fn new(content: String, author: Uuid) -> Self {
        Self {
            content,
            author,
            likes: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Remove the comment with `comment_id`; false when no such comment exists
    pub fn remove_comment(&mut self, comment_id: Uuid) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != comment_id);
        self.comments.len() != before
    }
}

impl Model for AdminPost {
    const COLLECTION: &'static str = "admin_posts";
}
