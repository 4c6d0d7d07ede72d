use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Model;

/// Member post. `comments` references documents in the comments collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub content: String,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub author: Uuid,
    #[serde(default)]
    pub likes: Vec<Uuid>,
    #[serde(default)]
    pub comments: Vec<Uuid>,
}

impl Model for Post {
    const COLLECTION: &'static str = "posts";
}
