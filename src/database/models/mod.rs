pub mod admin_post;
pub mod chart_of_day;
pub mod comment;
pub mod post;
pub mod quiz;
pub mod quote;
pub mod stock;
pub mod user;
pub mod video;

pub use admin_post::{AdminComment, AdminPost};
pub use chart_of_day::ChartOfDay;
pub use comment::Comment;
pub use post::Post;
pub use quiz::Quiz;
pub use quote::Quote;
pub use stock::{OptionType, Stock};
pub use user::{Membership, Role, User, UserProfile, UserSummary};
pub use video::Video;

use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use super::document::SortOrder;
use super::repository::Model;

/// Client input rejected before it reaches the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A model exposed through the standard list/get/create/update/delete routes
pub trait Resource: Model + Clone {
    /// Request body accepted by create and update
    type Input: DeserializeOwned + Send + 'static;

    /// Singular label used in response messages, e.g. "Quote"
    const LABEL: &'static str;
    /// Plural label used in list messages, e.g. "Quotes"
    const PLURAL: &'static str;
    const LIST_ORDER: SortOrder = SortOrder::Oldest;

    fn create(input: Self::Input) -> Result<Self, ValidationError>;

    /// Merge the fields present in `input`, then re-validate
    fn apply(&mut self, input: Self::Input) -> Result<(), ValidationError>;

    /// Uploaded files owned by this document, removed when it is deleted
    fn owned_uploads(&self) -> Vec<&str> {
        Vec::new()
    }
}

pub(crate) fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::new(message)),
    }
}

/// Add `user` to `likes` or remove it if present. Returns true when the user now likes the item.
pub fn toggle_like(likes: &mut Vec<Uuid>, user: Uuid) -> bool {
    match likes.iter().position(|id| *id == user) {
        Some(idx) => {
            likes.remove(idx);
            false
        }
        None => {
            likes.push(user);
            true
        }
    }
}
