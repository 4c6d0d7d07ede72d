use serde::{Deserialize, Serialize};

use super::{required, Resource, ValidationError};
use crate::database::repository::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentInput {
    pub text: Option<String>,
}

const TEXT_REQUIRED: &str = "Text must not be empty";

impl Model for Comment {
    const COLLECTION: &'static str = "comments";
}

impl Resource for Comment {
    type Input = CommentInput;

    const LABEL: &'static str = "Comment";
    const PLURAL: &'static str = "Comments";

    fn create(input: CommentInput) -> Result<Self, ValidationError> {
        Ok(Comment {
            text: required(input.text, TEXT_REQUIRED)?,
        })
    }

    fn apply(&mut self, input: CommentInput) -> Result<(), ValidationError> {
        if input.text.is_some() {
            self.text = required(input.text, TEXT_REQUIRED)?;
        }
        Ok(())
    }
}
