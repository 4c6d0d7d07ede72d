use serde::{Deserialize, Serialize};

use super::{required, Resource, ValidationError};
use crate::database::document::SortOrder;
use crate::database::repository::Model;

/// A question attached to a video. Without answer options the quiz is
/// answered manually (free text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    pub video: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "isManual", default)]
    pub is_manual: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuizInput {
    pub question: Option<String>,
    pub video: Option<String>,
    pub options: Option<Vec<String>>,
}

const QUESTION_REQUIRED: &str = "Question must not be empty";
const VIDEO_REQUIRED: &str = "Video must not be empty";

impl Quiz {
    fn refresh_manual_flag(&mut self) {
        self.is_manual = self.options.is_empty();
    }
}

impl Model for Quiz {
    const COLLECTION: &'static str = "quizzes";
}

impl Resource for Quiz {
    type Input = QuizInput;

    const LABEL: &'static str = "Quiz";
    const PLURAL: &'static str = "Quizzes";
    const LIST_ORDER: SortOrder = SortOrder::Newest;

    fn create(input: QuizInput) -> Result<Self, ValidationError> {
        let mut quiz = Quiz {
            question: required(input.question, QUESTION_REQUIRED)?,
            video: required(input.video, VIDEO_REQUIRED)?,
            options: input.options.unwrap_or_default(),
            is_manual: false,
        };
        quiz.refresh_manual_flag();
        Ok(quiz)
    }

    fn apply(&mut self, input: QuizInput) -> Result<(), ValidationError> {
        if input.question.is_some() {
            self.question = required(input.question, QUESTION_REQUIRED)?;
        }
        if input.video.is_some() {
            self.video = required(input.video, VIDEO_REQUIRED)?;
        }
        if let Some(options) = input.options {
            self.options = options;
        }
        self.refresh_manual_flag();
        Ok(())
    }
}
