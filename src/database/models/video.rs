use serde::{Deserialize, Serialize};

use super::{is_blank, Resource, ValidationError};
use crate::database::repository::Model;

/// A lesson video, either hosted on YouTube or uploaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "youtubeUrl", default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoInput {
    #[serde(rename = "youtubeUrl")]
    pub youtube_url: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
}

impl Video {
    fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.youtube_url) && is_blank(&self.file_path) {
            return Err(ValidationError::new(
                "Either youtubeUrl or a video file path is required.",
            ));
        }
        Ok(())
    }
}

impl Model for Video {
    const COLLECTION: &'static str = "videos";
}

impl Resource for Video {
    type Input = VideoInput;

    const LABEL: &'static str = "Video";
    const PLURAL: &'static str = "Videos";

    fn create(input: VideoInput) -> Result<Self, ValidationError> {
        let video = Video {
            youtube_url: input.youtube_url,
            file_path: input.file_path,
        };
        video.validate()?;
        Ok(video)
    }

    fn apply(&mut self, input: VideoInput) -> Result<(), ValidationError> {
        if input.youtube_url.is_some() {
            self.youtube_url = input.youtube_url;
        }
        if input.file_path.is_some() {
            self.file_path = input.file_path;
        }
        self.validate()
    }

    fn owned_uploads(&self) -> Vec<&str> {
        self.file_path.as_deref().into_iter().collect()
    }
}
