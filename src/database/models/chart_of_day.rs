use serde::{Deserialize, Serialize};

use super::{required, Resource, ValidationError};
use crate::database::document::SortOrder;
use crate::database::repository::Model;

/// Chart of the day: an uploaded chart image with a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOfDay {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartOfDayInput {
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub description: Option<String>,
}

const IMAGE_REQUIRED: &str = "Image URL must not be empty";
const DESCRIPTION_REQUIRED: &str = "Description must not be empty";

impl Model for ChartOfDay {
    const COLLECTION: &'static str = "charts";
}

impl Resource for ChartOfDay {
    type Input = ChartOfDayInput;

    const LABEL: &'static str = "Chart";
    const PLURAL: &'static str = "Charts of the Day";
    const LIST_ORDER: SortOrder = SortOrder::Newest;

    fn create(input: ChartOfDayInput) -> Result<Self, ValidationError> {
        Ok(ChartOfDay {
            image_url: required(input.image_url, IMAGE_REQUIRED)?,
            description: required(input.description, DESCRIPTION_REQUIRED)?,
        })
    }

    fn apply(&mut self, input: ChartOfDayInput) -> Result<(), ValidationError> {
        if input.image_url.is_some() {
            self.image_url = required(input.image_url, IMAGE_REQUIRED)?;
        }
        if input.description.is_some() {
            self.description = required(input.description, DESCRIPTION_REQUIRED)?;
        }
        Ok(())
    }

    fn owned_uploads(&self) -> Vec<&str> {
        vec![self.image_url.as_str()]
    }
}
