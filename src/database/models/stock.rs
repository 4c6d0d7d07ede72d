use serde::{Deserialize, Serialize};

use super::{required, Resource, ValidationError};
use crate::database::repository::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Swing,
    Long,
}

impl OptionType {
    fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim() {
            "swing" => Ok(OptionType::Swing),
            "long" => Ok(OptionType::Long),
            other => Err(ValidationError::new(format!(
                "Option type must be one of \"swing\", \"long\" (got \"{}\")",
                other
            ))),
        }
    }
}

/// A stock pick: chart image, write-up and holding horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub image: String,
    pub description: String,
    #[serde(rename = "optionType")]
    pub option_type: OptionType,
}

#[derive(Debug, Default, Deserialize)]
pub struct StockInput {
    pub image: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "optionType")]
    pub option_type: Option<String>,
}

const IMAGE_REQUIRED: &str = "Image must not be empty";
const DESCRIPTION_REQUIRED: &str = "Description must not be empty";
const OPTION_TYPE_REQUIRED: &str = "Option type must not be empty";

impl Model for Stock {
    const COLLECTION: &'static str = "stocks";
}

impl Resource for Stock {
    type Input = StockInput;

    const LABEL: &'static str = "Stock";
    const PLURAL: &'static str = "Stocks";

    fn create(input: StockInput) -> Result<Self, ValidationError> {
        let option_type = required(input.option_type, OPTION_TYPE_REQUIRED)?;
        Ok(Stock {
            image: required(input.image, IMAGE_REQUIRED)?,
            description: required(input.description, DESCRIPTION_REQUIRED)?,
            option_type: OptionType::parse(&option_type)?,
        })
    }

    fn apply(&mut self, input: StockInput) -> Result<(), ValidationError> {
        if input.image.is_some() {
            self.image = required(input.image, IMAGE_REQUIRED)?;
        }
        if input.description.is_some() {
            self.description = required(input.description, DESCRIPTION_REQUIRED)?;
        }
        if let Some(raw) = input.option_type {
            self.option_type = OptionType::parse(&raw)?;
        }
        Ok(())
    }

    fn owned_uploads(&self) -> Vec<&str> {
        vec![self.image.as_str()]
    }
}
