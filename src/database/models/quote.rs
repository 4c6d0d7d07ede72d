use serde::{Deserialize, Serialize};

use super::{is_blank, Resource, ValidationError};
use crate::database::repository::Model;

/// A quote card: an uploaded image, a text, or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteInput {
    pub text: Option<String>,
    pub image: Option<String>,
}

impl Quote {
    fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.text) && is_blank(&self.image) {
            return Err(ValidationError::new("Either text or image is required"));
        }
        Ok(())
    }
}

impl Model for Quote {
    const COLLECTION: &'static str = "quotes";
}

impl Resource for Quote {
    type Input = QuoteInput;

    const LABEL: &'static str = "Quote";
    const PLURAL: &'static str = "Quotes";

    fn create(input: QuoteInput) -> Result<Self, ValidationError> {
        let quote = Quote {
            text: input.text,
            image: input.image,
        };
        quote.validate()?;
        Ok(quote)
    }

    fn apply(&mut self, input: QuoteInput) -> Result<(), ValidationError> {
        if input.text.is_some() {
            self.text = input.text;
        }
        if input.image.is_some() {
            self.image = input.image;
        }
        self.validate()
    }

    fn owned_uploads(&self) -> Vec<&str> {
        self.image.as_deref().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_text_or_image() {
        assert!(Quote::create(QuoteInput::default()).is_err());
        assert!(Quote::create(QuoteInput {
            image: Some("/uploads/a.png".into()),
            ..Default::default()
        })
        .is_ok());
    }

    #[test]
    fn update_keeps_absent_fields() {
        let mut quote = Quote::create(QuoteInput {
            text: Some("stay hungry".into()),
            image: Some("/uploads/a.png".into()),
        })
        .unwrap();
        quote
            .apply(QuoteInput {
                text: Some("stay foolish".into()),
                image: None,
            })
            .unwrap();
        assert_eq!(quote.text.as_deref(), Some("stay foolish"));
        assert_eq!(quote.image.as_deref(), Some("/uploads/a.png"));
    }
}
