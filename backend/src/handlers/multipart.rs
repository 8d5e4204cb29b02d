//! Multipart form reading shared by the image endpoints

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{AppError, AppResult};

/// Fields of an image upload form
#[derive(Debug, Default)]
pub struct ImageForm {
    pub image: Option<Vec<u8>>,
    pub fields: HashMap<String, String>,
}

impl ImageForm {
    /// Read every part; the `image` part is kept as bytes, others as text
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ImageForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                form.image = Some(field.bytes().await?.to_vec());
            } else {
                let value = field.text().await?;
                let value = value.trim();
                if !value.is_empty() {
                    form.fields.insert(name, value.to_string());
                }
            }
        }
        Ok(form)
    }

    pub fn take_image(&mut self) -> AppResult<Vec<u8>> {
        self.image
            .take()
            .ok_or_else(|| AppError::MissingField("image".to_string()))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn require_text(&self, name: &str) -> AppResult<&str> {
        self.text(name)
            .ok_or_else(|| AppError::MissingField(name.to_string()))
    }

    /// Parse a required numeric field
    pub fn require_number(&self, name: &str) -> AppResult<f64> {
        let raw = self.require_text(name)?;
        raw.parse::<f64>().map_err(|_| AppError::Validation {
            field: name.to_string(),
            message: format!("'{}' is not a number", raw),
        })
    }
}
