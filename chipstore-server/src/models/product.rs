//! Product input validation

use super::ValidationError;

/// Maximum length for product names
const MAX_NAME_LEN: usize = 120;

/// Maximum length for product descriptions
const MAX_DESCRIPTION_LEN: usize = 4000;

/// Validated product name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductName(String);

impl ProductName {
    /// Create a new product name.
    ///
    /// # Rules
    /// - Non-empty after trimming
    /// - Max 120 characters
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }

        if trimmed.len() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated product fields, ready for storage.
///
/// Built from raw request input; construction is the validation boundary.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: ProductName,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub stock: i64,
}

impl ProductDraft {
    pub fn new(
        name: &str,
        description: &str,
        price: f64,
        category: &str,
        image_url: Option<String>,
        stock: i64,
    ) -> Result<Self, ValidationError> {
        let name = ProductName::new(name)?;

        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            });
        }

        if !price.is_finite() || price < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "must be a non-negative number",
            });
        }

        if category.trim().is_empty() {
            return Err(ValidationError::Empty { field: "category" });
        }

        if stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock",
                reason: "must be zero or greater",
            });
        }

        Ok(Self {
            name,
            description: description.trim().to_owned(),
            price,
            category: category.trim().to_owned(),
            image_url,
            stock,
        })
    }
}
