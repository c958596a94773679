//! Review rating and input validation

use mongodb::bson::oid::ObjectId;

use super::ValidationError;

/// Maximum length for review comments
const MAX_COMMENT_LEN: usize = 2000;

/// Maximum length for the author display name
const MAX_AUTHOR_LEN: usize = 80;

/// Star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rating(u8);

impl Rating {
    /// Create a rating, rejecting anything outside 1..=5.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                reason: "must be between 1 and 5",
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Validated review input
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub product_id: ObjectId,
    pub author: String,
    pub rating: Rating,
    pub comment: String,
}

impl ReviewDraft {
    pub fn new(
        product_id: ObjectId,
        author: &str,
        rating: u8,
        comment: &str,
    ) -> Result<Self, ValidationError> {
        let author = author.trim();
        if author.is_empty() {
            return Err(ValidationError::Empty { field: "author" });
        }
        if author.len() > MAX_AUTHOR_LEN {
            return Err(ValidationError::TooLong {
                field: "author",
                max: MAX_AUTHOR_LEN,
            });
        }

        if comment.len() > MAX_COMMENT_LEN {
            return Err(ValidationError::TooLong {
                field: "comment",
                max: MAX_COMMENT_LEN,
            });
        }

        Ok(Self {
            product_id,
            author: author.to_owned(),
            rating: Rating::new(rating)?,
            comment: comment.trim().to_owned(),
        })
    }
}
