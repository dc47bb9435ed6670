//! Setup form rules checked before a generation run starts

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Whitespace-separated word count of trimmed text; empty text is zero words.
#[inline]
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minimums a setup form must meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupRules {
    /// Minimum company name length in characters, after trimming
    pub min_company_chars: usize,
    /// Minimum words in the job description
    pub min_description_words: usize,
}

impl SetupRules {
    /// Check a form. The company name is checked first.
    ///
    /// # Errors
    /// - `ValidationError::CompanyNameTooShort`
    /// - `ValidationError::DescriptionTooShort`
    pub fn check(&self, company: &str, description: &str) -> Result<(), ValidationError> {
        if company.trim().chars().count() < self.min_company_chars {
            return Err(ValidationError::CompanyNameTooShort {
                min: self.min_company_chars,
            });
        }
        let words = word_count(description);
        if words < self.min_description_words {
            return Err(ValidationError::DescriptionTooShort {
                words,
                required: self.min_description_words,
            });
        }
        Ok(())
    }

    /// Whether the generate action should be enabled
    #[inline]
    #[must_use]
    pub fn can_generate(&self, company: &str, description: &str) -> bool {
        self.check(company, description).is_ok()
    }
}

impl Default for SetupRules {
    fn default() -> Self {
        Self {
            min_company_chars: 2,
            min_description_words: 50,
        }
    }
}
