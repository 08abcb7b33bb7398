//! Product name validation against the known-brand list.

use serde::{Deserialize, Serialize};

/// Checks product names for a recognised brand.
#[derive(Debug, Clone)]
pub struct BrandValidator {
    brands: Vec<String>,
}

impl BrandValidator {
    /// Create a validator for the given brand substrings.
    pub fn new<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            brands: brands
                .into_iter()
                .map(|b| b.as_ref().trim().to_lowercase())
                .filter(|b| !b.is_empty())
                .collect(),
        }
    }

    /// Whether the product name contains any known brand (case-insensitive).
    pub fn brand_present(&self, product_name: &str) -> bool {
        let name = product_name.to_lowercase();
        self.brands.iter().any(|b| name.contains(b.as_str()))
    }

    /// The normalized brand list.
    pub fn brands(&self) -> &[String] {
        &self.brands
    }
}

/// Returned in place of an analysis when no known brand is named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandMissing {
    pub error: String,
    pub message: String,
}

impl Default for BrandMissing {
    fn default() -> Self {
        Self {
            error: "Brand missing".to_string(),
            message: "Please specify a product brand.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisSettings;

    fn default_validator() -> BrandValidator {
        BrandValidator::new(AnalysisSettings::default().known_brands)
    }

    #[test]
    fn test_known_brands_match_case_insensitively() {
        let validator = default_validator();
        assert!(validator.brand_present("Pantene Anti-Dandruff Shampoo"));
        assert!(validator.brand_present("CERAVE Moisturising Cream"));
        assert!(validator.brand_present("la Roche-Posay Effaclar"));
        assert!(validator.brand_present("Soft creme by nivea"));
    }

    #[test]
    fn test_unknown_brand_rejected() {
        let validator = default_validator();
        assert!(!validator.brand_present("Unknown Brand Wash"));
        assert!(!validator.brand_present(""));
        assert!(!validator.brand_present("La Roche Posay"));
    }

    #[test]
    fn test_configured_brands_are_normalized() {
        let validator = BrandValidator::new(["  Dove ", "", "AVEENO"]);
        assert_eq!(validator.brands(), &["dove".to_string(), "aveeno".to_string()]);
        assert!(validator.brand_present("Aveeno Daily Lotion"));
        assert!(!validator.brand_present("Pantene Shampoo"));
    }

    #[test]
    fn test_brand_missing_record_shape() {
        let json = serde_json::to_value(BrandMissing::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Brand missing",
                "message": "Please specify a product brand."
            })
        );
    }
}
