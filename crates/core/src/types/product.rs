//! Catalog product records.
//!
//! Products are read-only from the storefront's point of view. Field names
//! follow the backend's camelCase JSON.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::{DiscountPercentage, Price};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub discount_percentage: DiscountPercentage,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub availability_status: AvailabilityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub shipping_information: String,
    #[serde(default)]
    pub return_policy: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// The recommended retail price implied by the discount.
    #[must_use]
    pub fn recommended_retail(&self) -> Option<Price> {
        self.price.recommended_retail(self.discount_percentage)
    }
}

/// Physical size in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// A customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub reviewer_name: String,
}

/// Stock availability as the backend labels it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    #[default]
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    /// Any label this storefront does not know about.
    #[serde(untagged)]
    Other(String),
}

impl AvailabilityStatus {
    /// Whether the product can currently be bought.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::InStock | Self::LowStock)
    }

    /// The label shown to shoppers.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "id": 1,
        "title": "Essence Mascara Lash Princess",
        "description": "A popular mascara.",
        "category": "beauty",
        "price": 9.99,
        "discountPercentage": 7.17,
        "rating": 4.94,
        "stock": 5,
        "availabilityStatus": "Low Stock",
        "brand": "Essence",
        "sku": "RCH45Q1A",
        "weight": 2,
        "dimensions": {"width": 23.17, "height": 14.43, "depth": 28.01},
        "images": ["https://cdn.example.com/1/1.png"],
        "thumbnail": "https://cdn.example.com/1/thumb.png",
        "shippingInformation": "Ships in 1 month",
        "returnPolicy": "30 days return policy",
        "reviews": [
            {"rating": 2, "comment": "Very unhappy with my purchase!",
             "date": "2024-05-23T08:56:21.618Z", "reviewerName": "John Doe"}
        ]
    }"#;

    #[test]
    fn test_parse_backend_product() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.availability_status, AvailabilityStatus::LowStock);
        assert_eq!(product.brand.as_deref(), Some("Essence"));
        assert_eq!(product.reviews.len(), 1);
        assert_eq!(product.reviews[0].reviewer_name, "John Doe");
    }

    #[test]
    fn test_unknown_availability_is_preserved() {
        let status: AvailabilityStatus = serde_json::from_str(r#""Discontinued""#).unwrap();
        assert_eq!(status, AvailabilityStatus::Other("Discontinued".to_string()));
        assert!(!status.is_available());
    }

    #[test]
    fn test_recommended_retail_from_discount() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        // 9.99 / (1 - 0.0717) = 10.7616...
        assert_eq!(
            product.recommended_retail().unwrap().amount(),
            Decimal::new(1076, 2)
        );
        assert!(product.availability_status.is_available());
    }
}
