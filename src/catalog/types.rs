//! Serde models for the catalog admin API.
//!
//! Shapes mirror the backend serializers. Decimal amounts (prices, print
//! dimensions) arrive as JSON strings and are kept as strings for display;
//! nothing in this client does arithmetic on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
  pub id: i64,
  #[serde(default)]
  pub company_name: String,
  pub recipient_name: String,
  #[serde(default)]
  pub phone_number: String,
  pub street: String,
  #[serde(default)]
  pub apartment_suite: String,
  pub city: String,
  #[serde(default)]
  pub state: String,
  pub zip_code: String,
  pub country: String,
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default)]
  pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub email: String,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub avatar: Option<String>,
  #[serde(default)]
  pub company_name: String,
  #[serde(default)]
  pub tax_id: String,
  #[serde(default)]
  pub role: Option<Role>,
  #[serde(default)]
  pub addresses: Vec<Address>,
  #[serde(default)]
  pub is_verified: bool,
  pub date_joined: DateTime<Utc>,
  #[serde(default)]
  pub last_login: Option<DateTime<Utc>>,
}

impl User {
  /// Full name when present, username otherwise.
  pub fn display_name(&self) -> String {
    let full = format!("{} {}", self.first_name, self.last_name);
    let full = full.trim();
    if full.is_empty() {
      self.username.clone()
    } else {
      full.to_string()
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
  pub id: i64,
  pub name: String,
  pub slug: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image: Option<String>,
  pub category: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub id: i64,
  pub name: String,
  pub slug: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
  pub id: i64,
  pub value: String,
  #[serde(default)]
  pub display_value: String,
  #[serde(default)]
  pub price_adjustment: String,
  #[serde(default)]
  pub is_default: bool,
  #[serde(default)]
  pub swatch_color: String,
  #[serde(default)]
  pub swatch_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAttribute {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub display_name: String,
  #[serde(default)]
  pub attribute_type: String,
  #[serde(default)]
  pub is_required: bool,
  #[serde(default)]
  pub values: Vec<AttributeValue>,
}

/// Print-production constraints for a product (dimensions in millimetres).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintSpecs {
  pub width_mm: String,
  pub height_mm: String,
  #[serde(default)]
  pub bleed_margin_mm: String,
  #[serde(default)]
  pub safe_zone_mm: String,
  #[serde(default)]
  pub format_template_url: Option<String>,
  #[serde(default)]
  pub allowed_file_types: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
  pub id: i64,
  pub subcategory: i64,
  #[serde(default)]
  pub subcategory_name: String,
  pub name: String,
  pub slug: String,
  pub sku: String,
  #[serde(default)]
  pub description: String,
  pub base_price: String,
  #[serde(default)]
  pub stock_quantity: i64,
  #[serde(default)]
  pub attributes: Vec<ProductAttribute>,
  #[serde(default)]
  pub print_specs: Option<PrintSpecs>,
  #[serde(default)]
  pub meta_title: String,
  #[serde(default)]
  pub meta_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
  pub id: i64,
  pub product: i64,
  pub image: String,
  #[serde(default)]
  pub alt_text: String,
  #[serde(default)]
  pub display_order: i64,
  #[serde(default)]
  pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReview {
  pub id: i64,
  pub product: i64,
  pub user: i64,
  pub rating: i64,
  #[serde(default)]
  pub title: String,
  pub comment: String,
  #[serde(default)]
  pub is_verified_purchase: bool,
  #[serde(default)]
  pub helpful_count: i64,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

// Stats payloads for the dashboard.

#[derive(Debug, Clone, Deserialize)]
pub struct UserStats {
  pub total: i64,
  pub active: i64,
  pub today: i64,
  pub this_week: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryStats {
  pub total: i64,
  pub active: i64,
  pub inactive: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductStats {
  pub total: i64,
  pub active: i64,
  pub inactive: i64,
  pub low_stock: i64,
}

/// One entry of a bulk stock update.
#[derive(Debug, Clone, Serialize)]
pub struct StockUpdate {
  pub id: i64,
  pub stock_quantity: i64,
}

// Mutation payloads. Every field is optional and absent fields are omitted
// from the body, so one struct serves both create (all relevant fields set)
// and partial update.

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryPayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slug: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubcategoryPayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slug: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subcategory: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub slug: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sku: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_price: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stock_quantity: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_active: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta_title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributeValuePayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attribute: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_value: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price_adjustment: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_default: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub swatch_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributePayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub product: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attribute_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_required: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_order: Option<i64>,
  /// Nested values, accepted by the create endpoint.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub values: Option<Vec<AttributeValuePayload>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrintSpecsPayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub product: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub width_mm: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub height_mm: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bleed_margin_mm: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub safe_zone_mm: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub format_template_url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allowed_file_types: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductImagePayload {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub product: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alt_text: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub display_order: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_primary: Option<bool>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_display_name_falls_back_to_username() {
    let json = r#"{
      "id": 7,
      "username": "jdoe",
      "email": "jdoe@example.com",
      "date_joined": "2024-03-01T09:30:00Z"
    }"#;
    let user: User = serde_json::from_str(json).unwrap();
    assert_eq!(user.display_name(), "jdoe");
    assert!(user.addresses.is_empty());
  }

  #[test]
  fn product_deserializes_with_nested_specs() {
    let json = r#"{
      "id": 3,
      "subcategory": 2,
      "subcategory_name": "Business Cards",
      "name": "Premium Card",
      "slug": "premium-card",
      "sku": "BC-001",
      "base_price": "24.90",
      "stock_quantity": 120,
      "print_specs": {
        "width_mm": "85.00",
        "height_mm": "55.00",
        "bleed_margin_mm": "3.00",
        "allowed_file_types": "pdf,png"
      }
    }"#;
    let product: Product = serde_json::from_str(json).unwrap();
    assert_eq!(product.base_price, "24.90");
    let specs = product.print_specs.unwrap();
    assert_eq!(specs.width_mm, "85.00");
    assert_eq!(specs.safe_zone_mm, "");
  }

  #[test]
  fn payload_omits_absent_fields() {
    let patch = CategoryPayload {
      is_active: Some(false),
      ..Default::default()
    };
    let body = serde_json::to_string(&patch).unwrap();
    assert_eq!(body, r#"{"is_active":false}"#);
  }
}
