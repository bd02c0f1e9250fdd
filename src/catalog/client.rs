//! HTTP client for the catalog admin API.

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::config::Config;

use super::error::ApiError;
use super::types::{
  AttributePayload, AttributeValue, AttributeValuePayload, Category, CategoryPayload,
  CategoryStats, PrintSpecs, PrintSpecsPayload, Product, ProductAttribute, ProductImage,
  ProductImagePayload, ProductPayload, ProductReview, ProductStats, StockUpdate, Subcategory,
  SubcategoryPayload, User, UserPatch, UserStats,
};

/// Query parameters accepted by the list endpoints.
///
/// `search` and `ordering` map onto the server-side filters; `product` and
/// `attribute` scope the nested resources (attributes of one product, values
/// of one attribute).
#[derive(Debug, Clone, Default)]
pub struct ListParams {
  pub search: Option<String>,
  pub ordering: Option<String>,
  pub product: Option<i64>,
  pub attribute: Option<i64>,
}

impl ListParams {
  /// Params carrying only a search term.
  pub fn search(term: impl Into<String>) -> Self {
    Self {
      search: Some(term.into()),
      ..Self::default()
    }
  }

  /// Params scoped to one product.
  pub fn for_product(id: i64) -> Self {
    Self {
      product: Some(id),
      ..Self::default()
    }
  }

  fn query(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(search) = &self.search {
      pairs.push(("search", search.clone()));
    }
    if let Some(ordering) = &self.ordering {
      pairs.push(("ordering", ordering.clone()));
    }
    if let Some(product) = self.product {
      pairs.push(("product", product.to_string()));
    }
    if let Some(attribute) = self.attribute {
      pairs.push(("attribute", attribute.to_string()));
    }
    pairs
  }
}

#[derive(Debug, Deserialize)]
struct HelpfulCount {
  helpful_count: i64,
}

/// Catalog API client: thin one-to-one wrappers over the admin endpoints.
///
/// Attaches the encoded Basic credential to every request when one is
/// present. A missing credential is allowed - the server answers 401 and the
/// caller reacts; the client never validates proactively.
#[derive(Clone, Debug)]
pub struct CatalogClient {
  http: reqwest::Client,
  base: Url,
  credential: Option<String>,
}

impl CatalogClient {
  pub fn new(config: &Config, credential: Option<String>) -> Result<Self, ApiError> {
    let base = Url::parse(&config.api.url)?;
    let http = reqwest::Client::builder()
      .timeout(std::time::Duration::from_secs(config.api.timeout_secs))
      .build()?;
    Ok(Self {
      http,
      base,
      credential,
    })
  }

  /// Same client with a different credential. The connection pool is shared.
  pub fn with_credential(&self, credential: Option<String>) -> Self {
    Self {
      http: self.http.clone(),
      base: self.base.clone(),
      credential,
    }
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    // Url::join would swallow the last path segment of a base without a
    // trailing slash, so normalize by hand.
    let mut joined = self.base.as_str().trim_end_matches('/').to_string();
    joined.push('/');
    joined.push_str(path);
    Ok(Url::parse(&joined)?)
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    let req = self.http.request(method, url);
    match &self.credential {
      Some(credential) => req.header(AUTHORIZATION, format!("Basic {credential}")),
      None => req,
    }
  }

  async fn expect_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "API call failed");
    Err(ApiError::from_response(status, body))
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &ListParams,
  ) -> Result<T, ApiError> {
    let mut url = self.endpoint(path)?;
    let pairs = params.query();
    if !pairs.is_empty() {
      url
        .query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
    let response = self.request(Method::GET, url).send().await?;
    let response = Self::expect_success(response).await?;
    Ok(response.json().await?)
  }

  async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let url = self.endpoint(path)?;
    let response = self.request(method, url).json(body).send().await?;
    let response = Self::expect_success(response).await?;
    Ok(response.json().await?)
  }

  /// POST to an action endpoint with an empty body, discarding the response.
  async fn post_action(&self, path: &str) -> Result<(), ApiError> {
    let url = self.endpoint(path)?;
    let response = self.request(Method::POST, url).send().await?;
    Self::expect_success(response).await?;
    Ok(())
  }

  async fn delete(&self, path: &str) -> Result<(), ApiError> {
    let url = self.endpoint(path)?;
    let response = self.request(Method::DELETE, url).send().await?;
    Self::expect_success(response).await?;
    Ok(())
  }

  // --- Users ---

  pub async fn list_users(&self, params: &ListParams) -> Result<Vec<User>, ApiError> {
    self.get_json("admin/users/", params).await
  }

  pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
    self
      .get_json(&format!("admin/users/{id}/"), &ListParams::default())
      .await
  }

  pub async fn update_user(&self, id: i64, patch: &UserPatch) -> Result<User, ApiError> {
    self
      .send_json(Method::PATCH, &format!("admin/users/{id}/"), patch)
      .await
  }

  pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/users/{id}/")).await
  }

  pub async fn activate_user(&self, id: i64) -> Result<(), ApiError> {
    self.post_action(&format!("admin/users/{id}/activate/")).await
  }

  pub async fn deactivate_user(&self, id: i64) -> Result<(), ApiError> {
    self
      .post_action(&format!("admin/users/{id}/deactivate/"))
      .await
  }

  pub async fn user_stats(&self) -> Result<UserStats, ApiError> {
    self
      .get_json("admin/users/stats/", &ListParams::default())
      .await
  }

  // --- Categories ---

  pub async fn list_categories(&self, params: &ListParams) -> Result<Vec<Category>, ApiError> {
    self.get_json("admin/categories/", params).await
  }

  pub async fn get_category(&self, id: i64) -> Result<Category, ApiError> {
    self
      .get_json(&format!("admin/categories/{id}/"), &ListParams::default())
      .await
  }

  pub async fn create_category(&self, payload: &CategoryPayload) -> Result<Category, ApiError> {
    self
      .send_json(Method::POST, "admin/categories/", payload)
      .await
  }

  pub async fn update_category(
    &self,
    id: i64,
    payload: &CategoryPayload,
  ) -> Result<Category, ApiError> {
    self
      .send_json(Method::PATCH, &format!("admin/categories/{id}/"), payload)
      .await
  }

  pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/categories/{id}/")).await
  }

  pub async fn category_stats(&self) -> Result<CategoryStats, ApiError> {
    self
      .get_json("admin/categories/stats/", &ListParams::default())
      .await
  }

  // --- Subcategories ---

  pub async fn list_subcategories(
    &self,
    params: &ListParams,
  ) -> Result<Vec<Subcategory>, ApiError> {
    self.get_json("admin/subcategories/", params).await
  }

  pub async fn get_subcategory(&self, id: i64) -> Result<Subcategory, ApiError> {
    self
      .get_json(
        &format!("admin/subcategories/{id}/"),
        &ListParams::default(),
      )
      .await
  }

  pub async fn create_subcategory(
    &self,
    payload: &SubcategoryPayload,
  ) -> Result<Subcategory, ApiError> {
    self
      .send_json(Method::POST, "admin/subcategories/", payload)
      .await
  }

  pub async fn update_subcategory(
    &self,
    id: i64,
    payload: &SubcategoryPayload,
  ) -> Result<Subcategory, ApiError> {
    self
      .send_json(
        Method::PATCH,
        &format!("admin/subcategories/{id}/"),
        payload,
      )
      .await
  }

  pub async fn delete_subcategory(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/subcategories/{id}/")).await
  }

  // --- Products ---

  pub async fn list_products(&self, params: &ListParams) -> Result<Vec<Product>, ApiError> {
    self.get_json("admin/products/", params).await
  }

  pub async fn get_product(&self, id: i64) -> Result<Product, ApiError> {
    self
      .get_json(&format!("admin/products/{id}/"), &ListParams::default())
      .await
  }

  pub async fn create_product(&self, payload: &ProductPayload) -> Result<Product, ApiError> {
    self.send_json(Method::POST, "admin/products/", payload).await
  }

  pub async fn update_product(
    &self,
    id: i64,
    payload: &ProductPayload,
  ) -> Result<Product, ApiError> {
    self
      .send_json(Method::PATCH, &format!("admin/products/{id}/"), payload)
      .await
  }

  pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/products/{id}/")).await
  }

  /// Update stock quantities for several products in one call.
  pub async fn bulk_update_stock(&self, updates: &[StockUpdate]) -> Result<(), ApiError> {
    let body = serde_json::json!({ "updates": updates });
    let _: serde_json::Value = self
      .send_json(Method::POST, "admin/products/bulk_update_stock/", &body)
      .await?;
    Ok(())
  }

  pub async fn product_stats(&self) -> Result<ProductStats, ApiError> {
    self
      .get_json("admin/products/stats/", &ListParams::default())
      .await
  }

  // --- Product attributes and values ---

  pub async fn list_attributes(
    &self,
    params: &ListParams,
  ) -> Result<Vec<ProductAttribute>, ApiError> {
    self.get_json("admin/attributes/", params).await
  }

  pub async fn create_attribute(
    &self,
    payload: &AttributePayload,
  ) -> Result<ProductAttribute, ApiError> {
    self
      .send_json(Method::POST, "admin/attributes/", payload)
      .await
  }

  pub async fn update_attribute(
    &self,
    id: i64,
    payload: &AttributePayload,
  ) -> Result<ProductAttribute, ApiError> {
    self
      .send_json(Method::PATCH, &format!("admin/attributes/{id}/"), payload)
      .await
  }

  pub async fn delete_attribute(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/attributes/{id}/")).await
  }

  pub async fn list_attribute_values(
    &self,
    params: &ListParams,
  ) -> Result<Vec<AttributeValue>, ApiError> {
    self.get_json("admin/attribute-values/", params).await
  }

  pub async fn create_attribute_value(
    &self,
    payload: &AttributeValuePayload,
  ) -> Result<AttributeValue, ApiError> {
    self
      .send_json(Method::POST, "admin/attribute-values/", payload)
      .await
  }

  pub async fn update_attribute_value(
    &self,
    id: i64,
    payload: &AttributeValuePayload,
  ) -> Result<AttributeValue, ApiError> {
    self
      .send_json(
        Method::PATCH,
        &format!("admin/attribute-values/{id}/"),
        payload,
      )
      .await
  }

  pub async fn delete_attribute_value(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/attribute-values/{id}/")).await
  }

  // --- Print specs ---

  pub async fn list_print_specs(&self, params: &ListParams) -> Result<Vec<PrintSpecs>, ApiError> {
    self.get_json("admin/print-specs/", params).await
  }

  pub async fn create_print_specs(
    &self,
    payload: &PrintSpecsPayload,
  ) -> Result<PrintSpecs, ApiError> {
    self
      .send_json(Method::POST, "admin/print-specs/", payload)
      .await
  }

  pub async fn update_print_specs(
    &self,
    id: i64,
    payload: &PrintSpecsPayload,
  ) -> Result<PrintSpecs, ApiError> {
    self
      .send_json(Method::PATCH, &format!("admin/print-specs/{id}/"), payload)
      .await
  }

  pub async fn delete_print_specs(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/print-specs/{id}/")).await
  }

  // --- Product images ---

  pub async fn list_product_images(
    &self,
    params: &ListParams,
  ) -> Result<Vec<ProductImage>, ApiError> {
    self.get_json("admin/product-images/", params).await
  }

  pub async fn create_product_image(
    &self,
    payload: &ProductImagePayload,
  ) -> Result<ProductImage, ApiError> {
    self
      .send_json(Method::POST, "admin/product-images/", payload)
      .await
  }

  pub async fn update_product_image(
    &self,
    id: i64,
    payload: &ProductImagePayload,
  ) -> Result<ProductImage, ApiError> {
    self
      .send_json(
        Method::PATCH,
        &format!("admin/product-images/{id}/"),
        payload,
      )
      .await
  }

  pub async fn delete_product_image(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/product-images/{id}/")).await
  }

  // --- Product reviews ---

  pub async fn list_product_reviews(
    &self,
    params: &ListParams,
  ) -> Result<Vec<ProductReview>, ApiError> {
    self.get_json("admin/product-reviews/", params).await
  }

  pub async fn get_product_review(&self, id: i64) -> Result<ProductReview, ApiError> {
    self
      .get_json(
        &format!("admin/product-reviews/{id}/"),
        &ListParams::default(),
      )
      .await
  }

  pub async fn delete_product_review(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("admin/product-reviews/{id}/")).await
  }

  /// Increment a review's helpful count; returns the new count.
  pub async fn mark_review_helpful(&self, id: i64) -> Result<i64, ApiError> {
    let url = self.endpoint(&format!("admin/product-reviews/{id}/mark_helpful/"))?;
    let response = self.request(Method::POST, url).send().await?;
    let response = Self::expect_success(response).await?;
    let count: HelpfulCount = response.json().await?;
    Ok(count.helpful_count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{ApiConfig, Config};

  fn config(url: &str) -> Config {
    Config {
      api: ApiConfig {
        url: url.to_string(),
        timeout_secs: 10,
      },
      title: None,
    }
  }

  #[test]
  fn endpoint_joins_with_and_without_trailing_slash() {
    for base in [
      "http://127.0.0.1:8000/api/v1",
      "http://127.0.0.1:8000/api/v1/",
    ] {
      let client = CatalogClient::new(&config(base), None).unwrap();
      let url = client.endpoint("admin/users/stats/").unwrap();
      assert_eq!(
        url.as_str(),
        "http://127.0.0.1:8000/api/v1/admin/users/stats/"
      );
    }
  }

  #[test]
  fn invalid_base_url_is_rejected() {
    let err = CatalogClient::new(&config("not a url"), None).unwrap_err();
    assert!(matches!(err, ApiError::Url(_)));
  }

  #[test]
  fn list_params_build_query_pairs() {
    let params = ListParams {
      search: Some("card".to_string()),
      ordering: Some("-created_at".to_string()),
      product: Some(3),
      attribute: None,
    };
    let pairs = params.query();
    assert_eq!(
      pairs,
      vec![
        ("search", "card".to_string()),
        ("ordering", "-created_at".to_string()),
        ("product", "3".to_string()),
      ]
    );
  }
}
