//! Catalog records as stored and as returned to callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::code::ProductCode;

/// Store-assigned record id
pub type RecordId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
	pub id: RecordId,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
	#[default]
	#[serde(rename = "In Stock")]
	InStock,
	#[serde(rename = "Stock Out")]
	StockOut,
}

impl ProductStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProductStatus::InStock => "In Stock",
			ProductStatus::StockOut => "Stock Out",
		}
	}
}

impl fmt::Display for ProductStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ProductStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"In Stock" => Ok(ProductStatus::InStock),
			"Stock Out" => Ok(ProductStatus::StockOut),
			other => Err(format!(
				"Invalid status '{other}', expected 'In Stock' or 'Stock Out'"
			)),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	pub id: RecordId,
	pub name: String,
	pub description: String,
	pub price: f64,
	/// Percentage, 0-100
	pub discount: f64,
	pub image_url: String,
	pub status: ProductStatus,
	pub product_code: ProductCode,
	pub category: RecordId,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Everything the store needs to insert a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
	pub name: String,
	pub description: String,
	pub price: f64,
	pub discount: f64,
	pub image_url: String,
	pub status: ProductStatus,
	pub product_code: ProductCode,
	pub category: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
	pub id: RecordId,
	pub name: String,
}

/// Product with its category populated and the discounted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
	pub id: RecordId,
	pub name: String,
	pub description: String,
	pub price: f64,
	pub discount: f64,
	pub final_price: f64,
	pub image_url: String,
	pub status: ProductStatus,
	pub product_code: ProductCode,
	/// `None` when the referenced category no longer resolves
	pub category: Option<CategoryRef>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl ProductView {
	pub fn new(product: Product, category: Option<&Category>) -> Self {
		Self {
			final_price: final_price(product.price, product.discount),
			category: category.map(|c| CategoryRef {
				id: c.id,
				name: c.name.clone(),
			}),
			id: product.id,
			name: product.name,
			description: product.description,
			price: product.price,
			discount: product.discount,
			image_url: product.image_url,
			status: product.status,
			product_code: product.product_code,
			created_at: product.created_at,
			updated_at: product.updated_at,
		}
	}
}

/// Price after a percentage discount.
pub fn final_price(price: f64, discount: f64) -> f64 {
	price - (price * discount) / 100.0
}
