//! Request payload validation.
//!
//! Payloads arrive as untyped JSON. Each parser checks every field and
//! reports all failures at once rather than stopping at the first.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::model::ProductStatus;

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
	pub field: &'static str,
	pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summarize(.issues))]
pub struct ValidationError {
	pub issues: Vec<FieldIssue>,
}

impl ValidationError {
	/// Whether `field` has at least one issue.
	pub fn has_issue(&self, field: &str) -> bool {
		self.issues.iter().any(|i| i.field == field)
	}
}

fn summarize(issues: &[FieldIssue]) -> String {
	issues
		.iter()
		.map(|i| format!("{}: {}", i.field, i.message))
		.collect::<Vec<_>>()
		.join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
	pub name: String,
	pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
	pub name: String,
	pub description: String,
	pub price: f64,
	pub discount: f64,
	pub image_url: String,
	pub status: ProductStatus,
	/// Category id as sent by the client
	pub category: String,
}

/// Partial update. Only these fields may change after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
	pub description: Option<String>,
	pub discount: Option<f64>,
	pub status: Option<ProductStatus>,
}

impl ProductUpdate {
	pub fn is_empty(&self) -> bool {
		self.description.is_none() && self.discount.is_none() && self.status.is_none()
	}
}

impl NewCategory {
	pub fn parse(body: &Value) -> Result<Self, ValidationError> {
		let mut check = Checker::new(body)?;

		let name = check.string("name", Some("Category name is required"));
		if let Some(name) = &name {
			check.length("name", name, 2, 100, "Category name");
		}

		let description = check.string("description", None);
		if let Some(description) = &description {
			check.max_length("description", description, 500, "Description");
		}

		check.finish()?;
		Ok(Self {
			name: name.unwrap_or_default(),
			description,
		})
	}
}

impl NewProduct {
	pub fn parse(body: &Value) -> Result<Self, ValidationError> {
		let mut check = Checker::new(body)?;

		let name = check.string("name", Some("Product name is required"));
		if let Some(name) = &name {
			check.length("name", name, 2, 100, "Name");
		}

		let description = check.string("description", Some("Description is required"));
		if let Some(description) = &description {
			check.length("description", description, 10, 1000, "Description");
		}

		let price = check.number("price", Some("Price is required"));
		if let Some(price) = price {
			if price <= 0.0 {
				check.issue("price", "Price must be a positive number");
			}
		}

		let discount = check.number("discount", None);
		if let Some(discount) = discount {
			check.discount_range(discount);
		}

		let image_url = check.string("imageUrl", Some("Image URL is required"));
		if let Some(url) = &image_url {
			if !is_valid_url(url) {
				check.issue("imageUrl", "Must be a valid image URL");
			}
		}

		let status = check.status();

		let category = check.string("category", Some("Category ID is required"));
		if let Some(category) = &category {
			if category.is_empty() {
				check.issue("category", "Category ID must be a non-empty string");
			}
		}

		check.finish()?;
		Ok(Self {
			name: name.unwrap_or_default(),
			description: description.unwrap_or_default(),
			price: price.unwrap_or_default(),
			discount: discount.unwrap_or(0.0),
			image_url: image_url.unwrap_or_default(),
			status: status.unwrap_or_default(),
			category: category.unwrap_or_default(),
		})
	}
}

impl ProductUpdate {
	pub fn parse(body: &Value) -> Result<Self, ValidationError> {
		let mut check = Checker::new(body)?;

		let description = check.string("description", None);
		if let Some(description) = &description {
			check.length("description", description, 10, 1000, "Description");
		}

		let discount = check.number("discount", None);
		if let Some(discount) = discount {
			check.discount_range(discount);
		}

		let status = check.status();

		check.finish()?;
		Ok(Self {
			description,
			discount,
			status,
		})
	}
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn is_valid_url(raw: &str) -> bool {
	match Url::parse(raw) {
		Ok(url) => {
			matches!(url.scheme(), "http" | "https")
				&& url.host_str().is_some_and(|host| !host.is_empty())
		}
		Err(_) => false,
	}
}

/// Collects issues while pulling typed fields out of a JSON object.
struct Checker<'a> {
	body: &'a Map<String, Value>,
	issues: Vec<FieldIssue>,
}

impl<'a> Checker<'a> {
	fn new(body: &'a Value) -> Result<Self, ValidationError> {
		match body.as_object() {
			Some(body) => Ok(Self {
				body,
				issues: Vec::new(),
			}),
			None => Err(ValidationError {
				issues: vec![FieldIssue {
					field: "body",
					message: "Expected a JSON object".to_string(),
				}],
			}),
		}
	}

	fn issue(&mut self, field: &'static str, message: impl Into<String>) {
		self.issues.push(FieldIssue {
			field,
			message: message.into(),
		});
	}

	/// Missing or `null` counts as absent. `required` is the message used
	/// both when a required field is absent and when it has the wrong type.
	fn string(&mut self, field: &'static str, required: Option<&str>) -> Option<String> {
		let body = self.body;
		match body.get(field) {
			None | Some(Value::Null) => {
				if let Some(message) = required {
					self.issue(field, message);
				}
				None
			}
			Some(Value::String(s)) => Some(s.clone()),
			Some(_) => {
				self.issue(field, required.unwrap_or("Expected a string"));
				None
			}
		}
	}

	fn number(&mut self, field: &'static str, required: Option<&str>) -> Option<f64> {
		let body = self.body;
		match body.get(field) {
			None | Some(Value::Null) => {
				if let Some(message) = required {
					self.issue(field, message);
				}
				None
			}
			Some(Value::Number(n)) => n.as_f64(),
			Some(_) => {
				self.issue(field, required.unwrap_or("Expected a number"));
				None
			}
		}
	}

	fn status(&mut self) -> Option<ProductStatus> {
		let raw = self.string("status", None)?;
		match raw.parse() {
			Ok(status) => Some(status),
			Err(message) => {
				self.issue("status", message);
				None
			}
		}
	}

	fn length(&mut self, field: &'static str, value: &str, min: usize, max: usize, label: &str) {
		let len = value.chars().count();
		if len < min {
			self.issue(field, format!("{label} must be at least {min} characters"));
		}
		self.max_length(field, value, max, label);
	}

	fn max_length(&mut self, field: &'static str, value: &str, max: usize, label: &str) {
		if value.chars().count() > max {
			self.issue(field, format!("{label} must be less than {max} characters"));
		}
	}

	fn discount_range(&mut self, discount: f64) {
		if discount < 0.0 {
			self.issue("discount", "Discount must be at least 0%");
		} else if discount > 100.0 {
			self.issue("discount", "Discount cannot exceed 100%");
		}
	}

	fn finish(self) -> Result<(), ValidationError> {
		if self.issues.is_empty() {
			Ok(())
		} else {
			Err(ValidationError {
				issues: self.issues,
			})
		}
	}
}
