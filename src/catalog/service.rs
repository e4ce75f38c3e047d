//! Catalog operations: validate, resolve references, assign product codes.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::model::{Category, ProductDraft, ProductView, RecordId};
use super::store::{CatalogStore, ProductFilter, StoreError, CATEGORY_NAME_KEY, PRODUCT_CODE_KEY};
use super::validation::{FieldIssue, NewCategory, NewProduct, ProductUpdate, ValidationError};
use crate::clock::{Clock, SystemClock};
use crate::code::CodeGenerator;

#[derive(Debug, Error)]
pub enum CatalogError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error("Category does not exist")]
	CategoryNotFound,
	#[error("Category name already exists")]
	DuplicateCategory,
	#[error("Product not found")]
	ProductNotFound,
	#[error("Product code already exists after {attempts} attempts. Please try again.")]
	CodeCollision { attempts: usize },
	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Listing query as received from a client. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
	pub category_id: Option<String>,
	pub search_key: Option<String>,
}

/// Catalog service over a store, generating product codes from `C`.
pub struct CatalogService<S, C = SystemClock> {
	store: S,
	codes: CodeGenerator<C>,
	max_code_attempts: usize,
}

impl<S, C: Clock> CatalogService<S, C> {
	/// `max_code_attempts` is clamped to at least 1.
	pub fn new(store: S, clock: C, max_code_attempts: usize) -> Self {
		Self {
			store,
			codes: CodeGenerator::new(clock),
			max_code_attempts: max_code_attempts.max(1),
		}
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Consume the service and return the inner store.
	pub fn into_inner(self) -> S {
		self.store
	}
}

impl<S, C> CatalogService<S, C>
where
	S: CatalogStore,
	C: Clock,
{
	pub fn create_category(&mut self, body: &Value) -> Result<Category, CatalogError> {
		let new = NewCategory::parse(body)?;

		match self.store.insert_category(new) {
			Ok(category) => {
				info!(id = category.id, name = %category.name, "Created category");
				Ok(category)
			}
			Err(StoreError::DuplicateKey {
				field: CATEGORY_NAME_KEY,
			}) => Err(CatalogError::DuplicateCategory),
			Err(e) => Err(e.into()),
		}
	}

	pub fn categories(&self) -> Result<Vec<Category>, CatalogError> {
		Ok(self.store.categories()?)
	}

	/// Create a product with a freshly generated code.
	///
	/// A code already taken in the store is regenerated with the next salt,
	/// up to `max_code_attempts` times.
	pub fn create_product(&mut self, body: &Value) -> Result<ProductView, CatalogError> {
		let new = NewProduct::parse(body)?;
		let category = self.resolve_category(&new.category)?;

		let base_salt = self.codes.clock().now_millis();
		let mut draft = ProductDraft {
			product_code: self.codes.generate_with_salt(&new.name, base_salt),
			name: new.name,
			description: new.description,
			price: new.price,
			discount: new.discount,
			image_url: new.image_url,
			status: new.status,
			category: category.id,
		};

		for attempt in 1..=self.max_code_attempts {
			if attempt > 1 {
				let salt = base_salt.wrapping_add(attempt as i64 - 1);
				draft.product_code = self.codes.generate_with_salt(&draft.name, salt);
			}
			debug!(code = %draft.product_code, attempt, "Generated product code");

			match self.store.insert_product(draft.clone()) {
				Ok(product) => {
					info!(id = product.id, code = %product.product_code, "Created product");
					return Ok(ProductView::new(product, Some(&category)));
				}
				Err(StoreError::DuplicateKey {
					field: PRODUCT_CODE_KEY,
				}) => {
					warn!(code = %draft.product_code, attempt, "Product code already taken");
				}
				Err(e) => return Err(e.into()),
			}
		}

		Err(CatalogError::CodeCollision {
			attempts: self.max_code_attempts,
		})
	}

	pub fn products(&self, query: &ProductQuery) -> Result<Vec<ProductView>, CatalogError> {
		let mut filter = ProductFilter::default();

		if let Some(key) = non_empty(&query.search_key) {
			let pattern = ProductFilter::search_pattern(&key).map_err(|e| ValidationError {
				issues: vec![FieldIssue {
					field: "searchKey",
					message: format!("Invalid search pattern: {e}"),
				}],
			})?;
			filter.search = Some(pattern);
		}

		if let Some(category_id) = non_empty(&query.category_id) {
			match parse_id(&category_id) {
				Some(id) => filter.category = Some(id),
				// Nothing can reference an id that doesn't parse
				None => return Ok(Vec::new()),
			}
		}

		let categories: HashMap<RecordId, Category> = self
			.store
			.categories()?
			.into_iter()
			.map(|c| (c.id, c))
			.collect();

		Ok(self
			.store
			.products(&filter)?
			.into_iter()
			.map(|p| {
				let category = categories.get(&p.category);
				ProductView::new(p, category)
			})
			.collect())
	}

	pub fn update_product(&mut self, id: &str, body: &Value) -> Result<ProductView, CatalogError> {
		let update = ProductUpdate::parse(body)?;
		let id = parse_id(id).ok_or(CatalogError::ProductNotFound)?;

		let product = self
			.store
			.update_product(id, update)?
			.ok_or(CatalogError::ProductNotFound)?;
		info!(id = product.id, "Updated product");

		let category = self.store.category(product.category)?;
		Ok(ProductView::new(product, category.as_ref()))
	}

	fn resolve_category(&self, id: &str) -> Result<Category, CatalogError> {
		let id = parse_id(id).ok_or(CatalogError::CategoryNotFound)?;
		self.store
			.category(id)?
			.ok_or(CatalogError::CategoryNotFound)
	}
}

fn parse_id(raw: &str) -> Option<RecordId> {
	raw.trim().parse().ok()
}

fn non_empty(value: &Option<String>) -> Option<String> {
	value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::model::{Product, ProductStatus};
	use crate::catalog::store::MemoryStore;
	use crate::clock::FixedClock;
	use crate::code::ProductCode;
	use serde_json::json;

	const NOW: i64 = 1_700_000_000_000;

	fn service() -> CatalogService<MemoryStore, FixedClock> {
		CatalogService::new(MemoryStore::new(), FixedClock(NOW), 3)
	}

	fn tea(category: RecordId) -> Value {
		json!({
			"name": "Green Tea",
			"description": "Loose leaf green tea, 500g",
			"price": 20,
			"discount": 10,
			"imageUrl": "https://example.com/tea.png",
			"category": category.to_string()
		})
	}

	fn with_drinks() -> (CatalogService<MemoryStore, FixedClock>, RecordId) {
		let mut service = service();
		let drinks = service
			.create_category(&json!({ "name": "Drinks" }))
			.unwrap();
		(service, drinks.id)
	}

	/// Store whose product inserts report a taken code a fixed number of times.
	struct CollidingStore {
		inner: MemoryStore,
		collisions_left: usize,
		seen_codes: Vec<ProductCode>,
	}

	impl CatalogStore for CollidingStore {
		fn insert_category(&mut self, new: NewCategory) -> Result<Category, StoreError> {
			self.inner.insert_category(new)
		}

		fn categories(&self) -> Result<Vec<Category>, StoreError> {
			self.inner.categories()
		}

		fn category(&self, id: RecordId) -> Result<Option<Category>, StoreError> {
			self.inner.category(id)
		}

		fn insert_product(
			&mut self,
			draft: ProductDraft,
		) -> Result<Product, StoreError> {
			self.seen_codes.push(draft.product_code.clone());
			if self.collisions_left > 0 {
				self.collisions_left -= 1;
				return Err(StoreError::DuplicateKey {
					field: PRODUCT_CODE_KEY,
				});
			}
			self.inner.insert_product(draft)
		}

		fn products(
			&self,
			filter: &ProductFilter,
		) -> Result<Vec<Product>, StoreError> {
			self.inner.products(filter)
		}

		fn update_product(
			&mut self,
			id: RecordId,
			update: ProductUpdate,
		) -> Result<Option<Product>, StoreError> {
			self.inner.update_product(id, update)
		}
	}

	fn colliding(collisions: usize) -> (CatalogService<CollidingStore, FixedClock>, RecordId) {
		let store = CollidingStore {
			inner: MemoryStore::new(),
			collisions_left: collisions,
			seen_codes: Vec::new(),
		};
		let mut service = CatalogService::new(store, FixedClock(NOW), 3);
		let drinks = service
			.create_category(&json!({ "name": "Drinks" }))
			.unwrap();
		(service, drinks.id)
	}

	#[test]
	fn test_create_product() {
		let (mut service, drinks) = with_drinks();
		let view = service.create_product(&tea(drinks)).unwrap();

		assert_eq!(view.final_price, 18.0);
		assert_eq!(view.status, ProductStatus::InStock);
		assert_eq!(view.category.as_ref().map(|c| c.name.as_str()), Some("Drinks"));
		assert!(ProductCode::is_well_formed(view.product_code.as_str()));
		assert_eq!(
			view.product_code,
			CodeGenerator::new(FixedClock(NOW)).generate("Green Tea")
		);
	}

	#[test]
	fn test_create_product_unknown_category() {
		let (mut service, drinks) = with_drinks();
		let err = service.create_product(&tea(drinks + 100)).unwrap_err();
		assert!(matches!(err, CatalogError::CategoryNotFound));

		let mut body = tea(drinks);
		body["category"] = json!("not-an-id");
		let err = service.create_product(&body).unwrap_err();
		assert!(matches!(err, CatalogError::CategoryNotFound));
	}

	#[test]
	fn test_create_product_invalid_payload() {
		let (mut service, drinks) = with_drinks();
		let mut body = tea(drinks);
		body["name"] = Value::Null;

		match service.create_product(&body) {
			Err(CatalogError::Validation(err)) => assert!(err.has_issue("name")),
			other => panic!("expected validation error, got {other:?}"),
		}
	}

	#[test]
	fn test_same_name_same_instant_retries_with_new_salt() {
		// Fixed clock: the second product first gets the same code as the first
		let (mut service, drinks) = with_drinks();
		let first = service.create_product(&tea(drinks)).unwrap();
		let second = service.create_product(&tea(drinks)).unwrap();

		assert_ne!(first.product_code, second.product_code);
		assert_eq!(
			second.product_code,
			CodeGenerator::new(FixedClock(NOW)).generate_with_salt("Green Tea", NOW + 1)
		);
	}

	#[test]
	fn test_retry_uses_fresh_salt_each_attempt() {
		let (mut service, drinks) = colliding(2);
		let view = service.create_product(&tea(drinks)).unwrap();

		let seen = &service.store().seen_codes;
		assert_eq!(seen.len(), 3);
		assert_ne!(seen[0], seen[1]);
		assert_ne!(seen[1], seen[2]);
		assert_eq!(seen[2], view.product_code);
	}

	#[test]
	fn test_retry_is_bounded() {
		let (mut service, drinks) = colliding(10);
		let err = service.create_product(&tea(drinks)).unwrap_err();

		assert!(matches!(err, CatalogError::CodeCollision { attempts: 3 }));
		assert_eq!(service.store().seen_codes.len(), 3);
	}

	#[test]
	fn test_retry_salt_wraps_at_clock_limit() {
		let store = CollidingStore {
			inner: MemoryStore::new(),
			collisions_left: 2,
			seen_codes: Vec::new(),
		};
		let mut service = CatalogService::new(store, FixedClock(i64::MAX), 3);
		let drinks = service
			.create_category(&json!({ "name": "Drinks" }))
			.unwrap();

		let view = service.create_product(&tea(drinks.id)).unwrap();
		assert_eq!(
			view.product_code,
			CodeGenerator::new(FixedClock(0)).generate_with_salt("Green Tea", i64::MIN + 1)
		);
	}

	#[test]
	fn test_duplicate_category() {
		let (mut service, _) = with_drinks();
		let err = service
			.create_category(&json!({ "name": "Drinks" }))
			.unwrap_err();
		assert!(matches!(err, CatalogError::DuplicateCategory));
	}

	#[test]
	fn test_products_query() {
		let (mut service, drinks) = with_drinks();
		let snacks = service
			.create_category(&json!({ "name": "Snacks" }))
			.unwrap()
			.id;
		service.create_product(&tea(drinks)).unwrap();
		let mut chips = tea(snacks);
		chips["name"] = json!("Salted Chips");
		service.create_product(&chips).unwrap();

		let all = service.products(&ProductQuery::default()).unwrap();
		assert_eq!(all.len(), 2);

		let empty_filters = ProductQuery {
			category_id: Some(String::new()),
			search_key: Some(String::new()),
		};
		assert_eq!(service.products(&empty_filters).unwrap().len(), 2);

		let snacks_only = service
			.products(&ProductQuery {
				category_id: Some(snacks.to_string()),
				search_key: None,
			})
			.unwrap();
		assert_eq!(snacks_only.len(), 1);
		assert_eq!(
			snacks_only[0].category.as_ref().map(|c| c.name.as_str()),
			Some("Snacks")
		);

		let search = service
			.products(&ProductQuery {
				category_id: None,
				search_key: Some("tea".to_string()),
			})
			.unwrap();
		assert_eq!(search.len(), 1);
		assert_eq!(search[0].name, "Green Tea");

		let anchored = service
			.products(&ProductQuery {
				category_id: None,
				search_key: Some("^salted\\s".to_string()),
			})
			.unwrap();
		assert_eq!(anchored.len(), 1);
		assert_eq!(anchored[0].name, "Salted Chips");

		match service.products(&ProductQuery {
			category_id: None,
			search_key: Some("[tea".to_string()),
		}) {
			Err(CatalogError::Validation(err)) => assert!(err.has_issue("searchKey")),
			other => panic!("expected validation error, got {other:?}"),
		}

		let bad_id = service
			.products(&ProductQuery {
				category_id: Some("abc".to_string()),
				search_key: None,
			})
			.unwrap();
		assert!(bad_id.is_empty());
	}

	#[test]
	fn test_update_product() {
		let (mut service, drinks) = with_drinks();
		let created = service.create_product(&tea(drinks)).unwrap();

		let updated = service
			.update_product(
				&created.id.to_string(),
				&json!({ "discount": 50, "status": "Stock Out" }),
			)
			.unwrap();
		assert_eq!(updated.final_price, 10.0);
		assert_eq!(updated.status, ProductStatus::StockOut);
		assert_eq!(updated.product_code, created.product_code);

		let err = service
			.update_product("999", &json!({ "discount": 5 }))
			.unwrap_err();
		assert!(matches!(err, CatalogError::ProductNotFound));

		let err = service
			.update_product(&created.id.to_string(), &json!({ "discount": 500 }))
			.unwrap_err();
		assert!(matches!(err, CatalogError::Validation(_)));
	}
}
