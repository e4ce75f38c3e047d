//! Storage port for catalog records.
//!
//! The store owns id assignment, timestamps and unique constraints
//! (category name, product code). A violated constraint is reported as
//! [`StoreError::DuplicateKey`] so callers can tell it apart from I/O
//! failures and decide whether to retry.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::model::{Category, Product, ProductDraft, RecordId};
use super::validation::{NewCategory, ProductUpdate};

/// Unique field on categories
pub const CATEGORY_NAME_KEY: &str = "name";
/// Unique field on products
pub const PRODUCT_CODE_KEY: &str = "productCode";

#[derive(Debug, Error)]
pub enum StoreError {
	/// A unique field already holds this value.
	#[error("duplicate value for unique field {field}")]
	DuplicateKey { field: &'static str },
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("serde error: {0}")]
	Serde(#[from] serde_json::Error),
}

/// Product listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
	pub category: Option<RecordId>,
	/// Pattern searched for anywhere in the product name
	pub search: Option<Regex>,
}

impl ProductFilter {
	/// Compile a client search key into a case-insensitive name pattern.
	pub fn search_pattern(key: &str) -> Result<Regex, regex::Error> {
		RegexBuilder::new(key).case_insensitive(true).build()
	}

	pub fn matches(&self, product: &Product) -> bool {
		if self.category.is_some_and(|id| id != product.category) {
			return false;
		}
		self.search
			.as_ref()
			.map_or(true, |search| search.is_match(&product.name))
	}
}

pub trait CatalogStore {
	/// Insert a category. Fails with `DuplicateKey { field: "name" }` if the name is taken.
	fn insert_category(&mut self, new: NewCategory) -> Result<Category, StoreError>;
	fn categories(&self) -> Result<Vec<Category>, StoreError>;
	fn category(&self, id: RecordId) -> Result<Option<Category>, StoreError>;
	/// Insert a product. Fails with `DuplicateKey { field: "productCode" }` if the code is taken.
	fn insert_product(&mut self, draft: ProductDraft) -> Result<Product, StoreError>;
	fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;
	/// Apply `update` and return the new record, or `None` if `id` is unknown.
	fn update_product(
		&mut self,
		id: RecordId,
		update: ProductUpdate,
	) -> Result<Option<Product>, StoreError>;
}

/// In-memory store. Also the on-disk layout of [`FileStore`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStore {
	next_id: RecordId,
	categories: Vec<Category>,
	products: Vec<Product>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn next_id(&mut self) -> RecordId {
		self.next_id += 1;
		self.next_id
	}
}

impl CatalogStore for MemoryStore {
	fn insert_category(&mut self, new: NewCategory) -> Result<Category, StoreError> {
		if self.categories.iter().any(|c| c.name == new.name) {
			return Err(StoreError::DuplicateKey {
				field: CATEGORY_NAME_KEY,
			});
		}

		let now = Utc::now();
		let category = Category {
			id: self.next_id(),
			name: new.name,
			description: new.description,
			created_at: now,
			updated_at: now,
		};
		self.categories.push(category.clone());
		Ok(category)
	}

	fn categories(&self) -> Result<Vec<Category>, StoreError> {
		Ok(self.categories.clone())
	}

	fn category(&self, id: RecordId) -> Result<Option<Category>, StoreError> {
		Ok(self.categories.iter().find(|c| c.id == id).cloned())
	}

	fn insert_product(&mut self, draft: ProductDraft) -> Result<Product, StoreError> {
		if self
			.products
			.iter()
			.any(|p| p.product_code == draft.product_code)
		{
			return Err(StoreError::DuplicateKey {
				field: PRODUCT_CODE_KEY,
			});
		}

		let now = Utc::now();
		let product = Product {
			id: self.next_id(),
			name: draft.name,
			description: draft.description,
			price: draft.price,
			discount: draft.discount,
			image_url: draft.image_url,
			status: draft.status,
			product_code: draft.product_code,
			category: draft.category,
			created_at: now,
			updated_at: now,
		};
		self.products.push(product.clone());
		Ok(product)
	}

	fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
		Ok(self
			.products
			.iter()
			.filter(|p| filter.matches(p))
			.cloned()
			.collect())
	}

	fn update_product(
		&mut self,
		id: RecordId,
		update: ProductUpdate,
	) -> Result<Option<Product>, StoreError> {
		let Some(product) = self.products.iter_mut().find(|p| p.id == id) else {
			return Ok(None);
		};

		if let Some(description) = update.description {
			product.description = description;
		}
		if let Some(discount) = update.discount {
			product.discount = discount;
		}
		if let Some(status) = update.status {
			product.status = status;
		}
		product.updated_at = Utc::now();

		Ok(Some(product.clone()))
	}
}

/// JSON-file backed store. Loaded on open, rewritten after every change.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: MemoryStore,
}

impl FileStore {
	/// Open `path`, starting empty if it does not exist yet.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();
		let inner = if path.exists() {
			let content = fs::read_to_string(&path)?;
			debug!("Loaded catalog from {}", path.display());
			serde_json::from_str(&content)?
		} else {
			debug!("No catalog at {}, starting empty", path.display());
			MemoryStore::new()
		};

		Ok(Self { path, inner })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn save(&self, snapshot: &MemoryStore) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent)?;
			}
		}
		let content = serde_json::to_string_pretty(snapshot)?;
		fs::write(&self.path, content)?;
		debug!("Wrote catalog to {}", self.path.display());
		Ok(())
	}

	/// Apply `change` to a copy of the records and keep it only once it is on disk.
	fn commit<T>(
		&mut self,
		change: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>,
	) -> Result<T, StoreError> {
		let mut next = self.inner.clone();
		let value = change(&mut next)?;
		self.save(&next)?;
		self.inner = next;
		Ok(value)
	}
}

impl CatalogStore for FileStore {
	fn insert_category(&mut self, new: NewCategory) -> Result<Category, StoreError> {
		self.commit(|store| store.insert_category(new))
	}

	fn categories(&self) -> Result<Vec<Category>, StoreError> {
		self.inner.categories()
	}

	fn category(&self, id: RecordId) -> Result<Option<Category>, StoreError> {
		self.inner.category(id)
	}

	fn insert_product(&mut self, draft: ProductDraft) -> Result<Product, StoreError> {
		self.commit(|store| store.insert_product(draft))
	}

	fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
		self.inner.products(filter)
	}

	fn update_product(
		&mut self,
		id: RecordId,
		update: ProductUpdate,
	) -> Result<Option<Product>, StoreError> {
		if self.inner.products.iter().all(|p| p.id != id) {
			return Ok(None);
		}
		self.commit(|store| store.update_product(id, update))
	}
}
