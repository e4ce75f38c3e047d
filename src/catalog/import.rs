//! Bulk import of category and product payload files.
//!
//! Walks a directory for `*.category.json` and `*.product.json` files.
//! Categories are created first so products can refer to them by name as
//! well as by id.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::service::CatalogService;
use super::store::CatalogStore;
use crate::clock::Clock;

pub const CATEGORY_SUFFIX: &str = ".category.json";
pub const PRODUCT_SUFFIX: &str = ".product.json";

/// A file that could not be imported
#[derive(Debug, Clone)]
pub struct ImportFailure {
	pub path: PathBuf,
	pub error: String,
}

/// Outcome of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
	pub categories: usize,
	pub products: usize,
	pub failures: Vec<ImportFailure>,
}

/// Import every payload file under `dir`, in path order.
///
/// Individual file failures are collected in the report; only an
/// unreadable directory fails the whole import.
pub fn import_dir<S, C>(service: &mut CatalogService<S, C>, dir: &Path) -> Result<ImportReport>
where
	S: CatalogStore,
	C: Clock,
{
	let mut category_files = Vec::new();
	let mut product_files = Vec::new();

	for entry in WalkDir::new(dir).sort_by_file_name() {
		let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
		if !entry.file_type().is_file() {
			continue;
		}

		let path = entry.into_path();
		let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
		if name.ends_with(CATEGORY_SUFFIX) {
			category_files.push(path);
		} else if name.ends_with(PRODUCT_SUFFIX) {
			product_files.push(path);
		}
	}

	debug!(
		categories = category_files.len(),
		products = product_files.len(),
		"Found payload files in {}",
		dir.display()
	);

	let mut report = ImportReport::default();

	for path in category_files {
		match read_payload(&path).and_then(|body| Ok(service.create_category(&body)?)) {
			Ok(_) => report.categories += 1,
			Err(e) => report.fail(path, e),
		}
	}

	for path in product_files {
		let result = read_payload(&path).and_then(|mut body| {
			resolve_category_name(service, &mut body)?;
			Ok(service.create_product(&body)?)
		});
		match result {
			Ok(_) => report.products += 1,
			Err(e) => report.fail(path, e),
		}
	}

	Ok(report)
}

impl ImportReport {
	fn fail(&mut self, path: PathBuf, error: anyhow::Error) {
		warn!("Skipping {}: {:#}", path.display(), error);
		self.failures.push(ImportFailure {
			path,
			error: format!("{:#}", error),
		});
	}
}

fn read_payload(path: &Path) -> Result<Value> {
	let content =
		fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Replace a category name with its id when the payload names a known category.
fn resolve_category_name<S, C>(service: &CatalogService<S, C>, body: &mut Value) -> Result<()>
where
	S: CatalogStore,
	C: Clock,
{
	let Some(reference) = body.get("category").and_then(Value::as_str) else {
		return Ok(());
	};

	let categories = service.categories()?;
	if categories.iter().any(|c| c.id.to_string() == reference) {
		return Ok(());
	}
	if let Some(category) = categories.iter().find(|c| c.name == reference) {
		body["category"] = Value::String(category.id.to_string());
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::service::ProductQuery;
	use crate::catalog::store::MemoryStore;
	use crate::clock::FixedClock;
	use tempfile::tempdir;

	#[test]
	fn test_import_resolves_category_names() {
		let temp = tempdir().unwrap();
		fs::write(
			temp.path().join("drinks.category.json"),
			r#"{ "name": "Drinks" }"#,
		)
		.unwrap();
		fs::create_dir(temp.path().join("teas")).unwrap();
		fs::write(
			temp.path().join("teas").join("green.product.json"),
			r#"{
				"name": "Green Tea",
				"description": "Loose leaf green tea, 500g",
				"price": 12,
				"imageUrl": "https://example.com/tea.png",
				"category": "Drinks"
			}"#,
		)
		.unwrap();
		fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

		let mut service = CatalogService::new(MemoryStore::new(), FixedClock(0), 3);
		let report = import_dir(&mut service, temp.path()).unwrap();

		assert_eq!(report.categories, 1);
		assert_eq!(report.products, 1);
		assert!(report.failures.is_empty());

		let products = service.products(&ProductQuery::default()).unwrap();
		assert_eq!(
			products[0].category.as_ref().map(|c| c.name.as_str()),
			Some("Drinks")
		);
	}

	#[test]
	fn test_import_collects_failures() {
		let temp = tempdir().unwrap();
		fs::write(temp.path().join("bad.category.json"), "{ nope").unwrap();
		fs::write(
			temp.path().join("orphan.product.json"),
			r#"{
				"name": "Orphan",
				"description": "Product without a category",
				"price": 1,
				"imageUrl": "https://example.com/o.png",
				"category": "Nowhere"
			}"#,
		)
		.unwrap();

		let mut service = CatalogService::new(MemoryStore::new(), FixedClock(0), 3);
		let report = import_dir(&mut service, temp.path()).unwrap();

		assert_eq!(report.categories, 0);
		assert_eq!(report.products, 0);
		assert_eq!(report.failures.len(), 2);
		assert!(report.failures[0].error.contains("Failed to parse"));
		assert!(report.failures[1].error.contains("Category does not exist"));
	}

	#[test]
	fn test_import_missing_dir() {
		let temp = tempdir().unwrap();
		let mut service = CatalogService::new(MemoryStore::new(), FixedClock(0), 3);
		assert!(import_dir(&mut service, &temp.path().join("missing")).is_err());
	}
}
