//! Category and product catalog.
//!
//! - `model`: stored records and the populated product view
//! - `validation`: JSON payload parsing with per-field issues
//! - `store`: storage port plus in-memory and JSON-file stores
//! - `service`: catalog operations, including product code assignment
//! - `import`: bulk import of payload files from a directory

pub mod import;
pub mod model;
pub mod service;
pub mod store;
pub mod validation;

pub use import::{import_dir, ImportFailure, ImportReport};
pub use model::{Category, CategoryRef, Product, ProductStatus, ProductView, RecordId};
pub use service::{CatalogError, CatalogService, ProductQuery};
pub use store::{CatalogStore, FileStore, MemoryStore, ProductFilter, StoreError};
pub use validation::{FieldIssue, NewCategory, NewProduct, ProductUpdate, ValidationError};
