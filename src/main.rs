//! Product Code CLI
//!
//! Generates product codes and manages a JSON-file catalog of categories
//! and products.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use product_code::catalog::{import_dir, CatalogService, FileStore, ProductQuery};
use product_code::{CodeGenerator, Config, FixedClock, SystemClock};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "product-code")]
#[command(author = "Fellow <engineering@fellow.app>")]
#[command(version)]
#[command(about = "Generate product codes and manage the product catalog", long_about = None)]
struct Args {
	#[command(subcommand)]
	command: Command,

	/// Path to the catalog file [env: PRODUCT_CODE_CATALOG] [default: catalog.json]
	#[arg(long, global = true, value_name = "PATH")]
	catalog: Option<PathBuf>,

	/// Attempts at a unique product code before giving up [env: PRODUCT_CODE_MAX_ATTEMPTS] [default: 5]
	#[arg(long, global = true)]
	max_attempts: Option<usize>,

	/// Print debug logs to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Generate codes for one or more product names
	Generate {
		#[arg(required = true, value_name = "NAME")]
		names: Vec<String>,

		/// Use a fixed salt (milliseconds) instead of the current time
		#[arg(long)]
		salt: Option<i64>,

		/// Show the normalized name, runs and hash behind each code
		#[arg(long)]
		explain: bool,
	},

	/// Generate codes for every non-empty line of a file ("-" for stdin)
	Batch {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},

	/// Manage categories
	#[command(subcommand)]
	Category(CategoryCommand),

	/// Manage products
	#[command(subcommand)]
	Product(ProductCommand),

	/// Import *.category.json and *.product.json files from a directory
	Import {
		#[arg(value_name = "DIR")]
		dir: PathBuf,
	},
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
	/// Create a category
	Add {
		#[arg(long)]
		name: String,

		#[arg(long)]
		description: Option<String>,
	},

	/// List all categories
	List,
}

#[derive(Subcommand, Debug)]
enum ProductCommand {
	/// Create a product from a JSON payload file ("-" for stdin)
	Add {
		#[arg(value_name = "JSON_FILE")]
		payload: PathBuf,
	},

	/// List products with their final price
	List {
		/// Only products in this category id
		#[arg(long)]
		category: Option<String>,

		/// Case-insensitive regular expression matched against the product name
		#[arg(long)]
		search: Option<String>,
	},

	/// Update description, discount or status from a JSON payload file
	Update {
		id: String,

		#[arg(value_name = "JSON_FILE")]
		payload: PathBuf,
	},
}

fn main() -> Result<()> {
	let args = Args::parse();

	let default_level = if args.verbose { "debug" } else { "warn" };
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_writer(io::stderr)
		.init();

	let mut config = Config::from_env()?;
	if let Some(path) = args.catalog {
		config.catalog_path = path;
	}
	if let Some(attempts) = args.max_attempts {
		if attempts == 0 {
			bail!("--max-attempts must be at least 1");
		}
		config.max_code_attempts = attempts;
	}
	debug!(?config, "Resolved configuration");

	match args.command {
		Command::Generate {
			names,
			salt,
			explain,
		} => generate(&names, salt, explain),
		Command::Batch { file } => batch(&file),
		Command::Category(command) => category(&config, command),
		Command::Product(command) => product(&config, command),
		Command::Import { dir } => import(&config, &dir),
	}
}

fn generate(names: &[String], salt: Option<i64>, explain: bool) -> Result<()> {
	let generator = CodeGenerator::new(SystemClock);

	for name in names {
		let breakdown = match salt {
			Some(salt) => CodeGenerator::new(FixedClock(salt)).explain(name),
			None => generator.explain(name),
		};

		if !explain {
			println!("{}", breakdown.code);
			continue;
		}

		let runs: Vec<&str> = breakdown
			.runs
			.runs()
			.iter()
			.map(|r| r.text.as_str())
			.collect();
		println!("{}", breakdown.code);
		println!("  Name:       {name}");
		println!("  Normalized: {}", breakdown.normalized);
		println!("  Runs:       {}", runs.join(", "));
		println!(
			"  Indices:    {}..={}",
			breakdown.runs.first_index(),
			breakdown.runs.last_index()
		);
		println!("  Salt:       {}", breakdown.salt);
		println!("  Hash:       {}", breakdown.hash);
	}

	Ok(())
}

fn batch(file: &Path) -> Result<()> {
	let content = read_input(file)?;
	let names: Vec<&str> = content
		.lines()
		.map(str::trim)
		.filter(|l| !l.is_empty())
		.collect();

	let start_time = Instant::now();
	let codes = CodeGenerator::new(SystemClock).generate_all(&names);
	let elapsed = start_time.elapsed();

	for (name, code) in names.iter().zip(&codes) {
		println!("{code}\t{name}");
	}
	eprintln!(
		"Generated {} codes in {:.1}ms",
		codes.len(),
		elapsed.as_secs_f64() * 1000.0
	);

	Ok(())
}

fn category(config: &Config, command: CategoryCommand) -> Result<()> {
	let mut service = open_service(config)?;

	match command {
		CategoryCommand::Add { name, description } => {
			let body = json!({ "name": name, "description": description });
			let category = service.create_category(&body)?;
			print_json(&category)
		}
		CategoryCommand::List => print_json(&service.categories()?),
	}
}

fn product(config: &Config, command: ProductCommand) -> Result<()> {
	let mut service = open_service(config)?;

	match command {
		ProductCommand::Add { payload } => {
			let body = read_payload(&payload)?;
			let product = service.create_product(&body)?;
			print_json(&product)
		}
		ProductCommand::List { category, search } => {
			let query = ProductQuery {
				category_id: category,
				search_key: search,
			};
			print_json(&service.products(&query)?)
		}
		ProductCommand::Update { id, payload } => {
			let body = read_payload(&payload)?;
			let product = service.update_product(&id, &body)?;
			print_json(&product)
		}
	}
}

fn import(config: &Config, dir: &Path) -> Result<()> {
	if !dir.is_dir() {
		bail!("Import directory does not exist: {}", dir.display());
	}

	let mut service = open_service(config)?;
	let start_time = Instant::now();
	let report = import_dir(&mut service, dir)?;
	let time_str = format!("{:.2}s", start_time.elapsed().as_secs_f64());

	println!(
		"Imported {} categories and {} products into {} in {}",
		report.categories,
		report.products,
		config.catalog_path.display(),
		time_str
	);

	if !report.failures.is_empty() {
		eprintln!("\n{} files failed:", report.failures.len());
		for failure in &report.failures {
			eprintln!("  {}: {}", failure.path.display(), failure.error);
		}
		bail!("{} files could not be imported", report.failures.len());
	}

	Ok(())
}

fn open_service(config: &Config) -> Result<CatalogService<FileStore>> {
	let store = FileStore::open(&config.catalog_path)
		.with_context(|| format!("Failed to open catalog {}", config.catalog_path.display()))?;
	Ok(CatalogService::new(
		store,
		SystemClock,
		config.max_code_attempts,
	))
}

fn read_input(path: &Path) -> Result<String> {
	if path == Path::new("-") {
		return io::read_to_string(io::stdin()).context("Failed to read stdin");
	}
	fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_payload(path: &Path) -> Result<Value> {
	let content = read_input(path)?;
	serde_json::from_str(&content)
		.with_context(|| format!("Failed to parse JSON payload {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
