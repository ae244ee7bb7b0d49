//! Catalog data file tool.
//!
//! Provides the `catalog` binary for inspecting the JSON file the server
//! persists to, without starting the server. Reads go through the same
//! [`JsonFileStore`] the server uses, but strictly: a file the server would
//! silently treat as empty is reported as an error here.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use catalog_core::{Product, ProductId};
use catalog_storage::{JsonFileStore, ProductStore};

/// Catalog data file tools.
#[derive(Parser)]
#[command(name = "catalog", about = "Inspect and check catalog data files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print every product as one JSON line, in stored order.
    List {
        /// Path to the catalog data file.
        #[arg(short, long, default_value = "products.json")]
        data: PathBuf,
    },

    /// Print one product.
    Show {
        /// Path to the catalog data file.
        #[arg(short, long, default_value = "products.json")]
        data: PathBuf,

        /// Product ID to show.
        #[arg(short, long)]
        id: u64,
    },

    /// Check the file for problems the server would hide.
    Check {
        /// Path to the catalog data file.
        #[arg(short, long, default_value = "products.json")]
        data: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::List { data } => run_list(&data),
        Commands::Show { data, id } => run_show(&data, ProductId(id)),
        Commands::Check { data } => run_check(&data),
    };

    process::exit(exit_code);
}

fn read(data: &Path) -> Result<Vec<Product>, i32> {
    JsonFileStore::new(data).read_all().map_err(|e| {
        eprintln!("error: {}", e);
        1
    })
}

fn run_list(data: &Path) -> i32 {
    let products = match read(data) {
        Ok(products) => products,
        Err(code) => return code,
    };
    for product in &products {
        match serde_json::to_string(product) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("error: {}", e);
                return 1;
            }
        }
    }
    0
}

fn run_show(data: &Path, id: ProductId) -> i32 {
    let products = match read(data) {
        Ok(products) => products,
        Err(code) => return code,
    };
    let Some(product) = products.iter().find(|p| p.id == id) else {
        eprintln!("product {} not found in {}", id, data.display());
        return 1;
    };
    match serde_json::to_string_pretty(product) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

fn run_check(data: &Path) -> i32 {
    let products = match read(data) {
        Ok(products) => products,
        Err(code) => return code,
    };

    let problems = find_problems(&products);
    for problem in &problems {
        println!("{}", problem);
    }
    println!(
        "{}: {} product(s), {} problem(s)",
        data.display(),
        products.len(),
        problems.len()
    );

    if problems.is_empty() {
        0
    } else {
        1
    }
}

fn find_problems(products: &[Product]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    for (index, product) in products.iter().enumerate() {
        if !seen.insert(product.id) {
            problems.push(format!(
                "record {}: duplicate id {} (dropped on load)",
                index, product.id
            ));
        }
        if product.name.trim().is_empty() {
            problems.push(format!("record {}: id {} has a blank name", index, product.id));
        }
        if !product.price.is_finite() {
            problems.push(format!("record {}: id {} has a non-finite price", index, product.id));
        }
    }
    problems
}
