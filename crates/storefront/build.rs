//! Build script for storefront crate.
//!
//! Hashes static assets so templates can append `?v={hash}` and browsers
//! refetch them only when their content changes.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// (file under `static/`, environment variable receiving its hash)
const ASSETS: &[(&str, &str)] = &[("css/main.css", "CSS_HASH"), ("js/carousel.js", "JS_HASH")];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");

    for (file, var) in ASSETS {
        let path = Path::new(&manifest_dir).join("static").join(file);
        println!("cargo:rerun-if-changed={}", path.display());
        println!("cargo:rustc-env={var}={}", short_hash(&path));
    }
}

/// First 8 hex chars of the file's SHA-256, or empty if it cannot be read.
fn short_hash(path: &Path) -> String {
    match fs::read(path) {
        Ok(content) => {
            let digest = format!("{:x}", Sha256::digest(&content));
            digest.chars().take(8).collect()
        }
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            String::new()
        }
    }
}
