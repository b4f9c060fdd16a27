//! # photo-dedup CLI
//!
//! Command-line interface for the scan and deduplication engine.
//!
//! ## Usage
//! ```bash
//! photo-dedup scan ~/Photos
//! photo-dedup scan ~/Photos ~/Dropbox/Camera\ Uploads --verbose --output json
//! ```

use photo_dedup_core::cli;
use photo_dedup_core::Result;

fn main() -> Result<()> {
    cli::run()
}
