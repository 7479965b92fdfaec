//! # metro
//!
//! Subway Builder save editor library - container parsing and money editing.
//!
//! This library provides functionality to:
//! - Parse and rebuild `.metro` save containers (binary header + gzip JSON blob)
//! - Decode the embedded JSON save document
//! - Modify the money fields and re-encode deterministically
//! - Manage the one-time backup of an original save
//!
//! ## Example
//!
//! ```no_run
//! use std::fs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = fs::read("save.metro")?;
//!
//! // Parse the container and decode the save document
//! let mut container = metro::SaveContainer::parse(&raw)?;
//! let json = container.decompress_blob()?;
//! let mut doc = metro::SaveDocument::from_json(&json)?;
//!
//! println!("money: {:?}", doc.data_money());
//! doc.set_money(250_000.0)?;
//!
//! // Recompress and patch the header's size/checksum fields
//! let blob = metro::container::compress(&doc.to_json()?, metro::container::DEFAULT_LEVEL)?;
//! container.replace_blob(blob);
//! fs::write("save_modified.metro", container.to_bytes())?;
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod container;
pub mod document;

// Re-export commonly used items
#[doc(inline)]
pub use backup::{write_backup_once, BackupError};
#[doc(inline)]
pub use container::{checksum, compress, decompress, ContainerError, SaveContainer};
#[doc(inline)]
pub use document::{parse_money_input, DocumentError, SaveDocument, ValueParseError};
