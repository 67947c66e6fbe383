//! swmsgen-ooxml - WordprocessingML document builder
//!
//! Reads a .docx template as a zip part map, mutates the XML parts by
//! byte-span splicing, and writes the package back out. The mutations
//! cover task table rows (cloned template rows or synthesized from task
//! records), list numbering allocation, HRCW checkbox ticking, the
//! consolidated-table bullet conversion, and the document-wide
//! formatting passes.
//!
//! No XML tree is ever built. Every part stays a string; a streaming
//! `quick_xml` pass locates byte spans and edits are spliced in place.
//! That keeps untouched markup byte-identical, which Word is far more
//! forgiving of than a rewrite of the whole tree.

pub mod archive;
pub mod assemble;
pub mod bulletize;
pub mod error;
pub mod format;
pub mod numbering;
pub mod rowbuild;
pub mod runfmt;
pub mod scan;
pub mod table;

pub use archive::{DocxArchive, DOCUMENT_PART, NUMBERING_PART};
pub use assemble::{build_document, BuildReport};
pub use bulletize::{bulletize, bulletize_at, BulletizeReport};
pub use error::{DocxError, Result};
pub use numbering::{NumberingPair, NumberingPart};
pub use rowbuild::{control_summary, CCVS_MARKER};
pub use table::{CellText, DocumentXml};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
