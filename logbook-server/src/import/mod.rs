//! Bulk import of pasted logbook rows.
//!
//! The free-text tokenizer lives outside this crate. It hands over rows of
//! string tokens; this module resolves their times, builds drafts and
//! validates them, skipping bad rows individually.

mod extractor;
mod row;

pub use extractor::{ExtractedTime, LogImportTimeExtractor, parse_import_token};
pub use row::{
    ColumnMapping, ImportReport, ImportRow, ImportRowError, ImportedLeg, RowFailure, import_row,
    import_rows, parse_import_date, row_to_draft,
};
