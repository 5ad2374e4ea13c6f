//! Runtime schema model.
//!
//! `field` is what the derive emits for a record type, verbatim and unparsed.
//! `column`, `index` and `table` are what the registry builds from it: the
//! parsed, immutable per-type mapping every statement and scan works from.
//!
//! In general:
//! - the derive declares *what fields exist*
//! - the registry decides *what gets mapped*
pub mod column;
pub mod field;
pub mod index;
pub mod table;

pub use column::ColumnDef;
pub use field::FieldModel;
pub use index::{IndexDef, IndexKind};
pub use table::TableInfo;
