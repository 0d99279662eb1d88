//! Column and table model for coltab.
//!
//! Columns are typed, nullable buffers grouped by [`Representation`]; a
//! [`Table`] is an ordered set of equal-length columns. [`Selection`] is the
//! bitmap row set used by indexes and join strategies.

pub mod column;
pub mod column_type;
pub mod ordering;
pub mod packed;
pub mod selection;
pub mod table;
pub mod value;

pub use column::{Column, ColumnData};
pub use column_type::{ColumnType, Representation};
pub use selection::{Selection, SelectionIter};
pub use table::Table;
pub use value::Value;
