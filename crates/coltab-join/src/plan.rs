//! Validated inputs shared by both strategies.

use coltab_types::Table;

use crate::join_type::JoinType;
use crate::key::JoinKey;

/// Everything a strategy needs besides the result schema.
#[derive(Debug, Clone, Copy)]
pub struct JoinPlan<'a> {
    pub left: &'a Table,
    pub right: &'a Table,
    pub key: &'a JoinKey,
    pub join_type: JoinType,
    pub keep_all_join_key_columns: bool,
    pub missing_keys_match: bool,
}
