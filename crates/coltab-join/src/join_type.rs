//! Join variants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which unmatched rows survive a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinType {
    /// Only matching pairs.
    #[default]
    Inner,
    /// Every left row; right columns missing on a miss.
    LeftOuter,
    /// Every right row; left columns missing on a miss.
    RightOuter,
    /// Every row from both sides.
    FullOuter,
}

impl JoinType {
    /// Every join type, in declaration order.
    pub const ALL: [Self; 4] = [Self::Inner, Self::LeftOuter, Self::RightOuter, Self::FullOuter];

    /// Whether left rows without a match are emitted with right columns missing.
    #[must_use]
    pub const fn keeps_unmatched_left(self) -> bool {
        matches!(self, Self::LeftOuter | Self::FullOuter)
    }

    /// Whether right rows without a match are emitted with left columns missing.
    #[must_use]
    pub const fn keeps_unmatched_right(self) -> bool {
        matches!(self, Self::RightOuter | Self::FullOuter)
    }

    /// Whether the left side's key columns are the redundant copy.
    #[must_use]
    pub const fn suppresses_left_keys(self) -> bool {
        matches!(self, Self::RightOuter)
    }

    /// Stable label used in logs, metrics, and serialized options.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::LeftOuter => "LEFT_OUTER",
            Self::RightOuter => "RIGHT_OUTER",
            Self::FullOuter => "FULL_OUTER",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
