//! Missing-field defaults
//!
//! The supported payload shapes are inconsistent about which fields they
//! carry, so the normalizers fall back to a single documented table rather
//! than inline ad hoc fallbacks. Field -> default:
//!
//! | field            | default                     |
//! |------------------|-----------------------------|
//! | `complexity`     | 1 (also applied to 0)       |
//! | `rank`           | A ("E" folds into F)        |
//! | `name`           | `"Function at line {n}"`    |
//! | `lineno`/`line`  | 0 (complexity), 1 (lint)    |
//! | `column`         | 0                           |
//! | `endLine`        | the item's `line`           |
//! | `endColumn`      | the item's `column`         |
//! | `message`        | `"Unknown error"`           |
//! | `symbol`/`ruleId`| `"unknown"`                 |
//! | `module`         | `"unknown"`                 |

use crate::models::Rank;

/// Complexity above this value flags a function as high-complexity.
pub const HIGH_COMPLEXITY_THRESHOLD: u32 = 5;

/// Minimum (and default) cyclomatic complexity for a qualifying entity.
pub const DEFAULT_COMPLEXITY: u32 = 1;

pub const DEFAULT_RANK: Rank = Rank::A;

/// Complexity items without a location report line 0.
pub const DEFAULT_METRIC_LINE: u32 = 0;

/// Diagnostics without a location report line 1, matching the tools' own
/// 1-based convention.
pub const DEFAULT_DIAGNOSTIC_LINE: u32 = 1;

pub const DEFAULT_COLUMN: u32 = 0;

pub const DEFAULT_MESSAGE: &str = "Unknown error";

/// Shared fallback for `symbol`, `ruleId`, and `module`.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Display name for an anonymous function, derived from its line.
pub fn placeholder_name(line: u32) -> String {
    format!("Function at line {line}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_name() {
        assert_eq!(placeholder_name(42), "Function at line 42");
    }
}
