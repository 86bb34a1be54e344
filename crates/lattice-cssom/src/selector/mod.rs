//! CSS selectors and the condition algebra they are built from.

mod condition;
mod types;

pub use condition::{Condition, ConditionKind, ConditionType};
pub use types::*;
