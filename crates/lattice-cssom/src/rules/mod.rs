//! Rules, rule lists and stylesheets.

mod declaration;
mod rule;
mod rule_list;
mod stylesheet;

pub use declaration::{Property, StyleDeclaration};
pub use rule::{
    CharsetRule, CssRule, FontFaceRule, ImportRule, MediaRule, PageRule, RuleId, RuleLinks,
    RuleType, StyleRule, UnknownRule,
};
pub use rule_list::RuleList;
pub use stylesheet::{NodeHandle, StyleSheet, StyleSheetId};
