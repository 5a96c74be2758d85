//! Grouping tags sort and color the alternatives offered to the user

use serde::Serialize;
use std::cmp::Ordering;

/// Presentation group of a leaf: lower priority is shown first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupingTag {
    pub tag: String,
    /// ARGB
    pub color: u32,
    pub priority: i32,
}

impl GroupingTag {
    pub const DEFAULT_NAME: &'static str = "no_tag";
    pub const DEFAULT_COLOR: u32 = 0xFFCC_CCCC;
    pub const DEFAULT_PRIORITY: i32 = 10;

    pub fn new(tag: impl Into<String>, color: u32, priority: i32) -> Self {
        GroupingTag {
            tag: tag.into(),
            color,
            priority,
        }
    }

    /// `#RRGGBB`, alpha dropped
    pub fn hex_color(&self) -> String {
        format!("#{:06X}", self.color & 0x00FF_FFFF)
    }
}

impl Default for GroupingTag {
    fn default() -> Self {
        GroupingTag::new(
            Self::DEFAULT_NAME,
            Self::DEFAULT_COLOR,
            Self::DEFAULT_PRIORITY,
        )
    }
}

impl Ord for GroupingTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.tag.cmp(&other.tag))
            .then_with(|| self.color.cmp(&other.color))
    }
}

impl PartialOrd for GroupingTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
