//! Aging classification: threshold tables and severity categories.
//!
//! The two tables below are the only definition of the bucket boundaries; the
//! terminal renderer, the legend, and the spreadsheet exporter all read them.

use serde::{Deserialize, Serialize};

/// Ordinal severity bucket assigned to an aging metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Delivery aged within the expected window.
    OnTrack,
    /// Delivery aged past the expected window.
    Warning,
    /// Delivery considerably overdue.
    Late,
    /// Status changed within the last week.
    Fresh,
    /// Status changed 8 to 14 days ago.
    Recent,
    /// Status changed 15 to 21 days ago.
    Aging,
    /// Status changed 22 to 30 days ago.
    Stale,
    /// Status changed 31 to 45 days ago.
    Overdue,
    /// Status untouched for more than 45 days.
    Critical,
    /// Source date lies after the reference day.
    FutureDate,
    /// Source date blank or unparseable.
    Missing,
}

impl Category {
    /// Traffic-light glyph shown in the interactive table.
    pub fn glyph(self) -> &'static str {
        match self {
            Category::OnTrack | Category::Fresh => "🟢",
            Category::Recent => "🔵",
            Category::Aging => "🟡",
            Category::Warning | Category::Stale => "🟠",
            Category::Late | Category::Overdue => "🔴",
            Category::Critical => "⚫",
            Category::FutureDate => "📅",
            Category::Missing => "⚪",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Category::OnTrack => "on track",
            Category::Warning => "warning",
            Category::Late => "late",
            Category::Fresh => "fresh",
            Category::Recent => "recent",
            Category::Aging => "aging",
            Category::Stale => "stale",
            Category::Overdue => "overdue",
            Category::Critical => "critical",
            Category::FutureDate => "future date",
            Category::Missing => "missing",
        }
    }

    /// RGB background used for exported cells.
    pub fn fill_color(self) -> u32 {
        match self {
            Category::OnTrack | Category::Fresh => 0x63BE7B,
            Category::Recent => 0x5B9BD5,
            Category::Aging => 0xFFEB84,
            Category::Warning | Category::Stale => 0xF4B183,
            Category::Late | Category::Overdue => 0xF8696B,
            Category::Critical => 0x404040,
            Category::FutureDate => 0xD9D2E9,
            Category::Missing => 0xF2F2F2,
        }
    }

    /// RGB font colour readable on top of [`Category::fill_color`].
    pub fn font_color(self) -> u32 {
        match self {
            Category::Critical => 0xFFFFFF,
            _ => 0x000000,
        }
    }

    /// `true` for the cross-cutting `FutureDate` and `Missing` buckets.
    pub fn is_sentinel(self) -> bool {
        matches!(self, Category::FutureDate | Category::Missing)
    }
}

/// Ordered `(inclusive upper bound, category)` pairs plus an overflow bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThresholdTable {
    /// Short name used in legends and logs.
    pub name: &'static str,
    /// Ascending inclusive upper bounds.
    pub bounds: &'static [(i64, Category)],
    /// Category for ages above the last bound.
    pub overflow: Category,
}

/// Days since first delivery: ≤21 on track, ≤30 warning, else late.
pub const DELIVERY_AGING: ThresholdTable = ThresholdTable {
    name: "delivery",
    bounds: &[(21, Category::OnTrack), (30, Category::Warning)],
    overflow: Category::Late,
};

/// Days since last status change, six buckets from fresh to critical.
pub const STATUS_CHANGE_AGING: ThresholdTable = ThresholdTable {
    name: "status change",
    bounds: &[
        (7, Category::Fresh),
        (14, Category::Recent),
        (21, Category::Aging),
        (30, Category::Stale),
        (45, Category::Overdue),
    ],
    overflow: Category::Critical,
};

/// Map an age in days to a category using `table`.
///
/// Missing ages classify as `Missing` and negative ages as `FutureDate`, for
/// every table.
pub fn classify(age_days: Option<i64>, table: &ThresholdTable) -> Category {
    let Some(age) = age_days else {
        return Category::Missing;
    };
    if age < 0 {
        return Category::FutureDate;
    }
    table
        .bounds
        .iter()
        .find(|(upper, _)| age <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(table.overflow)
}

/// One row of a rendered legend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
    /// Bucket this row describes.
    pub category: Category,
    /// Range text such as `22 to 30 days`.
    pub range: String,
}

impl ThresholdTable {
    /// Every category this table can produce, including the sentinels.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> =
            self.bounds.iter().map(|(_, category)| *category).collect();
        categories.push(self.overflow);
        categories.push(Category::FutureDate);
        categories.push(Category::Missing);
        categories
    }

    /// Bucket ranges in ascending order, excluding the sentinels.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut entries = Vec::with_capacity(self.bounds.len() + 1);
        let mut lower = 0i64;
        for (upper, category) in self.bounds {
            let range = if lower == 0 {
                format!("up to {upper} days")
            } else {
                format!("{lower} to {upper} days")
            };
            entries.push(LegendEntry {
                category: *category,
                range,
            });
            lower = upper + 1;
        }
        let last = lower - 1;
        entries.push(LegendEntry {
            category: self.overflow,
            range: format!("over {last} days"),
        });
        entries
    }

    /// Bounds strictly ascend from a non-negative start and no category repeats.
    pub fn is_well_formed(&self) -> bool {
        let ascending = self
            .bounds
            .windows(2)
            .all(|pair| pair[0].0 < pair[1].0);
        let non_negative = self.bounds.first().is_none_or(|(upper, _)| *upper >= 0);
        let categories = self.categories();
        let mut unique = categories.clone();
        unique.sort();
        unique.dedup();
        ascending && non_negative && unique.len() == categories.len()
    }
}
