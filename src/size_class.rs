//! COCO area-based size classes.

use std::fmt;

/// Upper bound (exclusive) of the Small class, 32².
pub const SMALL_AREA_LIMIT: f64 = 1024.0;
/// Upper bound (exclusive) of the Medium class, 96².
pub const MEDIUM_AREA_LIMIT: f64 = 9216.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Classify a box of `w` by `h` pixels by its area.
    pub fn classify(w: f64, h: f64) -> Self {
        Self::from_area(w * h)
    }

    pub fn from_area(area: f64) -> Self {
        if area < SMALL_AREA_LIMIT {
            SizeClass::Small
        } else if area < MEDIUM_AREA_LIMIT {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "Small",
            SizeClass::Medium => "Medium",
            SizeClass::Large => "Large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
