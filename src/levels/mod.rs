//! Level generation
//!
//! - Volume profile (POC/VAH/VAL) from intraday bars
//! - Structural extremes (prior day, weekly, monthly)
//! - Round-number levels with a pluggable tier policy
//! - Confluence grouping across all of the above

pub mod confluence;
pub mod round;
pub mod structural;
pub mod volume_profile;

pub use confluence::{group_confluence, ConfluenceZone};
pub use round::{round_levels, TierPolicy};
pub use structural::{structural_levels, ReferencePrices};
pub use volume_profile::{estimate, value_area_bins, value_area_levels, BinRange, ProfileParams};
