//! Slug generation for Telegraph-Finder
//!
//! Telegraph derives a page's path from its title and creation date:
//! `{title}-{MM}-{DD}`, with `-{N}` appended for the N-th page of the same
//! title on the same day. Older pages sometimes carry a two-digit year as well.
//! This module turns a query into those slugs.

mod candidates;
mod query;
mod translit;

pub use candidates::{day_candidates, format_candidate, CandidatePlan, SlugScheme, DAYS_PER_MONTH};
pub use query::SearchQuery;
pub use translit::transliterate;
