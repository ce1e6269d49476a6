//! Local orderings for loaded list items.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogItem;

/// How the list is ordered.
///
/// `Default` is the server's own ordering and can only be restored by
/// re-fetching; every other option is applied locally to loaded items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Default,
    NameAsc,
    NameDesc,
    RatingAsc,
    RatingDesc,
    Newest,
}

#[derive(Debug, Error)]
#[error("Unknown sort option '{0}'")]
pub struct UnknownSortOption(pub String);

impl SortOption {
    /// Whether this ordering is computed locally.
    pub fn is_local(self) -> bool {
        !matches!(self, SortOption::Default)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Default => "default",
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
            SortOption::RatingAsc => "rating-asc",
            SortOption::RatingDesc => "rating-desc",
            SortOption::Newest => "newest",
        }
    }

    /// Reorder `items` in place. All orderings are stable.
    pub fn apply(self, items: &mut [CatalogItem]) {
        match self {
            SortOption::Default => {}
            SortOption::NameAsc => items.sort_by(compare_names),
            SortOption::NameDesc => items.sort_by(|a, b| compare_names(b, a)),
            SortOption::RatingAsc => items.sort_by(|a, b| a.rating.total_cmp(&b.rating)),
            SortOption::RatingDesc => items.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            SortOption::Newest => sort_newest_first(items),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(SortOption::Default),
            "name-asc" => Ok(SortOption::NameAsc),
            "name-desc" => Ok(SortOption::NameDesc),
            "rating-asc" => Ok(SortOption::RatingAsc),
            "rating-desc" => Ok(SortOption::RatingDesc),
            "newest" => Ok(SortOption::Newest),
            _ => Err(UnknownSortOption(s.to_string())),
        }
    }
}

fn compare_names(a: &CatalogItem, b: &CatalogItem) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// Release dates descending. Items without a date keep their positions;
/// dated items are reordered among the remaining slots only.
fn sort_newest_first(items: &mut [CatalogItem]) {
    let slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.released.is_some())
        .map(|(index, _)| index)
        .collect();

    let mut dated: Vec<CatalogItem> = slots.iter().map(|&i| items[i].clone()).collect();
    dated.sort_by(|a, b| b.released.cmp(&a.released));

    for (slot, item) in slots.into_iter().zip(dated) {
        items[slot] = item;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::rated_item;

    fn names(items: &[CatalogItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    fn sample() -> Vec<CatalogItem> {
        vec![
            rated_item(1, "portal", 4.5, Some("2007-10-09")),
            rated_item(2, "Celeste", 4.1, None),
            rated_item(3, "Braid", 3.9, Some("2008-08-06")),
            rated_item(4, "hades", 4.4, Some("2020-09-17")),
        ]
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let mut items = sample();
        SortOption::NameAsc.apply(&mut items);
        assert_eq!(names(&items), vec!["Braid", "Celeste", "hades", "portal"]);

        SortOption::NameDesc.apply(&mut items);
        assert_eq!(names(&items), vec!["portal", "hades", "Celeste", "Braid"]);
    }

    #[test]
    fn test_rating_sort() {
        let mut items = sample();
        SortOption::RatingAsc.apply(&mut items);
        assert_eq!(names(&items), vec!["Braid", "Celeste", "hades", "portal"]);

        SortOption::RatingDesc.apply(&mut items);
        assert_eq!(names(&items), vec!["portal", "hades", "Celeste", "Braid"]);
    }

    #[test]
    fn test_newest_leaves_undated_in_place() {
        let mut items = sample();
        SortOption::Newest.apply(&mut items);
        assert_eq!(names(&items), vec!["hades", "Celeste", "Braid", "portal"]);
    }

    #[test]
    fn test_sorts_are_idempotent() {
        for option in [
            SortOption::NameAsc,
            SortOption::NameDesc,
            SortOption::RatingAsc,
            SortOption::RatingDesc,
            SortOption::Newest,
        ] {
            let mut once = sample();
            option.apply(&mut once);
            let mut twice = once.clone();
            option.apply(&mut twice);
            assert_eq!(once, twice, "{} is not idempotent", option);
        }
    }

    #[test]
    fn test_default_does_not_reorder() {
        let mut items = sample();
        SortOption::Default.apply(&mut items);
        assert_eq!(items, sample());
    }

    #[test]
    fn test_parse_round_trip() {
        assert_eq!("rating-desc".parse::<SortOption>().unwrap(), SortOption::RatingDesc);
        assert_eq!("Newest".parse::<SortOption>().unwrap(), SortOption::Newest);
        assert!("alphabetical".parse::<SortOption>().is_err());
    }
}
