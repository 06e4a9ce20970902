//! Community-to-district and category-to-bucket classification.

use tracing::warn;

/// Community area ids belonging to each of the nine districts.
const DISTRICT_COMMUNITIES: [&[u32]; 9] = [
    &[1, 2, 3, 4, 9, 10, 11, 12, 13, 14, 76, 77],
    &[5, 6, 7, 21, 22],
    &[15, 16, 17, 18, 19, 20],
    &[8, 32, 33],
    &[23, 24, 25, 26, 27, 28, 29, 30, 31],
    &[56, 57, 58, 59, 61, 62, 63, 64, 65, 66, 67, 68],
    &[34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 60, 69],
    &[70, 71, 72, 73, 74, 75],
    &[44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55],
];

/// One of the nine districts, numbered 1 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct District(u32);

impl District {
    /// District 9 absorbs everything that matches no other district.
    pub const FALLBACK: District = District(9);

    pub fn new(id: u32) -> Option<Self> {
        (1..=9).contains(&id).then_some(Self(id))
    }

    /// The district selected by a run's configuration.
    ///
    /// Ids 1 through 8 select their own district; any other value selects
    /// district 9.
    pub fn from_config(id: u32) -> Self {
        match id {
            1..=8 => Self(id),
            9 => Self::FALLBACK,
            _ => {
                warn!(district = id, "unknown district, filtering on district 9");
                Self::FALLBACK
            }
        }
    }

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn communities(self) -> &'static [u32] {
        DISTRICT_COMMUNITIES[self.0 as usize - 1]
    }

    /// Whether `community` lies inside this district.
    pub fn contains(self, community: u32) -> bool {
        self.communities().contains(&community)
    }
}

/// The district of `community`, or [`District::FALLBACK`] if none lists it.
pub fn classify(community: u32) -> District {
    (1..=8)
        .map(District)
        .find(|district| district.contains(community))
        .unwrap_or(District::FALLBACK)
}

/// Crime categories that are counted at all.
pub const PRIMARY_CATEGORIES: [&str; 8] = [
    "HOMICIDE",
    "ROBBERY",
    "BATTERY",
    "ASSAULT",
    "BURGLARY",
    "THEFT",
    "MOTOR VEHICLE THEFT",
    "WEAPONS VIOLATION",
];

/// Categories with a dedicated bucket, in bucket order.
const BUCKETED_CATEGORIES: [&str; 7] = [
    "HOMICIDE",
    "ROBBERY",
    "BATTERY",
    "ASSAULT",
    "BURGLARY",
    "THEFT",
    "MOTOR VEHICLE THEFT",
];

/// Bucket for every category without a dedicated one.
pub const CATCH_ALL_BUCKET: usize = 7;

pub fn is_primary(category: &str) -> bool {
    PRIMARY_CATEGORIES.contains(&category)
}

/// The count bucket (0..=7) of an exact category string.
pub fn category_bucket(category: &str) -> usize {
    BUCKETED_CATEGORIES
        .iter()
        .position(|bucketed| *bucketed == category)
        .unwrap_or(CATCH_ALL_BUCKET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_community_belongs_to_exactly_one_district() {
        for community in 1..=77 {
            let owners = (1..=9)
                .filter_map(District::new)
                .filter(|district| district.contains(community))
                .count();
            assert_eq!(owners, 1, "community {community}");
        }
    }

    #[test]
    fn classifies_known_communities() {
        assert_eq!(classify(1).id(), 1);
        assert_eq!(classify(22).id(), 2);
        assert_eq!(classify(16).id(), 3);
        assert_eq!(classify(33).id(), 4);
        assert_eq!(classify(60).id(), 7);
        assert_eq!(classify(75).id(), 8);
        assert_eq!(classify(44).id(), 9);
    }

    #[test]
    fn unmatched_communities_fall_back_to_district_nine() {
        assert_eq!(classify(0), District::FALLBACK);
        assert_eq!(classify(78), District::FALLBACK);
    }

    #[test]
    fn config_outside_one_to_eight_selects_district_nine() {
        assert_eq!(District::from_config(3).id(), 3);
        assert_eq!(District::from_config(9), District::FALLBACK);
        assert_eq!(District::from_config(0), District::FALLBACK);
        assert_eq!(District::from_config(12), District::FALLBACK);
        assert!(District::new(0).is_none());
        assert!(District::new(10).is_none());
    }

    #[test]
    fn every_constructible_district_has_communities() {
        for id in 0..=20 {
            assert!(!District::from_config(id).communities().is_empty(), "{id}");
            if let Some(district) = District::new(id) {
                assert!(!district.communities().is_empty(), "{id}");
            }
        }
    }

    #[test]
    fn primary_categories_map_to_distinct_buckets() {
        let buckets = PRIMARY_CATEGORIES
            .iter()
            .map(|category| category_bucket(category))
            .collect::<HashSet<_>>();
        assert_eq!(buckets.len(), 8);
        assert_eq!(category_bucket("HOMICIDE"), 0);
        assert_eq!(category_bucket("BURGLARY"), 4);
        assert_eq!(category_bucket("THEFT"), 5);
        assert_eq!(category_bucket("WEAPONS VIOLATION"), CATCH_ALL_BUCKET);
    }

    #[test]
    fn primary_filter_is_exact() {
        assert!(is_primary("MOTOR VEHICLE THEFT"));
        assert!(!is_primary("theft"));
        assert!(!is_primary("NARCOTICS"));
        assert_eq!(category_bucket("NARCOTICS"), CATCH_ALL_BUCKET);
    }
}
