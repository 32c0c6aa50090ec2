//! Range-to-point lookup tables for enumerated size buckets.
//!
//! Some sources report employee counts and revenue as bucket identifiers
//! (`c_00101_00250`, `r_00100000`) rather than numbers. Each bucket maps to a
//! fixed midpoint. Unknown identifiers map to `None`.

use std::collections::BTreeMap;

use prospector_shared::BucketsConfig;

const DEFAULT_EMPLOYEE_BUCKETS: &[(&str, u64)] = &[
    ("c_00001_00010", 5),
    ("c_00011_00050", 30),
    ("c_00051_00100", 75),
    ("c_00101_00250", 175),
    ("c_00251_00500", 375),
    ("c_00501_01000", 750),
    ("c_01001_05000", 3_000),
    ("c_05001_10000", 7_500),
    ("c_10001_max", 15_000),
];

const DEFAULT_REVENUE_BUCKETS: &[(&str, u64)] = &[
    ("r_00000000", 0),
    ("r_00001000", 500_000),
    ("r_00010000", 5_000_000),
    ("r_00100000", 50_000_000),
    ("r_01000000", 500_000_000),
    ("r_10000000", 5_000_000_000),
];

/// Midpoint tables for employee-count and revenue buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTables {
    employees: BTreeMap<String, u64>,
    revenue: BTreeMap<String, u64>,
}

impl Default for BucketTables {
    fn default() -> Self {
        Self {
            employees: to_map(DEFAULT_EMPLOYEE_BUCKETS),
            revenue: to_map(DEFAULT_REVENUE_BUCKETS),
        }
    }
}

fn to_map(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
    entries
        .iter()
        .map(|(id, midpoint)| ((*id).to_string(), *midpoint))
        .collect()
}

impl BucketTables {
    /// Built-in tables with `[buckets]` entries layered on top.
    pub fn with_overrides(config: &BucketsConfig) -> Self {
        let mut tables = Self::default();
        tables
            .employees
            .extend(config.employees.iter().map(|(k, v)| (k.clone(), *v)));
        tables
            .revenue
            .extend(config.revenue.iter().map(|(k, v)| (k.clone(), *v)));
        tables
    }

    /// Midpoint for an employee bucket id.
    pub fn employees(&self, bucket: &str) -> Option<u64> {
        self.employees.get(bucket.trim()).copied()
    }

    /// Midpoint for a revenue bucket id.
    pub fn revenue(&self, bucket: &str) -> Option<u64> {
        self.revenue.get(bucket.trim()).copied()
    }
}
