use std::collections::HashMap;

use crate::model::{ZonePair, normalize_key};

#[derive(Debug, Clone, PartialEq)]
/// Square lookup table indexed by origin and destination zone.
///
/// Zone names are matched case-insensitively.
pub struct ZoneMatrix<T> {
    index: HashMap<String, usize>,
    cells: Vec<Vec<T>>,
}

impl<T: Copy> ZoneMatrix<T> {
    /// Build a matrix whose rows and columns follow `zones`.
    #[must_use]
    pub fn new<const N: usize>(zones: [&str; N], cells: [[T; N]; N]) -> Self {
        Self {
            index: zones
                .iter()
                .enumerate()
                .filter_map(|(position, zone)| normalize_key(zone).map(|key| (key, position)))
                .collect(),
            cells: cells.iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// Cell for a lane, if both zones are known.
    #[must_use]
    pub fn get(&self, from: &str, to: &str) -> Option<T> {
        let row = *self.index.get(&normalize_key(from)?)?;
        let column = *self.index.get(&normalize_key(to)?)?;
        self.cells.get(row)?.get(column).copied()
    }

    /// Cell for a resolved zone pair.
    #[must_use]
    pub fn get_pair(&self, zones: &ZonePair) -> Option<T> {
        self.get(zones.from.as_deref()?, zones.to.as_deref()?)
    }

    /// True when the zone has a row.
    #[must_use]
    pub fn contains(&self, zone: &str) -> bool {
        normalize_key(zone).is_some_and(|key| self.index.contains_key(&key))
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a matrix without zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
