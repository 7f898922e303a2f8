//! Location to zone resolution.
//!
//! Precedence is fixed: a region code the carrier attached to the location,
//! then the city table, then the state table, then the carrier default.

use std::collections::HashMap;

use crate::model::{CarrierId, Location, ZonePair, normalize_key};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Carrier-specific mapping from locations to zone names.
pub struct ZoneResolver {
    carrier: CarrierId,
    by_city: HashMap<String, &'static str>,
    by_state: HashMap<String, &'static str>,
    default_zone: Option<&'static str>,
}

impl ZoneResolver {
    /// Resolver that only honours region codes attached for `carrier`.
    #[must_use]
    pub fn new(carrier: CarrierId) -> Self {
        Self {
            carrier,
            by_city: HashMap::new(),
            by_state: HashMap::new(),
            default_zone: None,
        }
    }

    /// Add a city table. Keys are matched case-insensitively.
    #[must_use]
    pub fn with_cities(mut self, table: &[(&str, &'static str)]) -> Self {
        extend(&mut self.by_city, table);
        self
    }

    /// Add a state table. Keys are matched case-insensitively.
    #[must_use]
    pub fn with_states(mut self, table: &[(&str, &'static str)]) -> Self {
        extend(&mut self.by_state, table);
        self
    }

    /// Zone used when nothing else matches.
    #[must_use]
    pub fn with_default(mut self, zone: &'static str) -> Self {
        self.default_zone = Some(zone);
        self
    }

    /// Carrier whose region codes are honoured.
    #[must_use]
    pub const fn carrier(&self) -> CarrierId {
        self.carrier
    }

    /// Zone from the location's attached region code only.
    #[must_use]
    pub fn attached_region(&self, location: &Location) -> Option<String> {
        location.region_for(self.carrier).map(str::to_owned)
    }

    /// Zone from the city or state tables, without attached codes or the default.
    #[must_use]
    pub fn from_tables(&self, location: &Location) -> Option<&'static str> {
        location
            .city_key()
            .and_then(|city| self.by_city.get(&city).copied())
            .or_else(|| {
                location
                    .state_key()
                    .and_then(|state| self.by_state.get(&state).copied())
            })
    }

    /// Resolve a location using the full precedence chain.
    #[must_use]
    pub fn resolve(&self, location: &Location) -> Option<String> {
        self.attached_region(location).or_else(|| {
            self.from_tables(location)
                .or(self.default_zone)
                .map(str::to_owned)
        })
    }

    /// Resolve both ends of a lane.
    #[must_use]
    pub fn resolve_pair(&self, origin: &Location, destination: &Location) -> ZonePair {
        ZonePair::new(self.resolve(origin), self.resolve(destination))
    }
}

fn extend(target: &mut HashMap<String, &'static str>, table: &[(&str, &'static str)]) {
    target.extend(
        table
            .iter()
            .filter_map(|(name, zone)| normalize_key(name).map(|key| (key, *zone))),
    );
}
