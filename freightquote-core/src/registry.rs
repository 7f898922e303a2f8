//! Pincode registry loaded from CSV.
//!
//! Expected columns are `code`, `city`, `state`, and for each carrier slug
//! (`safexpress`, `bluedart`, `global_cargo`, `anjani`, `bigship`,
//! `bigship_metro`) the optional `<slug>_region`, `<slug>_oda`, and
//! `<slug>_serviceable`. Header names are case-insensitive and every column
//! except `code` may be missing or blank.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::model::{CarrierId, Location};
use crate::ports::LocationLookup;

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading location data.
pub enum RegistryError {
    /// The CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// A file could not be opened or read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The CSV has no `code` column.
    #[error("CSV has no code column")]
    MissingCodeColumn,
}

/// Parse a yes/no flag; anything unrecognised is unknown.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn is_postal_code(raw: &str) -> bool {
    raw.len() == 6 && raw.bytes().all(|byte| byte.is_ascii_digit())
}

#[derive(Debug, Clone, Default)]
/// In-memory location records keyed by postal code.
pub struct LocationRegistry {
    records: HashMap<String, Location>,
}

impl LocationRegistry {
    /// Registry holding the given records. Later records replace earlier ones with the same code.
    #[must_use]
    pub fn new(records: Vec<Location>) -> Self {
        let mut registry = Self::default();
        for record in records {
            registry.insert(record);
        }
        registry
    }

    /// Add or replace a record.
    pub fn insert(&mut self, mut location: Location) {
        location.code = location.code.trim().to_owned();
        self.records.insert(location.code.clone(), location);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load records from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the file cannot be read or parsed.
    pub fn from_csv_path(path: &Path) -> Result<Self, RegistryError> {
        let file = File::open(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_csv_reader(file)?;
        info!(path = %path.display(), records = registry.len(), "loaded location registry");
        Ok(registry)
    }

    /// Load records from CSV data.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] when the data cannot be parsed or has no `code` column.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers: csv::StringRecord = csv_reader
            .headers()?
            .iter()
            .map(str::to_ascii_lowercase)
            .collect();
        if !headers.iter().any(|header| header == "code") {
            return Err(RegistryError::MissingCodeColumn);
        }
        csv_reader.set_headers(headers);

        let mut registry = Self::default();
        let mut skipped = 0_usize;
        for row in csv_reader.deserialize::<HashMap<String, String>>() {
            match location_from_row(&row?) {
                Some(location) => registry.insert(location),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "skipped location rows without a code");
        }
        Ok(registry)
    }

    /// Rewrite a carrier's ODA flags from a list of serviced (non-ODA) postal codes.
    ///
    /// Listed codes become non-ODA and are added when missing; every other record
    /// becomes ODA. Lines that are not six-digit codes are ignored. Returns the number
    /// of listed codes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] when the list cannot be read.
    pub fn apply_non_oda_allowlist<R: BufRead>(
        &mut self,
        carrier: CarrierId,
        reader: R,
    ) -> Result<usize, RegistryError> {
        let mut allowed = HashSet::new();
        for line in reader.lines() {
            let line = line.map_err(|source| RegistryError::Io {
                path: PathBuf::from("<allowlist>"),
                source,
            })?;
            let code = line.trim();
            if is_postal_code(code) {
                allowed.insert(code.to_owned());
            }
        }

        for (code, location) in &mut self.records {
            location.oda.insert(carrier, !allowed.contains(code));
        }
        for code in &allowed {
            self.records
                .entry(code.clone())
                .or_insert_with(|| Location::unresolved(code.clone()).with_oda(carrier, false));
        }
        info!(%carrier, listed = allowed.len(), "applied non-ODA allowlist");
        Ok(allowed.len())
    }

    /// Apply an allowlist file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] when the file cannot be opened or read.
    pub fn apply_non_oda_allowlist_path(
        &mut self,
        carrier: CarrierId,
        path: &Path,
    ) -> Result<usize, RegistryError> {
        let file = File::open(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.apply_non_oda_allowlist(carrier, BufReader::new(file))
    }
}

impl LocationLookup for LocationRegistry {
    fn lookup(&self, code: &str) -> Option<&Location> {
        self.records.get(code.trim())
    }
}

fn location_from_row(row: &HashMap<String, String>) -> Option<Location> {
    let field = |name: &str| {
        row.get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    };
    let mut location = Location::unresolved(field("code")?);
    location.state = field("state").map(str::to_owned);
    location.city = field("city").map(str::to_owned);
    for carrier in CarrierId::ALL {
        let slug = carrier.slug();
        if let Some(region) = field(&format!("{slug}_region")) {
            location.regions.insert(carrier, region.to_owned());
        }
        if let Some(oda) = field(&format!("{slug}_oda")).and_then(parse_flag) {
            location.oda.insert(carrier, oda);
        }
        if let Some(serviceable) = field(&format!("{slug}_serviceable")).and_then(parse_flag) {
            location.serviceable.insert(carrier, serviceable);
        }
    }
    Some(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Code,City,State,global_cargo_region,global_cargo_oda,bluedart_serviceable,safexpress_oda
110001,New Delhi,Delhi,DEL,n,yes,
400001, Mumbai ,Maharashtra,,Y,no,maybe
,Nowhere,Nowhere,,,,
";

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn loads_rows_with_carrier_columns() {
        let registry = LocationRegistry::from_csv_reader(CSV.as_bytes()).expect("csv parses");
        assert_eq!(registry.len(), 2);

        let delhi = registry.lookup("110001").expect("delhi present");
        assert_eq!(delhi.state.as_deref(), Some("Delhi"));
        assert_eq!(delhi.region_for(CarrierId::GlobalCargo), Some("DEL"));
        assert_eq!(delhi.oda_for(CarrierId::GlobalCargo), Some(false));
        assert_eq!(delhi.serviceable_for(CarrierId::Bluedart), Some(true));
        assert_eq!(delhi.oda_for(CarrierId::Safexpress), None);

        let mumbai = registry.lookup(" 400001 ").expect("mumbai present");
        assert_eq!(mumbai.city.as_deref(), Some("Mumbai"));
        assert_eq!(mumbai.region_for(CarrierId::GlobalCargo), None);
        assert_eq!(mumbai.oda_for(CarrierId::GlobalCargo), Some(true));
        assert_eq!(mumbai.serviceable_for(CarrierId::Bluedart), Some(false));
        assert_eq!(mumbai.oda_for(CarrierId::Safexpress), None);
    }

    #[test]
    fn rejects_csv_without_code_column() {
        let err = LocationRegistry::from_csv_reader("city,state\nPune,Maharashtra\n".as_bytes())
            .expect_err("code column required");
        assert!(matches!(err, RegistryError::MissingCodeColumn));
    }

    #[test]
    fn unknown_code_resolves_to_bare_location() {
        let registry = LocationRegistry::default();
        let resolved = registry.resolve("999999");
        assert_eq!(resolved.code, "999999");
        assert_eq!(resolved.state, None);
    }

    #[test]
    fn allowlist_marks_listed_codes_serviced_and_the_rest_oda() {
        let mut registry = LocationRegistry::from_csv_reader(CSV.as_bytes()).expect("csv parses");
        let listed = registry
            .apply_non_oda_allowlist(
                CarrierId::Safexpress,
                "# serviced\n110001\n560001\n12345\n".as_bytes(),
            )
            .expect("allowlist reads");
        assert_eq!(listed, 2);
        let oda = |code: &str| {
            registry
                .lookup(code)
                .and_then(|location| location.oda_for(CarrierId::Safexpress))
        };
        assert_eq!(oda("110001"), Some(false));
        assert_eq!(oda("400001"), Some(true));
        assert_eq!(oda("560001"), Some(false));
        assert_eq!(oda("12345"), None);
    }
}
