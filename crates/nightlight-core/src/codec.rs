//! Map identity codec
//!
//! Converts a [`MapIdentity`] to and from its object-store key
//! (`{provider}/{bounds}/{mapType}/{year}_{month}_{day}.tif`) and derives the
//! canonical key used for deduplication and manifest lookup.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::{NightlightError, Result};
use crate::models::identity::NamedVariant;
use crate::models::{Bounds, Date, MapIdentity, MapProvider, MapType};

/// Extension every stored map carries
pub const MAP_EXTENSION: &str = "tif";

/// Number of bounds characters kept in a canonical key
const CANONICAL_BOUNDS_LEN: usize = 10;

/// Lower-case and strip `_` / `-` so that spellings compare equal
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Build the lookup from normalized spelling to variant.
///
/// Both the canonical name and the unprefixed name are registered.
fn build_table<T: NamedVariant>() -> HashMap<String, T> {
    let mut table = HashMap::new();
    for variant in T::VARIANTS {
        table.insert(normalize(variant.name()), *variant);
        table.insert(normalize(variant.short_name()), *variant);
    }
    table
}

fn resolve<T: NamedVariant>(table: &'static OnceLock<HashMap<String, T>>, s: &str) -> T {
    table
        .get_or_init(build_table::<T>)
        .get(&normalize(s))
        .copied()
        .unwrap_or(T::VARIANTS[0])
}

static PROVIDERS: OnceLock<HashMap<String, MapProvider>> = OnceLock::new();
static BOUNDS: OnceLock<HashMap<String, Bounds>> = OnceLock::new();
static MAP_TYPES: OnceLock<HashMap<String, MapType>> = OnceLock::new();

/// Resolve a provider name; unknown input resolves to `Unspecified`
pub fn resolve_provider(s: &str) -> MapProvider {
    resolve(&PROVIDERS, s)
}

/// Resolve a bounds name; unknown input resolves to `Unspecified`
pub fn resolve_bounds(s: &str) -> Bounds {
    resolve(&BOUNDS, s)
}

/// Resolve a map type name; unknown input resolves to `Unspecified`
pub fn resolve_map_type(s: &str) -> MapType {
    resolve(&MAP_TYPES, s)
}

/// Encode a fully specified identity as its object-store key
pub fn encode_storage_key(identity: &MapIdentity) -> Result<String> {
    identity.ensure_concrete()?;

    let date = identity.date;
    Ok(format!(
        "{}/{}/{}/{}_{}_{}.{}",
        identity.provider().name(),
        identity.bounds.name(),
        identity.map_type.name(),
        date.year,
        date.month,
        date.day,
        MAP_EXTENSION,
    ))
}

/// Whether a key has a directory part and the map extension.
///
/// This is the cheap pre-filter applied before decoding; it does not
/// validate segment count or the date.
pub fn has_storage_key_shape(key: &str) -> bool {
    match key.rsplit_once('/') {
        Some((directory, file_name)) => {
            !directory.is_empty() && file_name.ends_with(&format!(".{}", MAP_EXTENSION))
        }
        None => false,
    }
}

/// Decode an object-store key.
///
/// Unknown enum segments decode to `Unspecified`; the source URL is left empty
/// because it lives in the object's metadata, not in the key.
pub fn decode_storage_key(key: &str) -> Result<MapIdentity> {
    let malformed = |reason: String| NightlightError::MalformedKey {
        key: key.to_string(),
        reason,
    };

    let (directory, file_name) = key
        .rsplit_once('/')
        .ok_or_else(|| malformed("missing directory".to_string()))?;

    let segments: Vec<&str> = directory.split('/').collect();
    let [provider, bounds, map_type] = segments.as_slice() else {
        return Err(malformed(format!(
            "expected 3 directory segments, found {}",
            segments.len()
        )));
    };

    let stem = file_name
        .strip_suffix(&format!(".{}", MAP_EXTENSION))
        .ok_or_else(|| malformed(format!("expected a .{} file", MAP_EXTENSION)))?;

    let date_parts: Vec<&str> = stem.split('_').collect();
    let [year, month, day] = date_parts.as_slice() else {
        return Err(malformed(format!(
            "expected year_month_day, found '{}'",
            stem
        )));
    };

    let year = year
        .parse::<i32>()
        .map_err(|e| malformed(format!("failed to parse year: {}", e)))?;
    let month = month
        .parse::<u32>()
        .map_err(|e| malformed(format!("failed to parse month: {}", e)))?;
    let day = day
        .parse::<u32>()
        .map_err(|e| malformed(format!("failed to parse day: {}", e)))?;

    Ok(MapIdentity::new(
        resolve_provider(provider),
        resolve_bounds(bounds),
        resolve_map_type(map_type),
        Date::new(year, month, day),
    ))
}

/// `{mapType}-{first 10 chars of bounds}_{year}-{month}-{day}`
pub fn canonical_key(identity: &MapIdentity) -> String {
    let bounds: String = identity
        .bounds
        .short_name()
        .chars()
        .take(CANONICAL_BOUNDS_LEN)
        .collect();
    let date = identity.date;

    format!(
        "{}-{}_{}-{}-{}",
        identity.map_type.short_name(),
        bounds,
        date.year,
        date.month,
        date.day
    )
}

/// Label shown by the front end, e.g. `Jan 2021`
pub fn display_name(date: &Date) -> String {
    NaiveDate::from_ymd_opt(date.year, date.month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:02} {}", date.month, date.year))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly_ukraine(year: i32, month: u32, day: u32) -> MapIdentity {
        MapIdentity::new(
            MapProvider::Eogdata,
            Bounds::UkraineAndAround,
            MapType::Monthly,
            Date::new(year, month, day),
        )
    }

    #[test]
    fn test_canonical_key_example() {
        assert_eq!(canonical_key(&monthly_ukraine(2021, 1, 1)), "Monthly-UkraineAnd_2021-1-1");
    }

    #[test]
    fn test_canonical_key_ignores_provider_and_url() {
        let a = monthly_ukraine(2022, 3, 1).with_url("https://a");
        let mut b = monthly_ukraine(2022, 3, 1).with_url("https://b");
        b.source.provider = MapProvider::Unspecified;
        assert_eq!(canonical_key(&a), canonical_key(&b));
    }

    #[test]
    fn test_encode_storage_key() {
        let mut map = monthly_ukraine(2022, 1, 0);
        map.map_type = MapType::Daily;
        assert_eq!(
            encode_storage_key(&map).unwrap(),
            "MapProviderEogdata/BoundsUkraineAndAround/MapTypeDaily/2022_1_0.tif"
        );
    }

    #[test]
    fn test_encode_rejects_unspecified() {
        let mut map = monthly_ukraine(2022, 1, 1);
        map.bounds = Bounds::Unspecified;
        assert!(matches!(
            encode_storage_key(&map),
            Err(NightlightError::InvalidIdentity { .. })
        ));
    }

    #[test]
    fn test_decode_storage_key() {
        let map =
            decode_storage_key("MapProviderEogdata/BoundsUkraineAndAround/MapTypeDaily/2022_2_1.tif")
                .unwrap();
        assert_eq!(map.provider(), MapProvider::Eogdata);
        assert_eq!(map.bounds, Bounds::UkraineAndAround);
        assert_eq!(map.map_type, MapType::Daily);
        assert_eq!(map.date, Date::new(2022, 2, 1));
        assert_eq!(map.source.url, "");
    }

    #[test]
    fn test_decode_unknown_segments_are_unspecified() {
        let map = decode_storage_key("Somebody/Somewhere/Weekly/2022_2_1.tif").unwrap();
        assert_eq!(map.provider(), MapProvider::Unspecified);
        assert_eq!(map.bounds, Bounds::Unspecified);
        assert_eq!(map.map_type, MapType::Unspecified);
    }

    #[test]
    fn test_decode_malformed_keys() {
        let bad = [
            "2022_1_1.tif",
            "MapProviderEogdata/MapTypeDaily/2022_1_1.tif",
            "a/b/c/d/2022_1_1.tif",
            "MapProviderEogdata/BoundsUkraineAndAround/MapTypeDaily/2022_1_1.png",
            "MapProviderEogdata/BoundsUkraineAndAround/MapTypeDaily/2022_invalid_1.tif",
            "MapProviderEogdata/BoundsUkraineAndAround/MapTypeDaily/2022_1.tif",
        ];
        for key in bad {
            assert!(
                matches!(decode_storage_key(key), Err(NightlightError::MalformedKey { .. })),
                "{} should be malformed",
                key
            );
        }
    }

    #[test]
    fn test_storage_key_shape() {
        assert!(has_storage_key_shape("a/b/c/2022_1_1.tif"));
        assert!(has_storage_key_shape("a/2022_1_1.tif"));
        assert!(!has_storage_key_shape("2022_1_1.tif"));
        assert!(!has_storage_key_shape("a/b/c/2022_1_1.json"));
    }

    #[test]
    fn test_resolve_spellings() {
        for spelling in [
            "BoundsUkraineAndAround",
            "bounds_ukraine_and_around",
            "BOUNDS-UKRAINE-AND-AROUND",
            "boundsukraineandaround",
            "ukraine_and_around",
        ] {
            assert_eq!(resolve_bounds(spelling), Bounds::UkraineAndAround, "{}", spelling);
        }
        assert_eq!(resolve_bounds("fake"), Bounds::Unspecified);
        assert_eq!(resolve_map_type("map_type_daily"), MapType::Daily);
        assert_eq!(resolve_map_type("fake"), MapType::Unspecified);
        assert_eq!(resolve_provider("map_provider_eogdata"), MapProvider::Eogdata);
        assert_eq!(resolve_provider(""), MapProvider::Unspecified);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(&Date::new(2021, 1, 1)), "Jan 2021");
        assert_eq!(display_name(&Date::new(2023, 10, 0)), "Oct 2023");
    }
}
