use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::codec;

/// An enum whose variants have a canonical, type-prefixed name
/// (`BoundsUkraineAndAround`, `MapTypeMonthly`, ...).
pub trait NamedVariant: Copy + PartialEq + 'static {
    /// Prefix shared by every canonical name of this enum
    const PREFIX: &'static str;

    /// Every variant, `Unspecified` first
    const VARIANTS: &'static [Self];

    /// Canonical name used in storage keys and JSON
    fn name(&self) -> &'static str;

    /// Canonical name without the type prefix
    fn short_name(&self) -> &'static str {
        let name = self.name();
        name.strip_prefix(Self::PREFIX).unwrap_or(name)
    }

    /// Whether this is the wildcard variant
    fn is_unspecified(&self) -> bool {
        *self == Self::VARIANTS[0]
    }
}

macro_rules! named_variant_conversions {
    ($ty:ty, $resolve:path) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.name().to_string()
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                $resolve(&value)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                $resolve(value)
            }
        }
    };
}

/// Origin of the source imagery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MapProvider {
    #[default]
    Unspecified,
    Eogdata,
}

impl NamedVariant for MapProvider {
    const PREFIX: &'static str = "MapProvider";
    const VARIANTS: &'static [Self] = &[MapProvider::Unspecified, MapProvider::Eogdata];

    fn name(&self) -> &'static str {
        match self {
            MapProvider::Unspecified => "MapProviderUnspecified",
            MapProvider::Eogdata => "MapProviderEogdata",
        }
    }
}

named_variant_conversions!(MapProvider, codec::resolve_provider);

/// How an internal map was cropped from the source map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Bounds {
    #[default]
    Unspecified,
    UkraineAndAround,
    GazaAndAround,
}

impl NamedVariant for Bounds {
    const PREFIX: &'static str = "Bounds";
    const VARIANTS: &'static [Self] =
        &[Bounds::Unspecified, Bounds::UkraineAndAround, Bounds::GazaAndAround];

    fn name(&self) -> &'static str {
        match self {
            Bounds::Unspecified => "BoundsUnspecified",
            Bounds::UkraineAndAround => "BoundsUkraineAndAround",
            Bounds::GazaAndAround => "BoundsGazaAndAround",
        }
    }
}

named_variant_conversions!(Bounds, codec::resolve_bounds);

/// Temporal granularity of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MapType {
    #[default]
    Unspecified,
    Daily,
    Monthly,
}

impl NamedVariant for MapType {
    const PREFIX: &'static str = "MapType";
    const VARIANTS: &'static [Self] = &[MapType::Unspecified, MapType::Daily, MapType::Monthly];

    fn name(&self) -> &'static str {
        match self {
            MapType::Unspecified => "MapTypeUnspecified",
            MapType::Daily => "MapTypeDaily",
            MapType::Monthly => "MapTypeMonthly",
        }
    }
}

named_variant_conversions!(MapType, codec::resolve_map_type);

/// Calendar date of a map. `day == 0` denotes the whole month.
///
/// Field order matters: the derived ordering compares year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Where the raw asset came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapSource {
    pub provider: MapProvider,

    #[serde(default)]
    pub url: String,
}

/// One dated, region-cropped imagery product from one provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapIdentity {
    pub bounds: Bounds,
    pub map_type: MapType,
    pub date: Date,
    pub source: MapSource,
}

impl MapIdentity {
    pub fn new(provider: MapProvider, bounds: Bounds, map_type: MapType, date: Date) -> Self {
        Self {
            bounds,
            map_type,
            date,
            source: MapSource {
                provider,
                url: String::new(),
            },
        }
    }

    /// Attach the source URL the raw asset was fetched from
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source.url = url.into();
        self
    }

    pub fn provider(&self) -> MapProvider {
        self.source.provider
    }

    /// Key used for deduplication and manifest lookup
    pub fn canonical_key(&self) -> String {
        codec::canonical_key(self)
    }

    /// Reject wildcard values; a storable map must name every enum explicitly.
    pub fn ensure_concrete(&self) -> crate::Result<()> {
        let unspecified = [
            ("provider", self.provider().is_unspecified()),
            ("bounds", self.bounds.is_unspecified()),
            ("mapType", self.map_type.is_unspecified()),
        ];

        match unspecified.iter().find(|(_, missing)| *missing) {
            Some((field, _)) => Err(crate::NightlightError::InvalidIdentity {
                reason: format!("{} is unspecified", field),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for MapIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_key())
    }
}

/// A map downloaded into the caller's temp directory
#[derive(Debug, Clone)]
pub struct LocalAsset {
    pub file_path: PathBuf,
    pub identity: MapIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MapIdentity {
        MapIdentity::new(
            MapProvider::Eogdata,
            Bounds::UkraineAndAround,
            MapType::Monthly,
            Date::new(2021, 1, 1),
        )
        .with_url("https://example.com/2021/01.tgz")
    }

    #[test]
    fn test_short_names() {
        assert_eq!(Bounds::UkraineAndAround.short_name(), "UkraineAndAround");
        assert_eq!(MapType::Monthly.short_name(), "Monthly");
        assert_eq!(MapProvider::Eogdata.short_name(), "Eogdata");
    }

    #[test]
    fn test_identity_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["bounds"], "BoundsUkraineAndAround");
        assert_eq!(json["mapType"], "MapTypeMonthly");
        assert_eq!(json["date"]["year"], 2021);
        assert_eq!(json["source"]["provider"], "MapProviderEogdata");
    }

    #[test]
    fn test_identity_deserializes_leniently() {
        let json = r#"{
            "bounds": "bounds_ukraine_and_around",
            "mapType": "monthly",
            "date": {"year": 2021, "month": 1, "day": 1},
            "source": {"provider": "nonsense"}
        }"#;

        let identity: MapIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.bounds, Bounds::UkraineAndAround);
        assert_eq!(identity.map_type, MapType::Monthly);
        assert_eq!(identity.provider(), MapProvider::Unspecified);
        assert_eq!(identity.source.url, "");
    }

    #[test]
    fn test_ensure_concrete() {
        assert!(sample().ensure_concrete().is_ok());

        let mut wildcard = sample();
        wildcard.map_type = MapType::Unspecified;
        let err = wildcard.ensure_concrete().unwrap_err();
        assert!(err.to_string().contains("mapType"));
    }

    #[test]
    fn test_date_ordering() {
        assert!(Date::new(2020, 12, 31) < Date::new(2021, 1, 0));
        assert!(Date::new(2021, 2, 1) < Date::new(2021, 2, 2));
    }
}
