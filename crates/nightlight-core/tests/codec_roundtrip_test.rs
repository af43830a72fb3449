//! Property tests for the storage-key codec

use nightlight_core::codec::{canonical_key, decode_storage_key, encode_storage_key};
use nightlight_core::models::{Bounds, Date, MapIdentity, MapProvider, MapType};
use proptest::prelude::*;

fn concrete_bounds() -> impl Strategy<Value = Bounds> {
    prop_oneof![Just(Bounds::UkraineAndAround), Just(Bounds::GazaAndAround)]
}

fn concrete_map_type() -> impl Strategy<Value = MapType> {
    prop_oneof![Just(MapType::Daily), Just(MapType::Monthly)]
}

fn concrete_identity() -> impl Strategy<Value = MapIdentity> {
    (concrete_bounds(), concrete_map_type(), 2011i32..2100, 1u32..=12, 0u32..=31, ".*").prop_map(
        |(bounds, map_type, year, month, day, url)| {
            MapIdentity::new(MapProvider::Eogdata, bounds, map_type, Date::new(year, month, day))
                .with_url(url)
        },
    )
}

proptest! {
    #[test]
    fn storage_key_round_trips(identity in concrete_identity()) {
        let key = encode_storage_key(&identity).unwrap();
        let decoded = decode_storage_key(&key).unwrap();

        prop_assert_eq!(decoded.provider(), identity.provider());
        prop_assert_eq!(decoded.bounds, identity.bounds);
        prop_assert_eq!(decoded.map_type, identity.map_type);
        prop_assert_eq!(decoded.date, identity.date);
        // The URL travels in object metadata, never in the key
        prop_assert_eq!(decoded.source.url, "");
    }

    #[test]
    fn canonical_key_survives_round_trip(identity in concrete_identity()) {
        let decoded = decode_storage_key(&encode_storage_key(&identity).unwrap()).unwrap();
        prop_assert_eq!(canonical_key(&decoded), canonical_key(&identity));
    }
}
