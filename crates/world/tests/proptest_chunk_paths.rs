//! Property-based tests for chunk addressing
//!
//! Critical invariants:
//! - Distinct coordinates never share a cache key
//! - Shard indices always land in [0, 64)
//! - File names round-trip through base 36

use alphaworld_world::{chunk_file_name, shard_index, to_base36, ChunkPos, CoordKey};
use proptest::prelude::*;

proptest! {
    #[test]
    fn coord_keys_are_injective(
        a in (any::<i32>(), any::<i32>()),
        b in (any::<i32>(), any::<i32>()),
    ) {
        let ka = CoordKey::new(a.0, a.1);
        let kb = CoordKey::new(b.0, b.1);
        prop_assert_eq!(ka == kb, a == b);
        prop_assert_eq!(ka.pos(), ChunkPos::new(a.0, a.1));
    }

    #[test]
    fn neighbouring_coordinates_get_distinct_keys(x in any::<i32>(), z in any::<i32>()) {
        let key = CoordKey::new(x, z);
        prop_assert_ne!(key, CoordKey::new(x.wrapping_add(1), z));
        prop_assert_ne!(key, CoordKey::new(x, z.wrapping_add(1)));
        prop_assert_ne!(key, CoordKey::new(x.wrapping_sub(1), z.wrapping_add(1)));
    }

    #[test]
    fn shard_index_is_in_range(coord in any::<i32>()) {
        let shard = shard_index(coord);
        prop_assert!((0..64).contains(&shard));
    }

    #[test]
    fn shard_index_matches_legacy_formula(coord in -100_000i32..100_000) {
        let expected = if coord < 0 { (64 - coord) % 64 } else { coord % 64 };
        prop_assert_eq!(shard_index(coord), expected);
    }

    #[test]
    fn base36_round_trips(value in any::<i32>()) {
        let rendered = to_base36(value);
        prop_assert_eq!(i64::from_str_radix(&rendered, 36).unwrap(), i64::from(value));
        prop_assert!(!rendered.starts_with('0') || rendered == "0");
        prop_assert_eq!(rendered.to_lowercase(), rendered.clone());
    }

    #[test]
    fn file_name_embeds_raw_coordinates(x in any::<i32>(), z in any::<i32>()) {
        let name = chunk_file_name(ChunkPos::new(x, z));
        let parts: Vec<_> = name.split('.').collect();
        prop_assert_eq!(parts.len(), 4);
        prop_assert_eq!(parts[0], "c");
        prop_assert_eq!(parts[3], "dat");
        prop_assert_eq!(i64::from_str_radix(parts[1], 36).unwrap(), i64::from(x));
        prop_assert_eq!(i64::from_str_radix(parts[2], 36).unwrap(), i64::from(z));
    }
}
