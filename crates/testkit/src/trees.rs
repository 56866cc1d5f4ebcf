//! Builders for the tagged trees found in Alpha saves.

use std::collections::HashMap;

use alphaworld_core::Item;
use alphaworld_world::{
    ChunkPos, Value, WorldMetadata, CHUNK_VOLUME, HEIGHTMAP_LEN, NIBBLE_ARRAY_LEN,
};
use fastnbt::ByteArray;

/// Build a compound from key/value pairs.
pub fn compound<I, K>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    Value::Compound(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<HashMap<_, _>>(),
    )
}

/// Byte array tag from raw bytes.
pub fn byte_array(bytes: &[u8]) -> Value {
    Value::ByteArray(ByteArray::new(bytes.iter().map(|&b| b as i8).collect()))
}

/// level.dat tree holding `metadata` under `Data`.
pub fn level_dat_tree(metadata: &WorldMetadata) -> Value {
    compound([(
        "Data",
        compound([
            ("SnowCovered", Value::Byte(metadata.snow_covered)),
            ("Time", Value::Long(metadata.time)),
            ("SpawnX", Value::Int(metadata.spawn_x)),
            ("SpawnY", Value::Int(metadata.spawn_y)),
            ("SpawnZ", Value::Int(metadata.spawn_z)),
            ("LastPlayed", Value::Long(metadata.last_played)),
            ("SizeOnDisk", Value::Long(metadata.size_on_disk)),
            ("RandomSeed", Value::Long(metadata.random_seed)),
        ]),
    )])
}

/// Builder for a single entity compound.
#[derive(Debug, Clone)]
pub struct EntityTree {
    fields: HashMap<String, Value>,
}

impl EntityTree {
    /// Entity with every required field set to plausible defaults.
    pub fn new(id: &str) -> Self {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        fields.insert("OnGround".to_string(), Value::Byte(1));
        fields.insert("Air".to_string(), Value::Short(300));
        fields.insert("Fire".to_string(), Value::Short(-20));
        fields.insert("FallDistance".to_string(), Value::Float(0.0));
        Self { fields }
            .pos(0.5, 64.0, 0.5)
            .motion(0.0, 0.0, 0.0)
            .rotation(0.0, 0.0)
    }

    /// Position list.
    pub fn pos(self, x: f64, y: f64, z: f64) -> Self {
        self.set("Pos", doubles(&[x, y, z]))
    }

    /// Motion list.
    pub fn motion(self, dx: f64, dy: f64, dz: f64) -> Self {
        self.set("Motion", doubles(&[dx, dy, dz]))
    }

    /// Rotation list; the save order is pitch first.
    pub fn rotation(self, yaw: f32, pitch: f32) -> Self {
        self.set(
            "Rotation",
            Value::List(vec![Value::Float(pitch), Value::Float(yaw)]),
        )
    }

    /// Health attribute.
    pub fn health(self, health: i16) -> Self {
        self.set("Health", Value::Short(health))
    }

    /// Age attribute.
    pub fn age(self, age: i16) -> Self {
        self.set("Age", Value::Short(age))
    }

    /// Falling-block tile id.
    pub fn tile(self, tile: i16) -> Self {
        self.set("Tile", Value::Short(tile))
    }

    /// Carried item stack.
    pub fn item(self, item: Item) -> Self {
        self.set(
            "Item",
            compound([
                ("id", Value::Short(item.id)),
                ("Count", Value::Byte(item.count)),
                ("Damage", Value::Short(item.damage)),
            ]),
        )
    }

    /// Set any field.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Remove a field.
    pub fn without(mut self, key: &str) -> Self {
        self.fields.remove(key);
        self
    }

    /// Finish the compound.
    pub fn build(self) -> Value {
        Value::Compound(self.fields)
    }
}

/// Builder for a chunk file tree.
#[derive(Debug, Clone)]
pub struct ChunkTree {
    level: HashMap<String, Value>,
    entities: Vec<Value>,
}

impl ChunkTree {
    /// Empty, unpopulated chunk recording `pos`.
    pub fn new(pos: ChunkPos) -> Self {
        let mut level = HashMap::new();
        level.insert("Blocks".to_string(), byte_array(&vec![0; CHUNK_VOLUME]));
        level.insert("Data".to_string(), byte_array(&vec![0; NIBBLE_ARRAY_LEN]));
        level.insert("SkyLight".to_string(), byte_array(&vec![0xFF; NIBBLE_ARRAY_LEN]));
        level.insert("HeightMap".to_string(), byte_array(&vec![0; HEIGHTMAP_LEN]));
        level.insert("BlockLight".to_string(), byte_array(&vec![0; NIBBLE_ARRAY_LEN]));
        level.insert("TileEntities".to_string(), Value::List(Vec::new()));
        level.insert("LastUpdate".to_string(), Value::Long(0));
        level.insert("xPos".to_string(), Value::Int(pos.x));
        level.insert("zPos".to_string(), Value::Int(pos.z));
        level.insert("TerrainPopulated".to_string(), Value::Byte(0));
        Self {
            level,
            entities: Vec::new(),
        }
    }

    /// Set a single block id using the Alpha column-major layout.
    pub fn block(mut self, x: usize, y: usize, z: usize, id: u8) -> Self {
        if let Some(Value::ByteArray(blocks)) = self.level.get_mut("Blocks") {
            let mut bytes: Vec<i8> = blocks.iter().copied().collect();
            bytes[y + z * 128 + x * 128 * 16] = id as i8;
            *blocks = ByteArray::new(bytes);
        }
        self
    }

    /// Append an entity.
    pub fn entity(mut self, entity: EntityTree) -> Self {
        self.entities.push(entity.build());
        self
    }

    /// Last update tick.
    pub fn last_update(self, tick: i64) -> Self {
        self.set("LastUpdate", Value::Long(tick))
    }

    /// Mark the chunk populated.
    pub fn populated(self) -> Self {
        self.set("TerrainPopulated", Value::Byte(1))
    }

    /// Set any `Level` field.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.level.insert(key.to_string(), value);
        self
    }

    /// Remove a `Level` field.
    pub fn without(mut self, key: &str) -> Self {
        self.level.remove(key);
        self
    }

    /// Finish the `{Level: {...}}` tree.
    pub fn build(mut self) -> Value {
        self.level
            .entry("Entities".to_string())
            .or_insert(Value::List(self.entities));
        compound([("Level", Value::Compound(self.level))])
    }
}

fn doubles(values: &[f64]) -> Value {
    Value::List(values.iter().map(|&v| Value::Double(v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alphaworld_world::{decode_chunk, decode_entity, decode_metadata};

    #[test]
    fn level_dat_tree_decodes_back() {
        let meta = WorldMetadata {
            random_seed: -9,
            ..WorldMetadata::default()
        };
        assert_eq!(decode_metadata(&level_dat_tree(&meta)).unwrap(), meta);
    }

    #[test]
    fn entity_tree_decodes() {
        let entity = decode_entity(&EntityTree::new("Item").age(5).item(Item::new(3, 1, 0)).build())
            .unwrap();
        assert_eq!(entity.age, Some(5));
        assert_eq!(entity.item, Some(Item::new(3, 1, 0)));
    }

    #[test]
    fn chunk_tree_decodes() {
        let chunk = decode_chunk(
            &ChunkTree::new(ChunkPos::new(4, -2))
                .block(1, 2, 3, 7)
                .entity(EntityTree::new("Pig"))
                .build(),
        )
        .unwrap();
        assert_eq!(chunk.position(), ChunkPos::new(4, -2));
        assert_eq!(chunk.level.block(1, 2, 3), 7);
        assert_eq!(chunk.entities().len(), 1);
    }
}
