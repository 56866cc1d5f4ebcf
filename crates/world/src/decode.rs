//! Projection of untyped tagged trees onto the typed world model.
//!
//! Every field is read through [`Compound`], which checks the tag kind against
//! what the schema expects and names the offending field on failure.

use std::collections::HashMap;
use std::fmt;

use alphaworld_core::{Entity, Euler, Item, Physics, Position, Velocity};
use fastnbt::Value;
use thiserror::Error;
use tracing::warn;

use crate::chunk::{Chunk, Level, CHUNK_VOLUME, HEIGHTMAP_LEN, NIBBLE_ARRAY_LEN};
use crate::metadata::WorldMetadata;

/// Tag kinds of the tagged-tree format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    IntArray,
    LongArray,
    List,
    Compound,
}

impl TagKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Byte(_) => Self::Byte,
            Value::Short(_) => Self::Short,
            Value::Int(_) => Self::Int,
            Value::Long(_) => Self::Long,
            Value::Float(_) => Self::Float,
            Value::Double(_) => Self::Double,
            Value::String(_) => Self::String,
            Value::ByteArray(_) => Self::ByteArray,
            Value::IntArray(_) => Self::IntArray,
            Value::LongArray(_) => Self::LongArray,
            Value::List(_) => Self::List,
            Value::Compound(_) => Self::Compound,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::ByteArray => "byte array",
            Self::IntArray => "int array",
            Self::LongArray => "long array",
            Self::List => "list",
            Self::Compound => "compound",
        };
        f.write_str(name)
    }
}

/// Schema violations found while decoding a tagged tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field `{field}`")]
    MissingField { field: String },
    #[error("field `{field}` is a {actual}, expected {expected}")]
    UnexpectedFieldType {
        field: String,
        expected: TagKind,
        actual: TagKind,
    },
    #[error("field `{field}` holds {actual} bytes, expected {expected}")]
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("list `{field}` has {actual} elements, expected {expected}")]
    ListLength {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl DecodeError {
    /// Path of the field the error is about, e.g. `Entities[2].Pos[1]`.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field }
            | Self::UnexpectedFieldType { field, .. }
            | Self::ArrayLength { field, .. }
            | Self::ListLength { field, .. } => field,
        }
    }
}

type DecodeResult<T> = Result<T, DecodeError>;

/// Typed view over a compound tag.
#[derive(Debug, Clone, Copy)]
pub struct Compound<'a> {
    entries: &'a HashMap<String, Value>,
    path: &'a str,
}

impl<'a> Compound<'a> {
    /// View `value` as a compound, `path` naming it in errors ("" for the root).
    pub fn new(value: &'a Value, path: &'a str) -> DecodeResult<Self> {
        match value {
            Value::Compound(entries) => Ok(Self { entries, path }),
            other => Err(DecodeError::UnexpectedFieldType {
                field: if path.is_empty() {
                    "<root>".to_string()
                } else {
                    path.to_string()
                },
                expected: TagKind::Compound,
                actual: TagKind::of(other),
            }),
        }
    }

    fn field(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// Raw value of a required key, any kind.
    pub fn value(&self, key: &str) -> DecodeResult<&'a Value> {
        self.entries
            .get(key)
            .ok_or_else(|| DecodeError::MissingField {
                field: self.field(key),
            })
    }

    fn required<T>(
        &self,
        key: &str,
        expected: TagKind,
        pick: impl Fn(&'a Value) -> Option<T>,
    ) -> DecodeResult<T> {
        let value = self.value(key)?;
        pick(value).ok_or_else(|| DecodeError::UnexpectedFieldType {
            field: self.field(key),
            expected,
            actual: TagKind::of(value),
        })
    }

    /// Absent keys are `None`; so are keys of the wrong kind, with a warning.
    fn optional<T>(
        &self,
        key: &str,
        expected: TagKind,
        pick: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<T> {
        let value = self.entries.get(key)?;
        let picked = pick(value);
        if picked.is_none() {
            warn!(
                field = %self.field(key),
                %expected,
                actual = %TagKind::of(value),
                "ignoring optional field of unexpected type"
            );
        }
        picked
    }

    pub fn byte(&self, key: &str) -> DecodeResult<i8> {
        self.required(key, TagKind::Byte, as_byte)
    }

    pub fn short(&self, key: &str) -> DecodeResult<i16> {
        self.required(key, TagKind::Short, as_short)
    }

    pub fn int(&self, key: &str) -> DecodeResult<i32> {
        self.required(key, TagKind::Int, |v| match v {
            Value::Int(n) => Some(*n),
            _ => None,
        })
    }

    pub fn long(&self, key: &str) -> DecodeResult<i64> {
        self.required(key, TagKind::Long, |v| match v {
            Value::Long(n) => Some(*n),
            _ => None,
        })
    }

    pub fn float(&self, key: &str) -> DecodeResult<f32> {
        self.required(key, TagKind::Float, as_float)
    }

    pub fn string(&self, key: &str) -> DecodeResult<&'a str> {
        self.required(key, TagKind::String, |v| match v {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    pub fn list(&self, key: &str) -> DecodeResult<&'a [Value]> {
        self.required(key, TagKind::List, |v| match v {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        })
    }

    pub fn compound(&self, key: &str) -> DecodeResult<&'a Value> {
        self.required(key, TagKind::Compound, |v| match v {
            Value::Compound(_) => Some(v),
            _ => None,
        })
    }

    /// Byte array of exactly `len` bytes.
    pub fn byte_array(&self, key: &str, len: usize) -> DecodeResult<Vec<u8>> {
        let bytes = self.required(key, TagKind::ByteArray, |v| match v {
            Value::ByteArray(array) => Some(array.iter().map(|&b| b as u8).collect::<Vec<u8>>()),
            _ => None,
        })?;
        if bytes.len() != len {
            return Err(DecodeError::ArrayLength {
                field: self.field(key),
                expected: len,
                actual: bytes.len(),
            });
        }
        Ok(bytes)
    }

    /// Fixed-length list whose elements are all of one kind, read positionally.
    pub fn fixed_list<T: Copy + Default, const N: usize>(
        &self,
        key: &str,
        expected: TagKind,
        pick: impl Fn(&'a Value) -> Option<T>,
    ) -> DecodeResult<[T; N]> {
        let items = self.list(key)?;
        if items.len() != N {
            return Err(DecodeError::ListLength {
                field: self.field(key),
                expected: N,
                actual: items.len(),
            });
        }
        let mut out = [T::default(); N];
        for (index, (slot, item)) in out.iter_mut().zip(items).enumerate() {
            *slot = pick(item).ok_or_else(|| DecodeError::UnexpectedFieldType {
                field: format!("{}[{}]", self.field(key), index),
                expected,
                actual: TagKind::of(item),
            })?;
        }
        Ok(out)
    }

    pub fn optional_short(&self, key: &str) -> Option<i16> {
        self.optional(key, TagKind::Short, as_short)
    }

    pub fn optional_compound(&self, key: &str) -> Option<&'a Value> {
        self.optional(key, TagKind::Compound, |v| match v {
            Value::Compound(_) => Some(v),
            _ => None,
        })
    }
}

fn as_byte(value: &Value) -> Option<i8> {
    match value {
        Value::Byte(n) => Some(*n),
        _ => None,
    }
}

fn as_short(value: &Value) -> Option<i16> {
    match value {
        Value::Short(n) => Some(*n),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f32> {
    match value {
        Value::Float(n) => Some(*n),
        _ => None,
    }
}

fn as_double(value: &Value) -> Option<f64> {
    match value {
        Value::Double(n) => Some(*n),
        _ => None,
    }
}

/// Decode the root of level.dat.
pub fn decode_metadata(root: &Value) -> DecodeResult<WorldMetadata> {
    let root = Compound::new(root, "")?;
    // Fields are named without the `Data.` prefix.
    let data = Compound::new(root.compound("Data")?, "")?;
    Ok(WorldMetadata {
        snow_covered: data.byte("SnowCovered")?,
        time: data.long("Time")?,
        spawn_x: data.int("SpawnX")?,
        spawn_y: data.int("SpawnY")?,
        spawn_z: data.int("SpawnZ")?,
        last_played: data.long("LastPlayed")?,
        size_on_disk: data.long("SizeOnDisk")?,
        random_seed: data.long("RandomSeed")?,
    })
}

/// Decode the root of a chunk file.
pub fn decode_chunk(root: &Value) -> DecodeResult<Chunk> {
    let root = Compound::new(root, "")?;
    let level = Compound::new(root.compound("Level")?, "")?;
    Ok(Chunk::new(Level {
        blocks: level.byte_array("Blocks", CHUNK_VOLUME)?,
        data: level.byte_array("Data", NIBBLE_ARRAY_LEN)?,
        sky_light: level.byte_array("SkyLight", NIBBLE_ARRAY_LEN)?,
        height_map: level.byte_array("HeightMap", HEIGHTMAP_LEN)?,
        block_light: level.byte_array("BlockLight", NIBBLE_ARRAY_LEN)?,
        entities: decode_entity_list(level.list("Entities")?)?,
        tile_entities: level.value("TileEntities")?.clone(),
        last_update: level.long("LastUpdate")?,
        x_pos: level.int("xPos")?,
        // Legacy readers filled this from "xPos" as well.
        z_pos: level.int("zPos")?,
        terrain_populated: level.byte("TerrainPopulated")?,
    }))
}

fn decode_entity_list(items: &[Value]) -> DecodeResult<Vec<Entity>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let path = format!("Entities[{index}]");
            decode_entity_at(item, &path)
        })
        .collect()
}

/// Decode a single entity compound.
pub fn decode_entity(value: &Value) -> DecodeResult<Entity> {
    decode_entity_at(value, "")
}

fn decode_entity_at(value: &Value, path: &str) -> DecodeResult<Entity> {
    let entity = Compound::new(value, path)?;
    let [x, y, z] = entity.fixed_list::<f64, 3>("Pos", TagKind::Double, as_double)?;
    let [dx, dy, dz] = entity.fixed_list::<f64, 3>("Motion", TagKind::Double, as_double)?;
    // Saved as [pitch, yaw].
    let rotation = entity.fixed_list::<f32, 2>("Rotation", TagKind::Float, as_float)?;

    let item = match entity.optional_compound("Item") {
        Some(value) => {
            let item_path = if path.is_empty() {
                "Item".to_string()
            } else {
                format!("{path}.Item")
            };
            Some(decode_item_at(value, &item_path)?)
        }
        None => None,
    };

    Ok(Entity {
        id: entity.string("id")?.to_string(),
        on_ground: entity.byte("OnGround")?,
        air: entity.short("Air")?,
        fire: entity.short("Fire")?,
        fall_distance: entity.float("FallDistance")?,
        physics: Physics {
            position: Position { x, y, z },
            velocity: Velocity { dx, dy, dz },
            euler: Euler::from_yaw_pitch(rotation[1], rotation[0]),
        },
        health: entity.optional_short("Health"),
        age: entity.optional_short("Age"),
        tile: entity.optional_short("Tile"),
        item,
    })
}

/// Decode an item stack compound.
pub fn decode_item(value: &Value) -> DecodeResult<Item> {
    decode_item_at(value, "")
}

fn decode_item_at(value: &Value, path: &str) -> DecodeResult<Item> {
    let item = Compound::new(value, path)?;
    Ok(Item::new(
        item.short("id")?,
        item.byte("Count")?,
        item.short("Damage")?,
    ))
}
