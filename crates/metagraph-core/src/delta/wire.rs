//! Binary transport for deltas.
//!
//! Deltas travel between peers that may not share the record in question,
//! so every payload value is self-describing: the tagged value form of the
//! binary codec. Structure bytes are fixed per variant; counts and
//! indices are varints.

use crate::{
    codec::binary::{BinaryReader, BinaryWriter},
    delta::{
        BagItemDelta, Delta, ListItemDelta, MapItemDelta, ObjectDelta, ScalarDelta, SetItemDelta,
    },
    error::MetadataError,
    registry::Registry,
};

const DELTA_SCALAR: u8 = 0;
const DELTA_OBJECT: u8 = 1;
const DELTA_LIST: u8 = 2;
const DELTA_SET: u8 = 3;
const DELTA_MAP: u8 = 4;
const DELTA_BAG: u8 = 5;

const ITEM_ADDED: u8 = 0;
const ITEM_REMOVED: u8 = 1;
const ITEM_CHANGED: u8 = 2;

/// Serialize a delta to its binary transport form.
pub fn encode_delta(registry: &Registry, delta: &Delta) -> Result<Vec<u8>, MetadataError> {
    let mut writer = BinaryWriter::new(registry);
    write_delta(&mut writer, delta)?;

    Ok(writer.into_bytes())
}

/// Decode a delta from its binary transport form.
pub fn decode_delta(registry: &Registry, bytes: &[u8]) -> Result<Delta, MetadataError> {
    let mut reader = BinaryReader::new(registry, bytes);
    let delta = read_delta(&mut reader)?;
    if !reader.at_end() {
        return Err(MetadataError::codec_corruption(
            "trailing bytes after delta payload",
        ));
    }

    Ok(delta)
}

fn write_delta(writer: &mut BinaryWriter<'_>, delta: &Delta) -> Result<(), MetadataError> {
    match delta {
        Delta::Scalar(scalar) => {
            writer.push_byte(DELTA_SCALAR);
            writer.write_tagged(&scalar.old)?;
            writer.write_tagged(&scalar.new)
        }
        Delta::Object(object) => {
            writer.push_byte(DELTA_OBJECT);
            writer.push_varint(object.entries.len() as u64);
            for (index, entry) in &object.entries {
                writer.push_varint(u64::from(*index));
                write_delta(writer, entry)?;
            }
            Ok(())
        }
        Delta::List(items) => {
            writer.push_byte(DELTA_LIST);
            writer.push_varint(items.len() as u64);
            for item in items {
                match item {
                    ListItemDelta::Added { index, value } => {
                        writer.push_byte(ITEM_ADDED);
                        writer.push_varint(*index as u64);
                        writer.write_tagged(value)?;
                    }
                    ListItemDelta::Removed { index, value } => {
                        writer.push_byte(ITEM_REMOVED);
                        writer.push_varint(*index as u64);
                        writer.write_tagged(value)?;
                    }
                    ListItemDelta::Changed { index, delta } => {
                        writer.push_byte(ITEM_CHANGED);
                        writer.push_varint(*index as u64);
                        write_delta(writer, delta)?;
                    }
                }
            }
            Ok(())
        }
        Delta::Set(items) => {
            writer.push_byte(DELTA_SET);
            writer.push_varint(items.len() as u64);
            for item in items {
                match item {
                    SetItemDelta::Added(value) => {
                        writer.push_byte(ITEM_ADDED);
                        writer.write_tagged(value)?;
                    }
                    SetItemDelta::Removed(value) => {
                        writer.push_byte(ITEM_REMOVED);
                        writer.write_tagged(value)?;
                    }
                }
            }
            Ok(())
        }
        Delta::Map(items) => {
            writer.push_byte(DELTA_MAP);
            writer.push_varint(items.len() as u64);
            for item in items {
                match item {
                    MapItemDelta::Added { key, value } => {
                        writer.push_byte(ITEM_ADDED);
                        writer.write_tagged(key)?;
                        writer.write_tagged(value)?;
                    }
                    MapItemDelta::Removed { key, value } => {
                        writer.push_byte(ITEM_REMOVED);
                        writer.write_tagged(key)?;
                        writer.write_tagged(value)?;
                    }
                    MapItemDelta::Changed { key, delta } => {
                        writer.push_byte(ITEM_CHANGED);
                        writer.write_tagged(key)?;
                        write_delta(writer, delta)?;
                    }
                }
            }
            Ok(())
        }
        Delta::Bag(items) => {
            writer.push_byte(DELTA_BAG);
            writer.push_varint(items.len() as u64);
            for item in items {
                match item {
                    BagItemDelta::Added(value) => {
                        writer.push_byte(ITEM_ADDED);
                        writer.write_tagged(value)?;
                    }
                    BagItemDelta::Removed(value) => {
                        writer.push_byte(ITEM_REMOVED);
                        writer.write_tagged(value)?;
                    }
                }
            }
            Ok(())
        }
    }
}

fn read_delta(reader: &mut BinaryReader<'_>) -> Result<Delta, MetadataError> {
    match reader.pull_byte()? {
        DELTA_SCALAR => {
            let old = reader.read_tagged()?;
            let new = reader.read_tagged()?;
            Ok(Delta::Scalar(ScalarDelta { old, new }))
        }
        DELTA_OBJECT => {
            let count = reader.pull_len()?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let index = u32::try_from(reader.pull_varint()?).map_err(|_| {
                    MetadataError::codec_corruption("property index out of range")
                })?;
                entries.push((index, read_delta(reader)?));
            }
            Ok(Delta::Object(ObjectDelta { entries }))
        }
        DELTA_LIST => {
            let count = reader.pull_len()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let kind = reader.pull_byte()?;
                let index = reader.pull_len()?;
                items.push(match kind {
                    ITEM_ADDED => ListItemDelta::Added {
                        index,
                        value: reader.read_tagged()?,
                    },
                    ITEM_REMOVED => ListItemDelta::Removed {
                        index,
                        value: reader.read_tagged()?,
                    },
                    ITEM_CHANGED => ListItemDelta::Changed {
                        index,
                        delta: read_delta(reader)?,
                    },
                    other => return Err(unknown_item(other)),
                });
            }
            Ok(Delta::List(items))
        }
        DELTA_SET => {
            let count = reader.pull_len()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(match reader.pull_byte()? {
                    ITEM_ADDED => SetItemDelta::Added(reader.read_tagged()?),
                    ITEM_REMOVED => SetItemDelta::Removed(reader.read_tagged()?),
                    other => return Err(unknown_item(other)),
                });
            }
            Ok(Delta::Set(items))
        }
        DELTA_MAP => {
            let count = reader.pull_len()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                let kind = reader.pull_byte()?;
                let key = reader.read_tagged()?;
                items.push(match kind {
                    ITEM_ADDED => MapItemDelta::Added {
                        key,
                        value: reader.read_tagged()?,
                    },
                    ITEM_REMOVED => MapItemDelta::Removed {
                        key,
                        value: reader.read_tagged()?,
                    },
                    ITEM_CHANGED => MapItemDelta::Changed {
                        key,
                        delta: Box::new(read_delta(reader)?),
                    },
                    other => return Err(unknown_item(other)),
                });
            }
            Ok(Delta::Map(items))
        }
        DELTA_BAG => {
            let count = reader.pull_len()?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(match reader.pull_byte()? {
                    ITEM_ADDED => BagItemDelta::Added(reader.read_tagged()?),
                    ITEM_REMOVED => BagItemDelta::Removed(reader.read_tagged()?),
                    other => return Err(unknown_item(other)),
                });
            }
            Ok(Delta::Bag(items))
        }
        other => Err(MetadataError::codec_corruption(format!(
            "unknown delta variant byte {other}"
        ))),
    }
}

fn unknown_item(byte: u8) -> MetadataError {
    MetadataError::codec_corruption(format!("unknown delta item byte {byte}"))
}
