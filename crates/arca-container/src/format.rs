//! The on-disk container format.
//!
//! Layout of a container file:
//!
//! ```text
//! magic "ARCF" | version u32 BE | manifest_len u64 BE | manifest (bincode)
//! | data region (concatenated stored slots) | blake3 checksum (32 bytes)
//! ```
//!
//! The manifest is the serialized group/dataset tree; each dataset records
//! its descriptor history plus one `SlotRecord` per stored slot with offset
//! (relative to the data region), stored and raw lengths, and a CRC32 over
//! the stored bytes. Slots of a dataset whose live compression level is
//! non-zero are zstd-compressed. The trailing checksum covers everything
//! before it and is verified on every decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ContainerError, ContainerResult};
use crate::node::{Dataset, Descriptor, Group};

pub(crate) const MAGIC: &[u8; 4] = b"ARCF";
pub(crate) const VERSION: u32 = 1;
const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = 4 + 4 + 8;

#[derive(Serialize, Deserialize)]
struct SlotRecord {
    offset: u64,
    stored_len: u64,
    raw_len: u64,
    crc32: u32,
}

#[derive(Serialize, Deserialize)]
struct ManifestDataset {
    history: Vec<Descriptor>,
    slots: Vec<SlotRecord>,
}

#[derive(Default, Serialize, Deserialize)]
struct ManifestGroup {
    groups: BTreeMap<String, ManifestGroup>,
    datasets: BTreeMap<String, ManifestDataset>,
}

/// Serialize a node tree into complete container-file bytes.
pub fn encode(root: &Group) -> ContainerResult<Vec<u8>> {
    let mut data = Vec::new();
    let manifest = encode_group(root, &mut data)?;
    let manifest_bytes = bincode::serialize(&manifest)
        .map_err(|e| ContainerError::Serialization(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + manifest_bytes.len() + data.len() + CHECKSUM_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_be_bytes());
    out.extend_from_slice(&(manifest_bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(&manifest_bytes);
    out.extend_from_slice(&data);

    let checksum = *blake3::hash(&out).as_bytes();
    out.extend_from_slice(&checksum);
    Ok(out)
}

fn encode_group(group: &Group, data: &mut Vec<u8>) -> ContainerResult<ManifestGroup> {
    let mut manifest = ManifestGroup::default();
    for (name, child) in group.groups() {
        manifest
            .groups
            .insert(name.clone(), encode_group(child, data)?);
    }
    for (name, ds) in group.datasets() {
        manifest
            .datasets
            .insert(name.clone(), encode_dataset(ds, data)?);
    }
    Ok(manifest)
}

fn encode_dataset(ds: &Dataset, data: &mut Vec<u8>) -> ContainerResult<ManifestDataset> {
    let level = ds.dtype().compression;
    let mut records = Vec::with_capacity(ds.len());
    for raw in ds.slots() {
        let stored = if level > 0 {
            zstd::encode_all(raw.as_slice(), level as i32)
                .map_err(|e| ContainerError::CompressionFailed(e.to_string()))?
        } else {
            raw.clone()
        };
        records.push(SlotRecord {
            offset: data.len() as u64,
            stored_len: stored.len() as u64,
            raw_len: raw.len() as u64,
            crc32: crc32fast::hash(&stored),
        });
        data.extend_from_slice(&stored);
    }
    Ok(ManifestDataset {
        history: ds.describe().to_vec(),
        slots: records,
    })
}

/// Parse complete container-file bytes back into a node tree.
pub fn decode(bytes: &[u8]) -> ContainerResult<Group> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(ContainerError::Corrupt {
            reason: "file too short for header and checksum".into(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(ContainerError::InvalidMagic {
            expected: String::from_utf8_lossy(MAGIC).into_owned(),
            actual: String::from_utf8_lossy(&bytes[0..4]).into_owned(),
        });
    }
    let version = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(ContainerError::UnsupportedVersion(version));
    }

    let body_len = bytes.len() - CHECKSUM_LEN;
    let stored_checksum = &bytes[body_len..];
    let computed = *blake3::hash(&bytes[..body_len]).as_bytes();
    if stored_checksum != &computed[..] {
        return Err(ContainerError::ChecksumMismatch);
    }

    let manifest_len = u64::from_be_bytes(bytes[8..16].try_into().unwrap()) as usize;
    let manifest_end = HEADER_LEN
        .checked_add(manifest_len)
        .filter(|end| *end <= body_len)
        .ok_or(ContainerError::Corrupt {
            reason: "manifest length exceeds file size".into(),
        })?;
    let manifest: ManifestGroup = bincode::deserialize(&bytes[HEADER_LEN..manifest_end])
        .map_err(|e| ContainerError::Serialization(e.to_string()))?;

    let data = &bytes[manifest_end..body_len];
    decode_group(&manifest, data, "/")
}

fn decode_group(manifest: &ManifestGroup, data: &[u8], path: &str) -> ContainerResult<Group> {
    let mut group = Group::new();
    for (name, child) in &manifest.groups {
        let child_path = join(path, name);
        group.insert_group(name.clone(), decode_group(child, data, &child_path)?);
    }
    for (name, ds) in &manifest.datasets {
        let ds_path = join(path, name);
        group.insert_dataset(name.clone(), decode_dataset(ds, data, &ds_path)?);
    }
    Ok(group)
}

fn decode_dataset(manifest: &ManifestDataset, data: &[u8], path: &str) -> ContainerResult<Dataset> {
    let current = manifest
        .history
        .last()
        .ok_or_else(|| ContainerError::Corrupt {
            reason: format!("dataset {path} has an empty descriptor history"),
        })?;
    let level = current.dtype.compression;

    let mut slots = Vec::with_capacity(manifest.slots.len());
    for record in &manifest.slots {
        let start = record.offset as usize;
        let end = start
            .checked_add(record.stored_len as usize)
            .filter(|e| *e <= data.len())
            .ok_or_else(|| ContainerError::Corrupt {
                reason: format!("slot of {path} points outside the data region"),
            })?;
        let stored = &data[start..end];
        if crc32fast::hash(stored) != record.crc32 {
            return Err(ContainerError::CrcMismatch {
                path: path.to_string(),
            });
        }
        let raw = if level > 0 {
            zstd::decode_all(stored)
                .map_err(|e| ContainerError::DecompressionFailed(e.to_string()))?
        } else {
            stored.to_vec()
        };
        if raw.len() as u64 != record.raw_len {
            return Err(ContainerError::Corrupt {
                reason: format!("slot of {path} decoded to an unexpected length"),
            });
        }
        slots.push(raw);
    }
    Ok(Dataset::from_parts(manifest.history.clone(), slots))
}

fn join(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{name}")
    } else {
        format!("{base}/{name}")
    }
}
