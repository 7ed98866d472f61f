//! The in-memory node tree: groups and datasets.
//!
//! A [`Group`] maps child names to sub-groups and datasets; names are unique
//! across both maps. A [`Dataset`] holds zero or more fixed-shape slots plus
//! the history of storage configurations it has been created with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arca_types::{TypeDescriptor, TypeError};

use crate::error::{ContainerError, ContainerResult};

/// One storage configuration of a dataset: per-slot type, current slot
/// count, and whether the dataset grows by appending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Element kind, per-slot shape, and compression level.
    pub dtype: TypeDescriptor,
    /// Number of slots stored under this configuration.
    pub size: u64,
    /// Whether the dataset is an extensible list of arrays.
    pub expandable: bool,
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.expandable {
            write!(f, "{} x{} (expandable)", self.dtype, self.size)
        } else {
            write!(f, "{}", self.dtype)
        }
    }
}

/// An array-valued leaf node.
///
/// A non-expandable dataset owns exactly one slot, allocated (zero-filled)
/// at creation. An expandable dataset starts empty and grows one slot per
/// append. The descriptor history records every configuration the dataset
/// has been created with; the last entry is the live one.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    history: Vec<Descriptor>,
    slots: Vec<Vec<u8>>,
}

impl Dataset {
    /// Create a dataset with the given per-slot type.
    pub fn new(dtype: TypeDescriptor, expandable: bool) -> Self {
        let slots = if expandable {
            Vec::new()
        } else {
            vec![vec![0u8; dtype.slot_bytes() as usize]]
        };
        let size = slots.len() as u64;
        Self {
            history: vec![Descriptor {
                dtype,
                size,
                expandable,
            }],
            slots,
        }
    }

    /// Rebuild a dataset from decoded parts (format layer).
    pub(crate) fn from_parts(history: Vec<Descriptor>, slots: Vec<Vec<u8>>) -> Self {
        Self { history, slots }
    }

    /// The live storage configuration.
    pub fn current(&self) -> &Descriptor {
        // The history is never empty: every constructor seeds one entry.
        &self.history[self.history.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Descriptor {
        let last = self.history.len() - 1;
        &mut self.history[last]
    }

    /// The live per-slot type.
    pub fn dtype(&self) -> &TypeDescriptor {
        &self.current().dtype
    }

    /// All storage configurations this dataset has been created with,
    /// oldest first. Calling this twice without intervening writes returns
    /// identical sequences.
    pub fn describe(&self) -> &[Descriptor] {
        &self.history
    }

    /// Whether the dataset grows by appending.
    pub fn is_expandable(&self) -> bool {
        self.current().expandable
    }

    /// Current number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the dataset holds no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total raw bytes across all slots.
    pub fn raw_bytes(&self) -> u64 {
        self.slots.iter().map(|s| s.len() as u64).sum()
    }

    pub(crate) fn slots(&self) -> &[Vec<u8>] {
        &self.slots
    }

    fn check_compatible(&self, requested: &TypeDescriptor) -> ContainerResult<()> {
        if !self.dtype().is_compatible(requested) {
            return Err(ContainerError::TypeMismatch {
                stored: self.dtype().to_string(),
                requested: requested.to_string(),
            });
        }
        Ok(())
    }

    fn check_length(&self, bytes: &[u8]) -> ContainerResult<()> {
        let expected = self.dtype().slot_bytes() as usize;
        if bytes.len() != expected {
            return Err(TypeError::LengthMismatch {
                expected,
                actual: bytes.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Read slot `pos`, validating the requested type against the stored
    /// descriptor first.
    pub fn read_slot(&self, pos: usize, requested: &TypeDescriptor) -> ContainerResult<Vec<u8>> {
        self.check_compatible(requested)?;
        self.slots
            .get(pos)
            .cloned()
            .ok_or(ContainerError::IndexOutOfRange {
                index: pos,
                len: self.slots.len(),
            })
    }

    /// Overwrite slot `pos` in place. The slot must already exist; use
    /// [`Dataset::extend_slot`] to grow an expandable dataset.
    pub fn write_slot(
        &mut self,
        pos: usize,
        source: &TypeDescriptor,
        bytes: &[u8],
    ) -> ContainerResult<()> {
        self.check_compatible(source)?;
        self.check_length(bytes)?;
        let len = self.slots.len();
        match self.slots.get_mut(pos) {
            Some(slot) => {
                slot.clear();
                slot.extend_from_slice(bytes);
                Ok(())
            }
            None => Err(ContainerError::IndexOutOfRange { index: pos, len }),
        }
    }

    /// Append a slot to an expandable dataset.
    pub fn extend_slot(&mut self, source: &TypeDescriptor, bytes: &[u8]) -> ContainerResult<()> {
        if !self.is_expandable() {
            return Err(ContainerError::NotExpandable(self.dtype().to_string()));
        }
        self.check_compatible(source)?;
        self.check_length(bytes)?;
        self.slots.push(bytes.to_vec());
        let size = self.slots.len() as u64;
        self.current_mut().size = size;
        Ok(())
    }

    /// Re-create the dataset in place with a new storage configuration.
    ///
    /// If the new per-slot kind and shape equal the current ones and the
    /// expandable flag is unchanged, stored slots are preserved and only the
    /// compression level is updated. Any change of kind, shape, or list-ness
    /// discards all stored slots and appends a fresh history entry.
    pub fn redefine(&mut self, dtype: TypeDescriptor, expandable: bool) {
        if self.dtype().is_compatible(&dtype) && self.is_expandable() == expandable {
            self.current_mut().dtype.compression = dtype.compression;
            return;
        }
        self.slots = if expandable {
            Vec::new()
        } else {
            vec![vec![0u8; dtype.slot_bytes() as usize]]
        };
        let size = self.slots.len() as u64;
        self.history.push(Descriptor {
            dtype,
            size,
            expandable,
        });
    }
}

/// A namespace node: named child groups and datasets, names unique across
/// both maps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    groups: BTreeMap<String, Group>,
    datasets: BTreeMap<String, Dataset>,
}

impl Group {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Immediate child groups, name to node.
    pub fn groups(&self) -> &BTreeMap<String, Group> {
        &self.groups
    }

    /// Immediate child datasets, name to node.
    pub fn datasets(&self) -> &BTreeMap<String, Dataset> {
        &self.datasets
    }

    /// Look up an immediate child group.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Look up an immediate child dataset.
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    pub(crate) fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    pub(crate) fn dataset_mut(&mut self, name: &str) -> Option<&mut Dataset> {
        self.datasets.get_mut(name)
    }

    /// Whether `name` is taken by either kind of child.
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name) || self.datasets.contains_key(name)
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.datasets.is_empty()
    }

    /// Insert a child group, replacing any existing entry under `name`.
    pub(crate) fn insert_group(&mut self, name: String, group: Group) {
        self.datasets.remove(&name);
        self.groups.insert(name, group);
    }

    /// Insert a child dataset, replacing any existing entry under `name`.
    pub(crate) fn insert_dataset(&mut self, name: String, dataset: Dataset) {
        self.groups.remove(&name);
        self.datasets.insert(name, dataset);
    }

    pub(crate) fn remove_dataset(&mut self, name: &str) -> Option<Dataset> {
        self.datasets.remove(name)
    }

    /// Ensure a child group named `name` exists, creating it if absent.
    /// Fails if the name is taken by a dataset.
    pub(crate) fn ensure_group(&mut self, name: &str) -> ContainerResult<&mut Group> {
        if self.datasets.contains_key(name) {
            return Err(ContainerError::NotAGroup(name.to_string()));
        }
        Ok(self.groups.entry(name.to_string()).or_default())
    }

    /// Counts of (groups, datasets, slots, raw bytes) over the whole subtree.
    pub fn stats(&self) -> (u64, u64, u64, u64) {
        let mut groups = 0;
        let mut datasets = 0;
        let mut slots = 0;
        let mut bytes = 0;
        for child in self.groups.values() {
            let (g, d, s, b) = child.stats();
            groups += 1 + g;
            datasets += d;
            slots += s;
            bytes += b;
        }
        for ds in self.datasets.values() {
            datasets += 1;
            slots += ds.len() as u64;
            bytes += ds.raw_bytes();
        }
        (groups, datasets, slots, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arca_types::ElementKind;

    fn f64_vec(shape: u64) -> TypeDescriptor {
        TypeDescriptor::new(ElementKind::Float64, vec![shape])
    }

    fn bytes_of(values: &[f64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn fixed_dataset_has_one_zeroed_slot() {
        let ds = Dataset::new(f64_vec(3), false);
        assert_eq!(ds.len(), 1);
        assert!(!ds.is_expandable());
        let slot = ds.read_slot(0, &f64_vec(3)).unwrap();
        assert_eq!(slot, vec![0u8; 24]);
    }

    #[test]
    fn expandable_dataset_starts_empty() {
        let ds = Dataset::new(f64_vec(2), true);
        assert_eq!(ds.len(), 0);
        assert!(ds.is_expandable());
        assert_eq!(ds.current().size, 0);
    }

    #[test]
    fn write_then_read_slot() {
        let mut ds = Dataset::new(f64_vec(3), false);
        let data = bytes_of(&[1.0, 2.0, 3.0]);
        ds.write_slot(0, &f64_vec(3), &data).unwrap();
        assert_eq!(ds.read_slot(0, &f64_vec(3)).unwrap(), data);
    }

    #[test]
    fn read_rejects_incompatible_type() {
        let ds = Dataset::new(f64_vec(3), false);
        let err = ds.read_slot(0, &f64_vec(4)).unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
        let err = ds
            .read_slot(0, &TypeDescriptor::new(ElementKind::Float32, vec![3]))
            .unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn write_type_mismatch_leaves_content() {
        let mut ds = Dataset::new(f64_vec(3), false);
        let data = bytes_of(&[1.0, 2.0, 3.0]);
        ds.write_slot(0, &f64_vec(3), &data).unwrap();

        let bad = bytes_of(&[9.0, 9.0]);
        let err = ds.write_slot(0, &f64_vec(2), &bad).unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
        assert_eq!(ds.read_slot(0, &f64_vec(3)).unwrap(), data);
    }

    #[test]
    fn read_out_of_range() {
        let ds = Dataset::new(f64_vec(1), false);
        let err = ds.read_slot(1, &f64_vec(1)).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::IndexOutOfRange { index: 1, len: 1 }
        ));
    }

    #[test]
    fn extend_grows_list() {
        let mut ds = Dataset::new(f64_vec(2), true);
        for i in 0..3 {
            let data = bytes_of(&[i as f64, i as f64 + 0.5]);
            ds.extend_slot(&f64_vec(2), &data).unwrap();
        }
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.current().size, 3);
        assert_eq!(
            ds.read_slot(1, &f64_vec(2)).unwrap(),
            bytes_of(&[1.0, 1.5])
        );
    }

    #[test]
    fn extend_rejected_on_fixed_dataset() {
        let mut ds = Dataset::new(f64_vec(2), false);
        let err = ds.extend_slot(&f64_vec(2), &bytes_of(&[0.0, 0.0])).unwrap_err();
        assert!(matches!(err, ContainerError::NotExpandable(_)));
    }

    #[test]
    fn redefine_same_type_preserves_slots() {
        let mut ds = Dataset::new(f64_vec(3), false);
        let data = bytes_of(&[1.0, 2.0, 3.0]);
        ds.write_slot(0, &f64_vec(3), &data).unwrap();

        ds.redefine(f64_vec(3).with_compression(5), false);
        assert_eq!(ds.describe().len(), 1);
        assert_eq!(ds.dtype().compression, 5);
        assert_eq!(ds.read_slot(0, &f64_vec(3)).unwrap(), data);
    }

    #[test]
    fn redefine_new_shape_discards_slots() {
        let mut ds = Dataset::new(f64_vec(3), false);
        ds.write_slot(0, &f64_vec(3), &bytes_of(&[1.0, 2.0, 3.0]))
            .unwrap();

        ds.redefine(f64_vec(5), false);
        assert_eq!(ds.describe().len(), 2);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.read_slot(0, &f64_vec(5)).unwrap(), vec![0u8; 40]);
        // The old configuration is still visible in the history.
        assert_eq!(ds.describe()[0].dtype, f64_vec(3));
    }

    #[test]
    fn redefine_to_expandable_starts_empty() {
        let mut ds = Dataset::new(f64_vec(3), false);
        ds.redefine(f64_vec(3), true);
        assert!(ds.is_expandable());
        assert_eq!(ds.len(), 0);
        assert_eq!(ds.describe().len(), 2);
    }

    #[test]
    fn group_name_uniqueness_across_kinds() {
        let mut g = Group::new();
        g.insert_dataset("x".into(), Dataset::new(f64_vec(1), false));
        assert!(g.dataset("x").is_some());

        g.insert_group("x".into(), Group::new());
        assert!(g.dataset("x").is_none());
        assert!(g.group("x").is_some());
    }

    #[test]
    fn ensure_group_rejects_dataset_name() {
        let mut g = Group::new();
        g.insert_dataset("leaf".into(), Dataset::new(f64_vec(1), false));
        let err = g.ensure_group("leaf").unwrap_err();
        assert!(matches!(err, ContainerError::NotAGroup(_)));
    }

    #[test]
    fn stats_cover_subtree() {
        let mut inner = Group::new();
        inner.insert_dataset("d".into(), Dataset::new(f64_vec(2), false));
        let mut root = Group::new();
        root.insert_group("g".into(), inner);
        root.insert_dataset("top".into(), Dataset::new(f64_vec(1), false));

        let (groups, datasets, slots, bytes) = root.stats();
        assert_eq!(groups, 1);
        assert_eq!(datasets, 2);
        assert_eq!(slots, 2);
        assert_eq!(bytes, 24);
    }
}
