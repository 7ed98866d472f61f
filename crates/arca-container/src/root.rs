//! The container: one physical backing file, opened under one access mode,
//! owning the in-memory node tree.
//!
//! Every successful mutation re-serializes the whole tree and atomically
//! replaces the backing file (write to a temp file in the same directory,
//! then persist). [`Container::rescan`] is therefore a true re-read of
//! durable state, which is what the facade's rename handling relies on.

use std::path::{Path, PathBuf};

use arca_types::{path as npath, TypeDescriptor};

use crate::error::{ContainerError, ContainerResult};
use crate::format;
use crate::mode::AccessMode;
use crate::node::{Dataset, Descriptor, Group};

/// Owner of one container file and its node tree.
#[derive(Debug)]
pub struct Container {
    path: PathBuf,
    mode: AccessMode,
    root: Group,
}

impl Container {
    /// Open or create the container at `path` under the given mode.
    ///
    /// `Truncate` destroys any existing content immediately: an empty
    /// container is flushed to disk before this returns. `Exclusive` fails
    /// with `AlreadyExists` if the target is present. `ReadOnly` and
    /// `ReadWrite` require an existing, well-formed file.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> ContainerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let root = match mode {
            AccessMode::ReadOnly | AccessMode::ReadWrite => {
                let bytes = std::fs::read(&path)?;
                format::decode(&bytes)?
            }
            AccessMode::Truncate => Group::new(),
            AccessMode::Exclusive => {
                if path.exists() {
                    return Err(ContainerError::AlreadyExists(
                        path.display().to_string(),
                    ));
                }
                Group::new()
            }
        };
        let mut container = Self { path, mode, root };
        if matches!(mode, AccessMode::Truncate | AccessMode::Exclusive) {
            container.flush()?;
        }
        tracing::debug!(path = %container.path.display(), %mode, "opened container");
        Ok(container)
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The access mode this container was opened under.
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// The root group.
    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Serialize the tree and atomically replace the backing file.
    pub fn flush(&mut self) -> ContainerResult<()> {
        self.check_writable()?;
        let bytes = format::encode(&self.root)?;
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
        std::io::Write::write_all(&mut tmp, &bytes)?;
        tmp.persist(&self.path)
            .map_err(|e| ContainerError::Io(e.error))?;
        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "flushed container");
        Ok(())
    }

    /// Discard the in-memory tree and rebuild it from the physical file.
    pub fn rescan(&mut self) -> ContainerResult<()> {
        let bytes = std::fs::read(&self.path)?;
        self.root = format::decode(&bytes)?;
        tracing::debug!(path = %self.path.display(), "rescanned container");
        Ok(())
    }

    fn check_writable(&self) -> ContainerResult<()> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(ContainerError::ReadOnly)
        }
    }

    // -----------------------------------------------------------------
    // Resolution (all paths canonical absolute)
    // -----------------------------------------------------------------

    /// Resolve a group, failing `PathNotFound`/`NotAGroup`.
    pub fn group(&self, path: &str) -> ContainerResult<&Group> {
        let mut cur = &self.root;
        for seg in npath::split(path) {
            if cur.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(path.to_string()));
            }
            cur = cur
                .group(seg)
                .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))?;
        }
        Ok(cur)
    }

    fn group_mut(&mut self, path: &str) -> ContainerResult<&mut Group> {
        let mut cur = &mut self.root;
        for seg in npath::split(path) {
            if cur.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(path.to_string()));
            }
            cur = cur
                .group_mut(seg)
                .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))?;
        }
        Ok(cur)
    }

    /// Resolve a dataset, failing `PathNotFound`/`NotAGroup`/`NotADataset`.
    pub fn dataset(&self, path: &str) -> ContainerResult<&Dataset> {
        let segs = npath::split(path);
        let (name, parent) = segs
            .split_last()
            .ok_or_else(|| ContainerError::NotADataset(path.to_string()))?;
        let mut cur = &self.root;
        for seg in parent {
            if cur.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(path.to_string()));
            }
            cur = cur
                .group(seg)
                .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))?;
        }
        match cur.dataset(name) {
            Some(ds) => Ok(ds),
            None if cur.group(name).is_some() => {
                Err(ContainerError::NotADataset(path.to_string()))
            }
            None => Err(ContainerError::PathNotFound(path.to_string())),
        }
    }

    fn dataset_mut(&mut self, path: &str) -> ContainerResult<&mut Dataset> {
        let segs = npath::split(path);
        let (name, parent) = segs
            .split_last()
            .ok_or_else(|| ContainerError::NotADataset(path.to_string()))?;
        let mut cur = &mut self.root;
        for seg in parent {
            if cur.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(path.to_string()));
            }
            cur = cur
                .group_mut(seg)
                .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))?;
        }
        if cur.group(name).is_some() {
            return Err(ContainerError::NotADataset(path.to_string()));
        }
        cur.dataset_mut(name)
            .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))
    }

    /// Existence probe for a group; never fails.
    pub fn has_group(&self, path: &str) -> bool {
        self.group(path).is_ok()
    }

    /// Existence probe for a dataset; never fails.
    pub fn has_dataset(&self, path: &str) -> bool {
        self.dataset(path).is_ok()
    }

    // -----------------------------------------------------------------
    // Structural mutation
    // -----------------------------------------------------------------

    /// Create the group at `path`, creating all missing intermediate groups.
    /// Fails `NotAGroup` if any segment is taken by a dataset.
    pub fn create_group(&mut self, path: &str) -> ContainerResult<()> {
        self.check_writable()?;
        let segs: Vec<String> = npath::split(path).iter().map(|s| s.to_string()).collect();
        let mut cur = &mut self.root;
        for seg in &segs {
            npath::validate_name(seg)?;
            if cur.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(path.to_string()));
            }
            cur = cur.ensure_group(seg)?;
        }
        self.flush()
    }

    /// Create a new dataset at `path` with the given per-slot type, creating
    /// missing parent groups. Fails `AlreadyExists` if the name is taken.
    pub fn create_dataset(
        &mut self,
        path: &str,
        dtype: TypeDescriptor,
        expandable: bool,
    ) -> ContainerResult<()> {
        self.check_writable()?;
        let segs = npath::split(path);
        let (name, parent) = segs
            .split_last()
            .ok_or_else(|| ContainerError::NotADataset(path.to_string()))?;
        npath::validate_name(name)?;
        let mut cur = &mut self.root;
        for seg in parent {
            if cur.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(path.to_string()));
            }
            cur = cur.ensure_group(seg)?;
        }
        if cur.contains(name) {
            return Err(ContainerError::AlreadyExists(path.to_string()));
        }
        cur.insert_dataset(name.to_string(), Dataset::new(dtype, expandable));
        self.flush()
    }

    /// Re-create an existing dataset in place with a new storage
    /// configuration (see [`Dataset::redefine`] for the data-fate rules).
    pub fn redefine_dataset(
        &mut self,
        path: &str,
        dtype: TypeDescriptor,
        expandable: bool,
    ) -> ContainerResult<()> {
        self.check_writable()?;
        self.dataset_mut(path)?.redefine(dtype, expandable);
        self.flush()
    }

    /// Detach and deallocate the dataset at `path`.
    pub fn remove_dataset(&mut self, path: &str) -> ContainerResult<()> {
        self.check_writable()?;
        let segs = npath::split(path);
        let (name, parent_segs) = segs
            .split_last()
            .ok_or_else(|| ContainerError::NotADataset(path.to_string()))?;
        let parent_path = format!("/{}", parent_segs.join("/"));
        let parent = self.group_mut(&parent_path)?;
        if parent.group(name).is_some() {
            return Err(ContainerError::NotADataset(path.to_string()));
        }
        parent
            .remove_dataset(name)
            .ok_or_else(|| ContainerError::PathNotFound(path.to_string()))?;
        self.flush()
    }

    /// Rename the dataset at `from` to `to`, creating missing parent groups
    /// of the destination. Fails `AlreadyExists` if the destination name is
    /// taken. The destination is fully validated before the source is
    /// detached, so a failed rename leaves the tree untouched.
    pub fn rename_dataset(&mut self, from: &str, to: &str) -> ContainerResult<()> {
        self.check_writable()?;
        self.dataset(from)?;

        let to_segs = npath::split(to);
        let (to_name, to_parent) = to_segs
            .split_last()
            .ok_or_else(|| ContainerError::NotADataset(to.to_string()))?;
        npath::validate_name(to_name)?;

        // Validate the destination against the existing tree before touching
        // the source: every existing segment must be a group, and the final
        // name must be free.
        let mut probe = Some(&self.root);
        for seg in to_parent {
            let Some(g) = probe else { break };
            if g.dataset(seg).is_some() {
                return Err(ContainerError::NotAGroup(to.to_string()));
            }
            probe = g.group(seg);
        }
        if let Some(parent) = probe {
            if parent.contains(to_name) {
                return Err(ContainerError::AlreadyExists(to.to_string()));
            }
        }

        let from_segs = npath::split(from);
        let (from_name, from_parent) = from_segs
            .split_last()
            .ok_or_else(|| ContainerError::NotADataset(from.to_string()))?;
        let from_parent_path = format!("/{}", from_parent.join("/"));
        let dataset = self
            .group_mut(&from_parent_path)?
            .remove_dataset(from_name)
            .ok_or_else(|| ContainerError::PathNotFound(from.to_string()))?;

        let mut cur = &mut self.root;
        for seg in to_parent {
            cur = cur.ensure_group(seg)?;
        }
        cur.insert_dataset(to_name.to_string(), dataset);
        tracing::debug!(from, to, "renamed dataset");
        self.flush()
    }

    /// Deep-copy a group from another container's tree into the group at
    /// `dest`, under `name`. An existing same-named entry is replaced.
    pub fn copy_group(&mut self, dest: &str, name: &str, source: &Group) -> ContainerResult<()> {
        self.check_writable()?;
        npath::validate_name(name)?;
        let copied = source.clone();
        self.group_mut(dest)?.insert_group(name.to_string(), copied);
        self.flush()
    }

    /// Deep-copy a dataset from another container's tree into the group at
    /// `dest`, under `name`. An existing same-named entry is replaced.
    pub fn copy_dataset(
        &mut self,
        dest: &str,
        name: &str,
        source: &Dataset,
    ) -> ContainerResult<()> {
        self.check_writable()?;
        npath::validate_name(name)?;
        let copied = source.clone();
        self.group_mut(dest)?
            .insert_dataset(name.to_string(), copied);
        self.flush()
    }

    // -----------------------------------------------------------------
    // Slot I/O
    // -----------------------------------------------------------------

    /// The full descriptor history of the dataset at `path`.
    pub fn describe(&self, path: &str) -> ContainerResult<Vec<Descriptor>> {
        Ok(self.dataset(path)?.describe().to_vec())
    }

    /// Read slot `pos` of the dataset at `path`.
    pub fn read_slot(
        &self,
        path: &str,
        pos: usize,
        requested: &TypeDescriptor,
    ) -> ContainerResult<Vec<u8>> {
        self.dataset(path)?.read_slot(pos, requested)
    }

    /// Overwrite slot `pos` of the dataset at `path`.
    pub fn write_slot(
        &mut self,
        path: &str,
        pos: usize,
        source: &TypeDescriptor,
        bytes: &[u8],
    ) -> ContainerResult<()> {
        self.check_writable()?;
        self.dataset_mut(path)?.write_slot(pos, source, bytes)?;
        self.flush()
    }

    /// Append a slot to the expandable dataset at `path`.
    pub fn extend_slot(
        &mut self,
        path: &str,
        source: &TypeDescriptor,
        bytes: &[u8],
    ) -> ContainerResult<()> {
        self.check_writable()?;
        self.dataset_mut(path)?.extend_slot(source, bytes)?;
        self.flush()
    }
}
