//! The stateful file facade.

use std::path::Path;

use arca_container::{AccessMode, Container, Descriptor};
use arca_types::{normalize, ArrayBuffer, Element, TypeDescriptor};

use crate::error::FileResult;

/// A cursor over one open container file.
///
/// All path arguments resolve against the current working group unless they
/// are absolute. The cursor starts at `/` and moves only through
/// [`ArcaFile::cd`]; it is private state and never handed out as a
/// reference into the tree, so tree rebuilds (see [`ArcaFile::rename`])
/// cannot leave the caller holding a stale handle.
pub struct ArcaFile {
    container: Container,
    cwd: String,
}

impl std::fmt::Debug for ArcaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArcaFile")
            .field("path", &self.container.path())
            .field("mode", &self.container.mode())
            .field("cwd", &self.cwd)
            .finish()
    }
}

impl ArcaFile {
    /// Open (or create, depending on `mode`) the container at `path`.
    /// The cursor starts at the root group.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> FileResult<Self> {
        let container = Container::open(path, mode)?;
        Ok(Self {
            container,
            cwd: "/".to_string(),
        })
    }

    /// The access mode this file was opened under.
    pub fn mode(&self) -> AccessMode {
        self.container.mode()
    }

    /// Direct access to the underlying container (read-only).
    pub fn container(&self) -> &Container {
        &self.container
    }

    fn resolve(&self, path: &str) -> String {
        normalize(&self.cwd, path)
    }

    // -----------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------

    /// Change the current working group. Fails if the target does not
    /// resolve to an existing group; on failure the cursor is unchanged.
    pub fn cd(&mut self, path: &str) -> FileResult<()> {
        let target = self.resolve(path);
        self.container.group(&target)?;
        self.cwd = target;
        Ok(())
    }

    /// The canonical path of the current working group.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Whether `path` resolves to an existing group. Never fails.
    pub fn has_group(&self, path: &str) -> bool {
        self.container.has_group(&self.resolve(path))
    }

    /// Whether `path` resolves to an existing dataset. Never fails.
    pub fn contains(&self, path: &str) -> bool {
        self.container.has_dataset(&self.resolve(path))
    }

    /// Create the group at `path`, with all missing intermediate groups.
    pub fn create_group(&mut self, path: &str) -> FileResult<()> {
        let target = self.resolve(path);
        self.container.create_group(&target)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Dataset lifecycle
    // -----------------------------------------------------------------

    /// Create-or-redefine the dataset at `path`.
    ///
    /// If the path does not exist, a new dataset is created (with missing
    /// parent groups). If it does, the existing dataset is re-created in
    /// place under the new configuration — calling `create` twice with
    /// different shapes redefines storage rather than erroring.
    pub fn create(
        &mut self,
        path: &str,
        dtype: TypeDescriptor,
        expandable: bool,
    ) -> FileResult<()> {
        let target = self.resolve(path);
        if self.container.has_dataset(&target) {
            self.container.redefine_dataset(&target, dtype, expandable)?;
        } else {
            self.container.create_dataset(&target, dtype, expandable)?;
        }
        Ok(())
    }

    /// Every storage configuration the dataset at `path` has been created
    /// with, oldest first.
    pub fn describe(&self, path: &str) -> FileResult<Vec<Descriptor>> {
        Ok(self.container.describe(&self.resolve(path))?)
    }

    /// Remove the dataset at `path`.
    pub fn unlink(&mut self, path: &str) -> FileResult<()> {
        let target = self.resolve(path);
        self.container.remove_dataset(&target)?;
        Ok(())
    }

    /// Rename the dataset at `from` to `to`.
    ///
    /// After the physical rename the in-memory tree is not trusted: the
    /// whole container is rescanned from disk and the cursor re-navigated
    /// to its previous path. The working-directory string is unchanged.
    pub fn rename(&mut self, from: &str, to: &str) -> FileResult<()> {
        let from = self.resolve(from);
        let to = self.resolve(to);
        self.container.rename_dataset(&from, &to)?;

        let previous = self.cwd.clone();
        self.container.rescan()?;
        self.container.group(&previous)?;
        self.cwd = previous;
        Ok(())
    }

    /// Merge the entire root of `other` into the current working group:
    /// every top-level group, then every top-level dataset, deep-copied by
    /// name. A same-named entry in the destination is replaced.
    pub fn copy(&mut self, other: &ArcaFile) -> FileResult<()> {
        let dest = self.cwd.clone();
        let source_root = other.container.root().clone();
        for (name, group) in source_root.groups() {
            self.container.copy_group(&dest, name, group)?;
        }
        for (name, dataset) in source_root.datasets() {
            self.container.copy_dataset(&dest, name, dataset)?;
        }
        tracing::debug!(
            source = %other.container.path().display(),
            dest = %dest,
            "merged container root"
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Buffer I/O
    // -----------------------------------------------------------------

    /// Read slot `pos` of the dataset at `path` under its stored type.
    pub fn read_buffer(&self, path: &str, pos: usize) -> FileResult<ArrayBuffer> {
        let target = self.resolve(path);
        let dtype = self.container.dataset(&target)?.dtype().clone();
        let bytes = self.container.read_slot(&target, pos, &dtype)?;
        Ok(ArrayBuffer::from_raw(&dtype, bytes)?)
    }

    /// Overwrite slot `pos` of the dataset at `path` with `buffer`. The
    /// buffer's kind and shape must match the stored descriptor exactly.
    pub fn write_buffer(&mut self, path: &str, pos: usize, buffer: &ArrayBuffer) -> FileResult<()> {
        let target = self.resolve(path);
        self.container
            .write_slot(&target, pos, &buffer.descriptor(0), &buffer.data)?;
        Ok(())
    }

    /// Append `buffer` as a new slot of the expandable dataset at `path`.
    pub fn extend_buffer(&mut self, path: &str, buffer: &ArrayBuffer) -> FileResult<()> {
        let target = self.resolve(path);
        self.container
            .extend_slot(&target, &buffer.descriptor(0), &buffer.data)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Scalar/array convenience (the machine serialization contract)
    // -----------------------------------------------------------------

    /// Store a scalar at `path`, creating or redefining the dataset.
    pub fn set<T: Element>(&mut self, path: &str, value: T) -> FileResult<()> {
        let buffer = ArrayBuffer::scalar(value);
        self.create(path, buffer.descriptor(0), false)?;
        self.write_buffer(path, 0, &buffer)
    }

    /// Store a 1-D array at `path`, creating or redefining the dataset.
    pub fn set_array<T: Element>(&mut self, path: &str, values: &[T]) -> FileResult<()> {
        let buffer = ArrayBuffer::from_vec(values);
        self.create(path, buffer.descriptor(0), false)?;
        self.write_buffer(path, 0, &buffer)
    }

    /// Store a string at `path`, creating or redefining the dataset.
    pub fn set_string(&mut self, path: &str, value: &str) -> FileResult<()> {
        let buffer = ArrayBuffer::from_str(value);
        self.create(path, buffer.descriptor(0), false)?;
        self.write_buffer(path, 0, &buffer)
    }

    /// Read the scalar stored at `path`.
    pub fn get<T: Element>(&self, path: &str) -> FileResult<T> {
        Ok(self.read_buffer(path, 0)?.to_scalar::<T>()?)
    }

    /// Read the 1-D array stored at `path`.
    pub fn get_array<T: Element>(&self, path: &str) -> FileResult<Vec<T>> {
        Ok(self.read_buffer(path, 0)?.to_vec::<T>()?)
    }

    /// Read the string stored at `path`.
    pub fn get_string(&self, path: &str) -> FileResult<String> {
        Ok(self.read_buffer(path, 0)?.to_string_value()?)
    }
}
