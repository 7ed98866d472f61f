//! Stateful file facade for arca.
//!
//! [`ArcaFile`] wraps one open [`arca_container::Container`] and adds a
//! mutable cursor (the current working group) against which relative paths
//! resolve. It is the surface consumed by the statistical machines and the
//! CLI: navigation, create-or-redefine, typed buffer I/O, whole-file merge
//! copy, and scalar/array convenience accessors.
//!
//! One facade per file, one thread per facade. Two facades over two
//! different files are independent; two facades over the *same* file are
//! only safe when mutations are externally serialized and readers rescan.

pub mod error;
pub mod file;

pub use arca_container::{AccessMode, ContainerError, Descriptor};
pub use arca_types::{ArrayBuffer, Element, ElementKind, TypeDescriptor, TypeError};
pub use error::{FileError, FileResult};
pub use file::ArcaFile;

#[cfg(test)]
mod tests {
    use super::*;

    fn open_tmp(dir: &tempfile::TempDir, name: &str, mode: AccessMode) -> ArcaFile {
        ArcaFile::open(dir.path().join(name), mode).unwrap()
    }

    fn f64_vec(n: u64) -> TypeDescriptor {
        TypeDescriptor::new(ElementKind::Float64, vec![n])
    }

    // -----------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------

    #[test]
    fn cursor_starts_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        assert_eq!(f.cwd(), "/");
    }

    #[test]
    fn cd_canonicalizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create_group("a/b").unwrap();
        f.cd("a/./b/..").unwrap();
        assert_eq!(f.cwd(), "/a");
        f.cd("/a/b/").unwrap();
        assert_eq!(f.cwd(), "/a/b");
    }

    #[test]
    fn failed_cd_leaves_cursor_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create_group("a").unwrap();
        f.cd("a").unwrap();

        let err = f.cd("missing").unwrap_err();
        assert!(matches!(
            err,
            FileError::Container(ContainerError::PathNotFound(_))
        ));
        assert_eq!(f.cwd(), "/a");
    }

    #[test]
    fn cd_into_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("leaf", f64_vec(1), false).unwrap();
        let err = f.cd("leaf").unwrap_err();
        assert!(matches!(
            err,
            FileError::Container(ContainerError::NotAGroup(_))
        ));
        assert_eq!(f.cwd(), "/");
    }

    #[test]
    fn dotdot_saturates_at_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.cd("../..").unwrap();
        assert_eq!(f.cwd(), "/");
    }

    // -----------------------------------------------------------------
    // Create / describe / unlink
    // -----------------------------------------------------------------

    #[test]
    fn create_then_write_then_read_from_subgroup() {
        // Spec scenario: truncate "m.h5", create g/mean float64[3], write,
        // cd g, read back.
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.h5", AccessMode::Truncate);
        f.create("g/mean", f64_vec(3), false).unwrap();
        f.write_buffer("g/mean", 0, &ArrayBuffer::from_vec(&[1.0f64, 2.0, 3.0]))
            .unwrap();
        f.cd("g").unwrap();
        let values = f.read_buffer("mean", 0).unwrap().to_vec::<f64>().unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn describe_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("x", f64_vec(4), true).unwrap();
        let first = f.describe("x").unwrap();
        let second = f.describe("x").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn create_on_existing_path_redefines() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("x", f64_vec(3), false).unwrap();
        f.write_buffer("x", 0, &ArrayBuffer::from_vec(&[1.0f64, 2.0, 3.0]))
            .unwrap();

        // Same type: data survives.
        f.create("x", f64_vec(3), false).unwrap();
        assert_eq!(
            f.read_buffer("x", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![1.0, 2.0, 3.0]
        );

        // New shape: storage is re-created, history grows.
        f.create("x", f64_vec(5), false).unwrap();
        let history = f.describe("x").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(
            f.read_buffer("x", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![0.0; 5]
        );
    }

    #[test]
    fn unlink_removes_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("x", f64_vec(1), false).unwrap();
        assert!(f.contains("x"));
        f.unlink("x").unwrap();
        assert!(!f.contains("x"));
    }

    // -----------------------------------------------------------------
    // List datasets
    // -----------------------------------------------------------------

    #[test]
    fn list_extension_three_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("seq", f64_vec(2), true).unwrap();

        let buffers: Vec<ArrayBuffer> = (0..3)
            .map(|i| ArrayBuffer::from_vec(&[i as f64, i as f64 + 0.5]))
            .collect();
        for buf in &buffers {
            f.extend_buffer("seq", buf).unwrap();
        }

        let history = f.describe("seq").unwrap();
        assert_eq!(history.last().unwrap().size, 3);
        for (i, buf) in buffers.iter().enumerate() {
            let read = f.read_buffer("seq", i).unwrap();
            assert_eq!(&read, buf);
        }
    }

    #[test]
    fn extend_on_fixed_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("x", f64_vec(2), false).unwrap();
        let err = f
            .extend_buffer("x", &ArrayBuffer::from_vec(&[0.0f64, 0.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            FileError::Container(ContainerError::NotExpandable(_))
        ));
    }

    // -----------------------------------------------------------------
    // Type mismatch
    // -----------------------------------------------------------------

    #[test]
    fn write_type_mismatch_rejected_and_content_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("x", f64_vec(3), false).unwrap();
        f.write_buffer("x", 0, &ArrayBuffer::from_vec(&[1.0f64, 2.0, 3.0]))
            .unwrap();

        let err = f
            .write_buffer("x", 0, &ArrayBuffer::from_vec(&[1.0f32, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            FileError::Container(ContainerError::TypeMismatch { .. })
        ));
        assert_eq!(
            f.read_buffer("x", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![1.0, 2.0, 3.0]
        );
    }

    // -----------------------------------------------------------------
    // Rename
    // -----------------------------------------------------------------

    #[test]
    fn rename_consistency() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create_group("work").unwrap();
        f.create("work/a", f64_vec(2), false).unwrap();
        f.write_buffer("work/a", 0, &ArrayBuffer::from_vec(&[4.0f64, 5.0]))
            .unwrap();
        f.cd("work").unwrap();
        let descr_before = f.describe("a").unwrap();

        f.rename("a", "b").unwrap();

        assert_eq!(f.cwd(), "/work");
        assert!(!f.contains("a"));
        assert!(f.contains("b"));
        assert_eq!(f.describe("b").unwrap(), descr_before);
        assert_eq!(
            f.read_buffer("b", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![4.0, 5.0]
        );
    }

    #[test]
    fn rename_across_groups() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.create("a", f64_vec(1), false).unwrap();
        f.rename("a", "deep/down/b").unwrap();
        assert!(f.has_group("deep/down"));
        assert!(f.contains("/deep/down/b"));
    }

    // -----------------------------------------------------------------
    // Copy
    // -----------------------------------------------------------------

    #[test]
    fn copy_merges_source_root() {
        let dir = tempfile::tempdir().unwrap();

        let mut src = open_tmp(&dir, "src.arca", AccessMode::Truncate);
        src.create("x", f64_vec(2), false).unwrap();
        src.write_buffer("x", 0, &ArrayBuffer::from_vec(&[1.0f64, 2.0]))
            .unwrap();
        src.create("g/y", f64_vec(1), false).unwrap();
        src.write_buffer("g/y", 0, &ArrayBuffer::from_vec(&[3.0f64]))
            .unwrap();

        let mut dst = open_tmp(&dir, "dst.arca", AccessMode::Truncate);
        dst.copy(&src).unwrap();

        assert!(dst.contains("x"));
        assert_eq!(
            dst.read_buffer("x", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![1.0, 2.0]
        );
        assert_eq!(
            dst.read_buffer("g/y", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![3.0]
        );
    }

    #[test]
    fn copy_into_cursor_group() {
        let dir = tempfile::tempdir().unwrap();

        let mut src = open_tmp(&dir, "src.arca", AccessMode::Truncate);
        src.create("x", f64_vec(1), false).unwrap();

        let mut dst = open_tmp(&dir, "dst.arca", AccessMode::Truncate);
        dst.create_group("imported").unwrap();
        dst.cd("imported").unwrap();
        dst.copy(&src).unwrap();

        assert!(dst.contains("x"));
        assert!(dst.contains("/imported/x"));
    }

    #[test]
    fn copy_replaces_colliding_entry() {
        let dir = tempfile::tempdir().unwrap();

        let mut src = open_tmp(&dir, "src.arca", AccessMode::Truncate);
        src.create("x", f64_vec(1), false).unwrap();
        src.write_buffer("x", 0, &ArrayBuffer::from_vec(&[7.0f64]))
            .unwrap();

        let mut dst = open_tmp(&dir, "dst.arca", AccessMode::Truncate);
        dst.create("x", f64_vec(9), false).unwrap();
        dst.copy(&src).unwrap();

        assert_eq!(
            dst.read_buffer("x", 0).unwrap().to_vec::<f64>().unwrap(),
            vec![7.0]
        );
    }

    // -----------------------------------------------------------------
    // Scalar/array sugar
    // -----------------------------------------------------------------

    #[test]
    fn scalar_and_array_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.set("n", 42i64).unwrap();
        f.set("norm", 2.5f64).unwrap();
        f.set_array("v", &[1.0f64, -1.0]).unwrap();
        f.set_string("note", "hello").unwrap();

        assert_eq!(f.get::<i64>("n").unwrap(), 42);
        assert_eq!(f.get::<f64>("norm").unwrap(), 2.5);
        assert_eq!(f.get_array::<f64>("v").unwrap(), vec![1.0, -1.0]);
        assert_eq!(f.get_string("note").unwrap(), "hello");
    }

    #[test]
    fn set_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.set_array("v", &[1.0f64, 2.0]).unwrap();
        f.set_array("v", &[3.0f64, 4.0, 5.0]).unwrap();
        assert_eq!(f.get_array::<f64>("v").unwrap(), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn get_missing_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        let err = f.get::<f64>("absent").unwrap_err();
        assert!(matches!(
            err,
            FileError::Container(ContainerError::PathNotFound(_))
        ));
    }

    #[test]
    fn get_wrong_kind_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
        f.set("n", 1i64).unwrap();
        let err = f.get::<f64>("n").unwrap_err();
        assert!(matches!(
            err,
            FileError::Type(TypeError::KindMismatch { .. })
        ));
    }

    // -----------------------------------------------------------------
    // Modes through the facade
    // -----------------------------------------------------------------

    #[test]
    fn read_only_facade_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
            f.set("n", 1i64).unwrap();
        }
        let mut f = open_tmp(&dir, "m.arca", AccessMode::ReadOnly);
        assert_eq!(f.get::<i64>("n").unwrap(), 1);
        let err = f.set("n", 2i64).unwrap_err();
        assert!(matches!(
            err,
            FileError::Container(ContainerError::ReadOnly)
        ));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut f = open_tmp(&dir, "m.arca", AccessMode::Truncate);
            f.create_group("g").unwrap();
            f.set_array("g/v", &[1.5f64]).unwrap();
        }
        let f = open_tmp(&dir, "m.arca", AccessMode::ReadWrite);
        assert_eq!(f.get_array::<f64>("/g/v").unwrap(), vec![1.5]);
    }
}
