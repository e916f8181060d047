//! Test utilities for the lists crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests
//! or with the `test-support` feature.

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The crate forbids direct `std::fs` calls. These helpers provide common
    //! read/write/existence/remove operations built on `cap_std::fs::Dir` so
    //! test suites can share consistent, policy-compliant file access.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a UTF-8 text file through `cap_std`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lists::test_support::cap_fs::{read_file_to_string, write_file};
    ///
    /// let path = std::env::temp_dir().join("lists-cap-fs-read-example.txt");
    /// write_file(&path, b"hello\n")?;
    ///
    /// let content = read_file_to_string(&path)?;
    /// assert_eq!(content, "hello\n");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file_to_string(path: &Path) -> io::Result<String> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read_to_string(Path::new(&file_name))
    }

    /// Write bytes to a file through `cap_std`.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Create a directory (and its parents) through `cap_std`.
    pub fn create_directory(path: &Path) -> io::Result<()> {
        Dir::create_ambient_dir_all(path, ambient_authority())
    }

    /// Return true when `path` exists, false when it does not.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lists::test_support::cap_fs::{path_exists, write_file};
    ///
    /// let path = std::env::temp_dir().join("lists-cap-fs-exists-example.txt");
    /// write_file(&path, b"exists\n")?;
    /// assert!(path_exists(&path));
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

pub mod clock {
    //! Controllable clocks for timestamp assertions.

    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Clock that only moves when told to.
    pub struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod stack {
    //! Fully wired storage stacks over throwaway stores.

    use std::path::Path;
    use std::sync::Arc;

    use mockable::Clock;
    use tempfile::TempDir;

    use crate::outbound::persistence::{DieselListMetadataRepository, StoreLocation};
    use crate::outbound::stack::StorageStack;

    const TEST_MAILBOX_CAPACITY: usize = 16;

    /// Build the stack over private in-memory stores.
    pub async fn in_memory(clock: Arc<dyn Clock>) -> StorageStack {
        at(StoreLocation::InMemory, clock).await
    }

    /// Build the stack with entity stores at `location` and an in-memory
    /// mirror.
    pub async fn at(location: StoreLocation, clock: Arc<dyn Clock>) -> StorageStack {
        let mirror = DieselListMetadataRepository::in_memory()
            .await
            .unwrap_or_else(|err| panic!("metadata mirror: {err}"));
        StorageStack::assemble(location, mirror, clock, TEST_MAILBOX_CAPACITY)
    }

    /// Scratch directory for on-disk entity stores, removed on drop.
    pub struct ScratchStores {
        dir: TempDir,
    }

    impl ScratchStores {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("scratch dir: {err}"));
            Self { dir }
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }

        pub fn location(&self) -> StoreLocation {
            StoreLocation::Directory(self.dir.path().to_path_buf())
        }

        /// Build a fresh stack over the stores in this directory.
        pub async fn stack(&self, clock: Arc<dyn Clock>) -> StorageStack {
            at(self.location(), clock).await
        }
    }

    impl Default for ScratchStores {
        fn default() -> Self {
            Self::new()
        }
    }
}
