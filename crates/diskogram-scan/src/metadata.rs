//! Cross-platform metadata helpers.

use std::fs::Metadata;
use std::io;

use diskogram_core::TimestampMode;

/// What the scanner does with one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryClass {
    /// Descend into it.
    Directory,
    /// Report it to the histogram.
    File,
    /// Symbolic link or reparse point; never followed.
    Link,
    /// Sockets, devices, fifos.
    Other,
}

impl EntryClass {
    /// Classify an entry from metadata read without following links.
    pub(crate) fn of(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() || is_reparse_point(metadata) {
            Self::Link
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Check for any reparse point (junctions, mount points, cloud placeholders).
#[cfg(windows)]
fn is_reparse_point(metadata: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    metadata.file_attributes() & FILE_ATTRIBUTE_REPARSE_POINT != 0
}

#[cfg(not(windows))]
fn is_reparse_point(_metadata: &Metadata) -> bool {
    false
}

/// Read the timestamp selected by `mode`, in epoch seconds.
#[cfg(unix)]
pub(crate) fn select_timestamp(metadata: &Metadata, mode: TimestampMode) -> io::Result<i64> {
    use std::os::unix::fs::MetadataExt;
    Ok(match mode {
        TimestampMode::Modified => metadata.mtime(),
        TimestampMode::Changed => changed_time(metadata)?,
        TimestampMode::Accessed => metadata.atime(),
    })
}

#[cfg(not(unix))]
pub(crate) fn select_timestamp(metadata: &Metadata, mode: TimestampMode) -> io::Result<i64> {
    let time = match mode {
        TimestampMode::Modified => metadata.modified()?,
        TimestampMode::Changed => metadata.created()?,
        TimestampMode::Accessed => metadata.accessed()?,
    };
    Ok(diskogram_core::epoch_seconds(time))
}

/// Birth time where the platform records one.
#[cfg(all(
    unix,
    any(
        target_vendor = "apple",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    )
))]
fn changed_time(metadata: &Metadata) -> io::Result<i64> {
    metadata.created().map(diskogram_core::epoch_seconds)
}

/// Status-change time everywhere else.
#[cfg(all(
    unix,
    not(any(
        target_vendor = "apple",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    ))
))]
fn changed_time(metadata: &Metadata) -> io::Result<i64> {
    use std::os::unix::fs::MetadataExt;
    Ok(metadata.ctime())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{Duration, UNIX_EPOCH};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_classify_file_and_dir() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        fs::write(&file, "abc").unwrap();

        assert_eq!(EntryClass::of(&fs::symlink_metadata(&file).unwrap()), EntryClass::File);
        assert_eq!(
            EntryClass::of(&fs::symlink_metadata(temp.path()).unwrap()),
            EntryClass::Directory
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_classify_symlink_to_dir() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("loop");
        std::os::unix::fs::symlink(temp.path(), &link).unwrap();

        assert_eq!(EntryClass::of(&fs::symlink_metadata(&link).unwrap()), EntryClass::Link);
    }

    #[test]
    fn test_select_modified() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("old.bin");
        fs::write(&path, vec![0u8; 16]).unwrap();

        let when = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(when)
            .unwrap();

        let metadata = fs::symlink_metadata(&path).unwrap();
        assert_eq!(
            select_timestamp(&metadata, TimestampMode::Modified).unwrap(),
            1_000_000_000
        );
    }
}
