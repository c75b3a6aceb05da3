use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use console_core::StatusView;

use crate::presenter::Panel;

/// A firmware image picked by the user. Only its size is known up front;
/// the bytes are read when the upload starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareFile {
    path: PathBuf,
    size: u64,
}

impl FirmwareFile {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// Per-session state shared between the status and upload workflows.
///
/// `battery_low` is written by every status refresh and read when the update
/// panel opens and when an upload starts.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub battery_low: bool,
    pub selected: Option<FirmwareFile>,
    pub panel: Panel,
    pub last_status: StatusView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_firmware_file_size_and_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xE9; 1024]).unwrap();

        let firmware = FirmwareFile::open(file.path()).unwrap();
        assert_eq!(firmware.size(), 1024);
        assert_eq!(firmware.read().unwrap().len(), 1024);
        assert_eq!(firmware.path(), file.path());
    }

    #[test]
    fn test_firmware_file_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FirmwareFile::open(dir.path()).is_err());
        assert_eq!(
            FirmwareFile::open(dir.path().join("missing.bin")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert!(!state.battery_low);
        assert!(state.selected.is_none());
        assert_eq!(state.panel, Panel::Main);
        assert!(state.last_status.degraded);
    }
}
