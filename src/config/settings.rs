use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkSettings {
    /// Upper bound on tasks doing filesystem I/O or running the visitor at once.
    pub max_concurrent_io: usize,
    /// Directories at this depth are visited but not descended into.
    pub max_depth: Option<usize>,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            max_concurrent_io: default_concurrency(),
            max_depth: None,
        }
    }
}

/// Concurrency derived from the storage class, detected once per process.
pub fn default_concurrency() -> usize {
    static DETECTED: OnceLock<usize> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        let max_io = match detect_storage_type() {
            StorageType::SSD => 128,
            StorageType::HDD => 32,
            StorageType::Unknown => 64,
        };
        // Every in-flight listing holds a directory handle open
        cap_by_fd_limit(max_io)
    })
}

impl WalkSettings {
    pub fn with_concurrency(mut self, max_concurrent_io: usize) -> Self {
        self.max_concurrent_io = max_concurrent_io;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Permit count for the walker's semaphore, within `1..=Semaphore::MAX_PERMITS`.
    pub fn permits(&self) -> usize {
        self.max_concurrent_io.clamp(1, Semaphore::MAX_PERMITS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    SSD,
    HDD,
    Unknown,
}

pub fn detect_storage_type() -> StorageType {
    #[cfg(target_os = "linux")]
    {
        detect_storage_type_linux()
    }
    #[cfg(target_os = "macos")]
    {
        detect_storage_type_macos()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        StorageType::Unknown
    }
}

#[cfg(target_os = "linux")]
fn detect_storage_type_linux() -> StorageType {
    let Ok(devices) = std::fs::read_dir("/sys/block") else {
        return StorageType::Unknown;
    };

    for device in devices.flatten() {
        let name = device.file_name();
        let name = name.to_string_lossy();
        if !(name.starts_with("sd") || name.starts_with("nvme") || name.starts_with("vd")) {
            continue;
        }

        let flag = device.path().join("queue/rotational");
        if let Ok(val) = std::fs::read_to_string(flag) {
            return match val.trim() {
                "0" => StorageType::SSD,
                "1" => StorageType::HDD,
                _ => StorageType::Unknown,
            };
        }
    }

    StorageType::Unknown
}

#[cfg(target_os = "macos")]
fn detect_storage_type_macos() -> StorageType {
    let Ok(out) = std::process::Command::new("system_profiler")
        .arg("SPStorageDataType")
        .output()
    else {
        return StorageType::Unknown;
    };

    let text = String::from_utf8_lossy(&out.stdout).to_lowercase();
    if ["solid state", "ssd", "nvme"].iter().any(|k| text.contains(k)) {
        StorageType::SSD
    } else if text.contains("rotational") || text.contains("hdd") {
        StorageType::HDD
    } else {
        StorageType::Unknown
    }
}

/// Keep a quarter of the descriptor soft limit free for everything else.
fn cap_by_fd_limit(max_io: usize) -> usize {
    #[cfg(unix)]
    {
        let mut rlim = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: getrlimit only writes into the struct we hand it.
        let ret = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) };
        if ret == 0 && rlim.rlim_cur != libc::RLIM_INFINITY {
            let usable = (rlim.rlim_cur as usize).saturating_mul(3) / 4;
            return max_io.min(usable).max(16);
        }
    }
    max_io
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_concurrency_is_bounded() {
        let s = WalkSettings::default();
        assert!(s.max_concurrent_io >= 16);
        assert!(s.max_concurrent_io <= 128);
        assert!(s.max_depth.is_none());
    }

    #[test]
    fn zero_concurrency_still_gets_one_permit() {
        let s = WalkSettings::default().with_concurrency(0);
        assert_eq!(s.permits(), 1);
        assert_eq!(s.with_concurrency(8).permits(), 8);
    }

    #[test]
    fn huge_concurrency_is_capped_at_semaphore_limit() {
        let s = WalkSettings::default().with_concurrency(usize::MAX);
        assert_eq!(s.permits(), Semaphore::MAX_PERMITS);
    }

    #[test]
    fn default_concurrency_is_detected_once() {
        let first = default_concurrency();
        assert_eq!(default_concurrency(), first);
        assert_eq!(WalkSettings::default().max_concurrent_io, first);
    }

    #[test]
    fn fd_cap_never_goes_below_floor() {
        assert!(cap_by_fd_limit(4) >= 4);
        assert!(cap_by_fd_limit(1_000_000) >= 16);
    }
}
