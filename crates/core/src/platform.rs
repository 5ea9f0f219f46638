//! Platform detection and the miniconda installer table

use std::env;
use std::fmt;

use crate::types::{DoableError, DoableResult};

/// Operating systems with a known miniconda installer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
}

impl Platform {
    /// Detect the current platform
    pub fn current() -> DoableResult<Self> {
        Self::from_os(env::consts::OS)
    }

    /// Resolve a platform from an OS name.
    ///
    /// Accepts both Rust's `std::env::consts::OS` spelling (`macos`) and the
    /// kernel names reported by `uname` (`Darwin`), case-insensitively.
    pub fn from_os(os: &str) -> DoableResult<Self> {
        match os.to_ascii_lowercase().as_str() {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::Darwin),
            _ => Err(DoableError::UnsupportedPlatform(format!(
                "{}\nSupported platforms: windows, linux, macos",
                os
            ))),
        }
    }

    pub fn is_windows(self) -> bool {
        self == Self::Windows
    }

    /// Download URL of the latest 64-bit Miniconda3 installer
    pub fn miniconda_url(self) -> &'static str {
        match self {
            Self::Windows => {
                "https://repo.continuum.io/archive/Miniconda3-latest-Windows-x86_64.exe"
            }
            Self::Linux => "https://repo.continuum.io/miniconda/Miniconda3-latest-Linux-x86_64.sh",
            Self::Darwin => {
                "https://repo.continuum.io/miniconda/Miniconda3-latest-MacOSX-x86_64.sh"
            }
        }
    }

    /// File name the installer is saved under: the URL's final path segment
    pub fn miniconda_installer(self) -> &'static str {
        let url = self.miniconda_url();
        url.rsplit('/').next().unwrap_or(url)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::Darwin];

    #[test]
    fn test_platform_detection() {
        if cfg!(any(target_os = "windows", target_os = "linux", target_os = "macos")) {
            assert!(Platform::current().is_ok());
        }
    }

    #[test]
    fn test_from_os_spellings() {
        assert_eq!(Platform::from_os("Windows").unwrap(), Platform::Windows);
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::Darwin);
        assert_eq!(Platform::from_os("Darwin").unwrap(), Platform::Darwin);
    }

    #[test]
    fn test_unsupported_platform() {
        let err = Platform::from_os("plan9").unwrap_err();
        assert!(matches!(err, DoableError::UnsupportedPlatform(_)));
        assert!(err.to_string().contains("plan9"));
    }

    #[test]
    fn test_installer_is_last_url_segment() {
        for platform in ALL {
            let url = platform.miniconda_url();
            let installer = platform.miniconda_installer();
            assert!(url.ends_with(&format!("/{}", installer)));
            assert!(!installer.contains('/'));
        }
    }

    #[test]
    fn test_each_platform_has_distinct_url() {
        assert_eq!(
            Platform::Windows.miniconda_installer(),
            "Miniconda3-latest-Windows-x86_64.exe"
        );
        assert_eq!(
            Platform::Linux.miniconda_installer(),
            "Miniconda3-latest-Linux-x86_64.sh"
        );
        assert_eq!(
            Platform::Darwin.miniconda_installer(),
            "Miniconda3-latest-MacOSX-x86_64.sh"
        );
    }
}
