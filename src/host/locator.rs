//! GIMP executable discovery.
//!
//! Candidates are checked in a fixed order and the first hit wins:
//! 1. well-known install locations for the current OS (must exist and be
//!    executable),
//! 2. every directory of the search path, probing two known executable names,
//! 3. the bare [`FALLBACK_NAME`], left for the OS to resolve at spawn time.
//!
//! No attempt is made to check that the binary found is actually GIMP 3.

use log::{debug, trace};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name used when nothing else is found
pub const FALLBACK_NAME: &str = "gimp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Install locations probed before the search path, highest priority first
    pub fn well_known_paths(self, home: Option<&Path>) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf>;
        match self {
            Platform::Windows => {
                paths = [
                    r"C:\Program Files\GIMP 3\bin\gimp-3.0.exe",
                    r"C:\Program Files\GIMP 3\bin\gimp-console-3.0.exe",
                    r"C:\Program Files\GIMP\bin\gimp-3.0.exe",
                    r"C:\Program Files\GIMP\bin\gimp-console-3.0.exe",
                ]
                .iter()
                .map(PathBuf::from)
                .collect();
                if let Some(home) = home {
                    let bin = home
                        .join("AppData")
                        .join("Local")
                        .join("Programs")
                        .join("GIMP 3")
                        .join("bin");
                    paths.push(bin.join("gimp-3.0.exe"));
                    paths.push(bin.join("gimp-console-3.0.exe"));
                }
            }
            Platform::MacOs => {
                paths = vec![
                    PathBuf::from("/Applications/GIMP.app/Contents/MacOS/gimp"),
                    PathBuf::from("/Applications/GIMP-3.0.app/Contents/MacOS/gimp"),
                ];
                if let Some(home) = home {
                    paths.push(home.join("Applications/GIMP.app/Contents/MacOS/gimp"));
                }
                paths.push(PathBuf::from("/opt/homebrew/bin/gimp"));
                paths.push(PathBuf::from("/usr/local/bin/gimp"));
            }
            Platform::Linux => {
                paths = vec![
                    PathBuf::from("/usr/bin/gimp"),
                    PathBuf::from("/usr/local/bin/gimp"),
                    PathBuf::from("/snap/bin/gimp"),
                ];
                if let Some(home) = home {
                    paths.push(home.join(".local/bin/gimp"));
                }
                // Flatpak
                paths.push(PathBuf::from("/app/bin/gimp"));
            }
        }
        paths
    }

    /// The two executable names looked up in every search path directory
    pub fn search_names(self) -> [&'static str; 2] {
        match self {
            Platform::Windows => ["gimp-3.0.exe", "gimp-console-3.0.exe"],
            Platform::MacOs | Platform::Linux => ["gimp-3.0", "gimp-console-3.0"],
        }
    }
}

/// Resolves the GIMP executable to launch
#[derive(Debug, Clone)]
pub struct Locator {
    candidates: Vec<PathBuf>,
    search_names: [&'static str; 2],
    search_path: Option<OsString>,
}

impl Locator {
    /// Locator for the running OS, its home directory and `PATH`
    pub fn current() -> Self {
        Self::for_platform(
            Platform::current(),
            dirs::home_dir().as_deref(),
            env::var_os("PATH"),
        )
    }

    pub fn for_platform(
        platform: Platform,
        home: Option<&Path>,
        search_path: Option<OsString>,
    ) -> Self {
        Self::new(
            platform.well_known_paths(home),
            platform.search_names(),
            search_path,
        )
    }

    pub fn new(
        candidates: Vec<PathBuf>,
        search_names: [&'static str; 2],
        search_path: Option<OsString>,
    ) -> Self {
        Self {
            candidates,
            search_names,
            search_path,
        }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Returns the first matching candidate, or the bare fallback name
    pub fn find(&self) -> PathBuf {
        if let Some(found) = self.find_well_known() {
            debug!("Found GIMP at well-known location {}", found.display());
            return found;
        }
        if let Some(found) = self.find_on_search_path() {
            debug!("Found GIMP on the search path at {}", found.display());
            return found;
        }
        debug!(
            "GIMP not found in known locations, falling back to '{}'",
            FALLBACK_NAME
        );
        PathBuf::from(FALLBACK_NAME)
    }

    fn find_well_known(&self) -> Option<PathBuf> {
        self.candidates
            .iter()
            .inspect(|path| trace!("Probing {}", path.display()))
            .find(|path| is_executable(path))
            .cloned()
    }

    fn find_on_search_path(&self) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        for dir in env::split_paths(search_path) {
            for name in self.search_names {
                let candidate = dir.join(name);
                trace!("Probing {}", candidate.display());
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
