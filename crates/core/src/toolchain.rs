//! Solc installation and version selection

use crate::{
    config::SolcVersionRequest,
    error::{ManageError, Result},
};
use semver::Version;
use std::path::PathBuf;

/// Installs solc releases and locates their binaries
pub trait Toolchain {
    /// Installs the requested release and returns its version
    fn install(&self, request: &SolcVersionRequest) -> Result<Version>;

    /// Installed versions, newest first
    fn installed_versions(&self) -> Result<Vec<Version>>;

    /// Path of the solc binary for an installed version
    fn binary(&self, version: &Version) -> PathBuf;
}

/// Picks the version to compile with
///
/// An exact request is used as is. Otherwise the first installed version
/// wins, which is the newest one since the list is sorted newest first.
pub fn select_version<T: Toolchain + ?Sized>(
    toolchain: &T,
    request: &SolcVersionRequest,
) -> Result<Version> {
    if let SolcVersionRequest::Exact(version) = request {
        return Ok(version.clone());
    }

    toolchain
        .installed_versions()?
        .into_iter()
        .next()
        .ok_or(ManageError::NoInstalledVersions)
}

/// Toolchain backed by svm, the solc version manager
#[derive(Debug, Default, Clone, Copy)]
pub struct SvmToolchain;

impl SvmToolchain {
    pub fn new() -> Self {
        Self
    }

    fn latest_release(&self) -> Result<Version> {
        let releases = svm::blocking_all_releases(svm::platform())
            .map_err(|e| ManageError::ReleaseList(e.to_string()))?;

        releases
            .into_versions()
            .into_iter()
            .max()
            .ok_or_else(|| ManageError::ReleaseList("release list is empty".to_string()))
    }
}

impl Toolchain for SvmToolchain {
    fn install(&self, request: &SolcVersionRequest) -> Result<Version> {
        let version = match request {
            SolcVersionRequest::Latest => self.latest_release()?,
            SolcVersionRequest::Exact(version) => version.clone(),
        };

        // svm fails to list versions before its data directory exists
        let installed = self.installed_versions().unwrap_or_else(|e| {
            tracing::debug!("Treating solc as not installed: {}", e);
            Vec::new()
        });
        if installed.contains(&version) {
            tracing::debug!("solc {} already installed", version);
            return Ok(version);
        }

        tracing::info!("Installing solc {}", version);
        let path = svm::blocking_install(&version).map_err(|e| ManageError::Install {
            version: version.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("Installed solc {} at {}", version, path.display());

        Ok(version)
    }

    fn installed_versions(&self) -> Result<Vec<Version>> {
        let mut versions = svm::installed_versions()
            .map_err(|e| ManageError::InstalledVersions(e.to_string()))?;
        newest_first(&mut versions);
        Ok(versions)
    }

    fn binary(&self, version: &Version) -> PathBuf {
        let version = version.to_string();
        svm::version_path(&version).join(format!("solc-{}", version))
    }
}

fn newest_first(versions: &mut Vec<Version>) {
    versions.sort_by(|a, b| b.cmp(a));
    versions.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeToolchain {
        installed: RefCell<Vec<Version>>,
        latest: Version,
    }

    impl Toolchain for FakeToolchain {
        fn install(&self, request: &SolcVersionRequest) -> Result<Version> {
            let version = match request {
                SolcVersionRequest::Latest => self.latest.clone(),
                SolcVersionRequest::Exact(v) => v.clone(),
            };
            self.installed.borrow_mut().push(version.clone());
            Ok(version)
        }

        fn installed_versions(&self) -> Result<Vec<Version>> {
            let mut versions = self.installed.borrow().clone();
            newest_first(&mut versions);
            Ok(versions)
        }

        fn binary(&self, version: &Version) -> PathBuf {
            PathBuf::from(format!("solc-{}", version))
        }
    }

    #[test]
    fn test_select_first_installed() {
        let toolchain = FakeToolchain {
            installed: RefCell::new(vec![Version::new(0, 8, 19), Version::new(0, 8, 26)]),
            latest: Version::new(0, 8, 24),
        };

        toolchain.install(&SolcVersionRequest::Latest).unwrap();
        let selected = select_version(&toolchain, &SolcVersionRequest::Latest).unwrap();
        assert_eq!(selected, Version::new(0, 8, 26));
    }

    #[test]
    fn test_select_exact_request() {
        let toolchain = FakeToolchain {
            installed: RefCell::new(vec![Version::new(0, 8, 26)]),
            latest: Version::new(0, 8, 26),
        };

        let request = SolcVersionRequest::Exact(Version::new(0, 8, 19));
        let selected = select_version(&toolchain, &request).unwrap();
        assert_eq!(selected, Version::new(0, 8, 19));
    }

    #[test]
    fn test_select_without_installed_versions() {
        let toolchain = FakeToolchain {
            installed: RefCell::new(vec![]),
            latest: Version::new(0, 8, 26),
        };

        let err = select_version(&toolchain, &SolcVersionRequest::Latest).unwrap_err();
        assert!(matches!(err, ManageError::NoInstalledVersions));
    }

    #[test]
    fn test_newest_first() {
        let mut versions = vec![
            Version::new(0, 8, 4),
            Version::new(0, 8, 19),
            Version::new(0, 7, 6),
            Version::new(0, 8, 19),
        ];
        newest_first(&mut versions);
        assert_eq!(
            versions,
            vec![
                Version::new(0, 8, 19),
                Version::new(0, 8, 4),
                Version::new(0, 7, 6)
            ]
        );
    }
}
