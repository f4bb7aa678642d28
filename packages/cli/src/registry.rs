//! The family managers shared by every menu.
//!
//! Each manager is created and loaded from its document the first time a
//! menu asks for it, then lives until the process exits. Families that were
//! never opened are never written back, so their files stay untouched.

use std::path::{Path, PathBuf};

use lems_crime::CrimeManager;
use lems_forensics::ForensicsManager;
use lems_jail::JailManager;
use lems_officer::OfficerManager;
use lems_patrol::PatrolManager;
use lems_record_store::{DanglingReference, RecordError};

/// Record families, in top-level menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Officer,
    Crime,
    Forensics,
    Patrol,
    Jail,
}

impl Family {
    pub const ALL: &[Self] = &[
        Self::Officer,
        Self::Crime,
        Self::Forensics,
        Self::Patrol,
        Self::Jail,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Officer => "Officer",
            Self::Crime => "Crime",
            Self::Forensics => "Forensics",
            Self::Patrol => "Patrol",
            Self::Jail => "Jail",
        }
    }
}

/// Location of every family document inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    pub officers: PathBuf,
    pub crimes: PathBuf,
    pub forensics: PathBuf,
    pub patrol: PathBuf,
    pub jail: PathBuf,
}

impl DataPaths {
    pub const OFFICERS: &str = "officers.json";
    pub const CRIMES: &str = "crimes.json";
    pub const FORENSICS: &str = "forensics.json";
    pub const PATROL: &str = "patrol.json";
    pub const JAIL: &str = "jail.json";

    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            officers: data_dir.join(Self::OFFICERS),
            crimes: data_dir.join(Self::CRIMES),
            forensics: data_dir.join(Self::FORENSICS),
            patrol: data_dir.join(Self::PATROL),
            jail: data_dir.join(Self::JAIL),
        }
    }

    #[must_use]
    pub fn for_family(&self, family: Family) -> &Path {
        match family {
            Family::Officer => &self.officers,
            Family::Crime => &self.crimes,
            Family::Forensics => &self.forensics,
            Family::Patrol => &self.patrol,
            Family::Jail => &self.jail,
        }
    }
}

/// A family manager backed by one JSON document.
pub trait Persisted: Default {
    /// Family name used in log messages.
    const LABEL: &'static str;

    /// Replaces the manager's contents with the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedInput`] for an unusable document.
    fn load_from(&mut self, path: &Path) -> Result<usize, RecordError>;

    /// Writes the manager's contents to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    fn save_to(&self, path: &Path) -> Result<(), RecordError>;
}

macro_rules! persisted {
    ($manager:ty, $label:literal) => {
        impl Persisted for $manager {
            const LABEL: &'static str = $label;

            fn load_from(&mut self, path: &Path) -> Result<usize, RecordError> {
                self.load(path)
            }

            fn save_to(&self, path: &Path) -> Result<(), RecordError> {
                self.save(path)
            }
        }
    };
}

persisted!(OfficerManager, "officer");
persisted!(CrimeManager, "crime");
persisted!(ForensicsManager, "forensics");
persisted!(PatrolManager, "patrol");
persisted!(JailManager, "jail");

/// A manager that is loaded on first access.
#[derive(Debug, Default)]
struct Slot<M> {
    manager: Option<M>,
}

impl<M: Persisted> Slot<M> {
    fn get(&mut self, path: &Path) -> &mut M {
        self.manager.get_or_insert_with(|| open(path))
    }

    const fn loaded(&self) -> Option<&M> {
        self.manager.as_ref()
    }

    fn save(&self, path: &Path) -> Result<bool, RecordError> {
        let Some(manager) = self.loaded() else {
            return Ok(false);
        };
        manager.save_to(path)?;
        Ok(true)
    }
}

/// Loads a manager, falling back to an empty one if the document is
/// unusable.
fn open<M: Persisted>(path: &Path) -> M {
    let mut manager = M::default();
    match manager.load_from(path) {
        Ok(count) => log::debug!("Opened {} records ({count} loaded)", M::LABEL),
        Err(e) => log::error!("{e}; continuing with empty {} records", M::LABEL),
    }
    manager
}

/// Owns one manager per family.
#[derive(Debug)]
pub struct Registry {
    paths: DataPaths,
    officers: Slot<OfficerManager>,
    crimes: Slot<CrimeManager>,
    forensics: Slot<ForensicsManager>,
    patrol: Slot<PatrolManager>,
    jail: Slot<JailManager>,
}

impl Registry {
    #[must_use]
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            officers: Slot::default(),
            crimes: Slot::default(),
            forensics: Slot::default(),
            patrol: Slot::default(),
            jail: Slot::default(),
        }
    }

    #[must_use]
    pub const fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn officers(&mut self) -> &mut OfficerManager {
        self.officers.get(&self.paths.officers)
    }

    pub fn crimes(&mut self) -> &mut CrimeManager {
        self.crimes.get(&self.paths.crimes)
    }

    pub fn forensics(&mut self) -> &mut ForensicsManager {
        self.forensics.get(&self.paths.forensics)
    }

    pub fn patrol(&mut self) -> &mut PatrolManager {
        self.patrol.get(&self.paths.patrol)
    }

    pub fn jail(&mut self) -> &mut JailManager {
        self.jail.get(&self.paths.jail)
    }

    /// The forensics manager together with the stores its references
    /// resolve against.
    pub fn forensics_with_lookups(
        &mut self,
    ) -> (&mut ForensicsManager, &CrimeManager, &OfficerManager) {
        let crimes = self.crimes.get(&self.paths.crimes);
        let officers = self.officers.get(&self.paths.officers);
        let forensics = self.forensics.get(&self.paths.forensics);
        (forensics, crimes, officers)
    }

    /// The patrol manager together with the officer roster.
    pub fn patrol_with_roster(&mut self) -> (&mut PatrolManager, &OfficerManager) {
        let officers = self.officers.get(&self.paths.officers);
        let patrol = self.patrol.get(&self.paths.patrol);
        (patrol, officers)
    }

    /// The jail manager together with the officer roster.
    pub fn jail_with_roster(&mut self) -> (&mut JailManager, &OfficerManager) {
        let officers = self.officers.get(&self.paths.officers);
        let jail = self.jail.get(&self.paths.jail);
        (jail, officers)
    }

    /// Loads every family, then resolves cross-family references. Each
    /// dangling reference is logged as a warning and returned.
    pub fn load_all(&mut self) -> Vec<DanglingReference> {
        self.officers();
        self.crimes();
        self.forensics();
        self.patrol();
        self.jail();
        self.dangling_references()
    }

    /// Cross-family references whose target does not exist.
    pub fn dangling_references(&mut self) -> Vec<DanglingReference> {
        let mut dangling = {
            let (forensics, crimes, officers) = self.forensics_with_lookups();
            forensics.dangling_references(crimes, officers)
        };
        {
            let (patrol, officers) = self.patrol_with_roster();
            dangling.extend(patrol.dangling_references(officers));
        }
        {
            let (jail, officers) = self.jail_with_roster();
            dangling.extend(jail.dangling_references(officers));
        }

        for reference in &dangling {
            log::warn!("{reference}");
        }
        dangling
    }

    /// Saves one family if it has been opened. Returns whether anything was
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] or [`RecordError::Json`] on failure.
    pub fn save(&self, family: Family) -> Result<bool, RecordError> {
        let path = self.paths.for_family(family);
        match family {
            Family::Officer => self.officers.save(path),
            Family::Crime => self.crimes.save(path),
            Family::Forensics => self.forensics.save(path),
            Family::Patrol => self.patrol.save(path),
            Family::Jail => self.jail.save(path),
        }
    }

    /// Saves every opened family and returns how many were written.
    ///
    /// # Errors
    ///
    /// Stops at the first family that fails to save.
    pub fn save_all(&self) -> Result<usize, RecordError> {
        let mut saved = 0;
        for &family in Family::ALL {
            if self.save(family)? {
                saved += 1;
            }
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use lems_crime::models::THEFT;
    use lems_forensics::models::Evidence;
    use lems_officer::models::CONSTABLE;

    use super::*;

    fn registry(dir: &Path) -> Registry {
        Registry::new(DataPaths::new(dir))
    }

    #[test]
    fn families_load_on_first_access_and_persist() {
        let dir = tempfile::tempdir().unwrap();

        let mut first = registry(dir.path());
        first
            .officers()
            .add_from_fields(CONSTABLE, None, "Bilal", &[("beat", "North")])
            .unwrap();
        assert!(first.save(Family::Officer).unwrap());
        assert!(!first.save(Family::Jail).unwrap());
        assert!(!first.paths().jail.exists());

        let mut second = registry(dir.path());
        assert_eq!(second.officers().len(), 1);
        assert_eq!(second.officers().find(1).unwrap().name, "Bilal");
    }

    #[test]
    fn malformed_document_leaves_family_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DataPaths::OFFICERS), "not json").unwrap();

        let mut registry = registry(dir.path());
        assert!(registry.officers().is_empty());
        assert_eq!(registry.officers().next_id(), 1);
    }

    #[test]
    fn references_resolve_after_every_family_loads() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());

        let mut forensics = ForensicsManager::new();
        forensics.insert_evidence(Evidence::new(1, 7)).unwrap();
        forensics.save(&paths.forensics).unwrap();

        let dangling = registry(dir.path()).load_all();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].field, "caseId");
        assert_eq!(dangling[0].target_id, 7);

        let mut crimes = CrimeManager::new();
        crimes.add_case_from_fields(THEFT, Some(7), &[]).unwrap();
        crimes.save(&paths.crimes).unwrap();

        assert!(registry(dir.path()).load_all().is_empty());
    }

    #[test]
    fn lookups_see_the_same_stores() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = registry(dir.path());
        registry.crimes().add_case_from_fields(THEFT, Some(3), &[]).unwrap();

        let (forensics, crimes, _) = registry.forensics_with_lookups();
        let id = forensics.add_evidence(3, "Fingerprint", "", crimes).unwrap();
        assert_eq!(registry.forensics().find_evidence(id).unwrap().case_id, 3);
        assert_eq!(registry.save_all().unwrap(), 3);
        assert!(!registry.paths().patrol.exists());
    }
}
