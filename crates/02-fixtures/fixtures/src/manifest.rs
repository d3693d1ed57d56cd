use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::{Fixture, FixtureBundle, FixtureCategory, ManifestError, ManifestResult, Sweep};

/// One `[[conformance]]` or `[[compatibility]]` table in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureEntry {
    pub category: FixtureCategory,
    pub path: PathBuf,
}

/// On-disk shape of a fixture catalog.
///
/// Conformance paths are relative to the bundle directory (absolute paths
/// are kept as-is); compatibility paths are used verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(default)]
    pub bundle: FixtureBundle,
    #[serde(default)]
    pub conformance: Vec<FixtureEntry>,
    #[serde(default)]
    pub compatibility: Vec<FixtureEntry>,
}

impl CatalogFile {
    /// Resolves entry paths and freezes the catalog.
    pub fn into_catalog(self) -> Catalog {
        let mut conformance = FixtureManifest::new(Sweep::Conformance);
        for entry in self.conformance {
            let path = self.bundle.dir.join(&entry.path);
            conformance.push(Fixture::new(entry.category, path));
        }

        let mut compatibility = FixtureManifest::new(Sweep::Compatibility);
        for entry in self.compatibility {
            compatibility.push(Fixture::new(entry.category, entry.path));
        }

        Catalog {
            bundle: self.bundle,
            conformance,
            compatibility,
        }
    }
}

/// Ordered list of fixtures for one sweep.
///
/// Iteration order is insertion order. An empty manifest is valid and runs
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureManifest {
    sweep: Sweep,
    fixtures: Vec<Fixture>,
}

impl FixtureManifest {
    pub fn new(sweep: Sweep) -> Self {
        Self {
            sweep,
            fixtures: Vec::new(),
        }
    }

    pub fn from_fixtures(sweep: Sweep, fixtures: impl IntoIterator<Item = Fixture>) -> Self {
        Self {
            sweep,
            fixtures: fixtures.into_iter().collect(),
        }
    }

    pub fn push(&mut self, fixture: Fixture) {
        self.fixtures.push(fixture);
    }

    pub fn sweep(&self) -> Sweep {
        self.sweep
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fixture> {
        self.fixtures.iter()
    }

    /// First fixture tagged with `category`.
    pub fn by_category(&self, category: FixtureCategory) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.category == category)
    }
}

impl<'a> IntoIterator for &'a FixtureManifest {
    type Item = &'a Fixture;
    type IntoIter = std::slice::Iter<'a, Fixture>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Both sweeps plus the bundle the conformance sweep depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    bundle: FixtureBundle,
    conformance: FixtureManifest,
    compatibility: FixtureManifest,
}

impl Catalog {
    /// Parses a catalog from TOML text; `origin` names the source in errors.
    pub fn from_toml_str(src: &str, origin: &str) -> ManifestResult<Self> {
        let file: CatalogFile = toml::from_str(src).map_err(|source| ManifestError::Parse {
            origin: origin.to_owned(),
            source,
        })?;
        let catalog = file.into_catalog();
        debug!(
            "loaded catalog {origin}: {} conformance, {} compatibility fixtures",
            catalog.conformance.len(),
            catalog.compatibility.len()
        );
        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    pub fn load(path: &Path) -> ManifestResult<Self> {
        let src = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src, &path.display().to_string())
    }

    pub fn bundle(&self) -> &FixtureBundle {
        &self.bundle
    }

    pub fn manifest(&self, sweep: Sweep) -> &FixtureManifest {
        match sweep {
            Sweep::Conformance => &self.conformance,
            Sweep::Compatibility => &self.compatibility,
        }
    }

    /// Finds a fixture by category label, or by exact path, across both sweeps.
    pub fn resolve(&self, query: &str) -> Option<&Fixture> {
        let all = || self.conformance.iter().chain(self.compatibility.iter());
        if let Ok(category) = query.parse::<FixtureCategory>() {
            return all().find(|f| f.category == category);
        }
        all().find(|f| f.path == Path::new(query))
    }
}
