//! Fixture catalogs for the conformance and compatibility sweeps.
//!
//! A catalog is data, loaded at harness start from TOML: the conformance
//! bundle to fetch, the conformance ROMs inside it, and the compatibility
//! cartridges that are expected to already exist on the machine. Each entry
//! carries a [`FixtureCategory`] tag describing the cartridge hardware it
//! exercises.

mod bundle;
mod error;
mod manifest;
mod types;

pub use bundle::{Acquisition, FixtureBundle, DEFAULT_BUNDLE_DIR, DEFAULT_BUNDLE_URL};
pub use error::{ManifestError, ManifestResult};
pub use manifest::{Catalog, CatalogFile, FixtureEntry, FixtureManifest};
pub use types::{Fixture, FixtureCategory, Sweep};
