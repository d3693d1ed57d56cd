//! Core type definitions for fixture metadata.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ManifestError;

/// Cartridge feature combination (or conformance area) a fixture exercises.
///
/// Purely nominal: the harness never checks it against what the emulator
/// claims to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixtureCategory {
    /// Plain 32 KiB cartridge without a memory bank controller.
    #[serde(rename = "rom-only")]
    RomOnly,
    /// MBC1.
    #[serde(rename = "mapper-1")]
    Mapper1,
    /// MBC1 with external RAM.
    #[serde(rename = "mapper-1+ram")]
    Mapper1Ram,
    /// MBC1 with battery-backed RAM.
    #[serde(rename = "mapper-1+ram+battery")]
    Mapper1RamBattery,
    /// MBC2 (built-in RAM) with battery.
    #[serde(rename = "mapper-2+battery")]
    Mapper2Battery,
    /// MBC3 with battery-backed RAM.
    #[serde(rename = "mapper-3+ram+battery")]
    Mapper3RamBattery,
    /// MBC3 with real-time clock and battery-backed RAM.
    #[serde(rename = "mapper-3+timer+ram+battery")]
    Mapper3TimerRamBattery,
    /// MBC5 with battery-backed RAM.
    #[serde(rename = "mapper-5+ram+battery")]
    Mapper5RamBattery,
    /// Instruction-set conformance ROM.
    #[serde(rename = "conformance-instruction-set")]
    ConformanceInstructionSet,
    /// Instruction-timing conformance ROM.
    #[serde(rename = "conformance-instruction-timing")]
    ConformanceInstructionTiming,
}

impl FixtureCategory {
    /// Every category, mapper tags first.
    pub const ALL: [FixtureCategory; 10] = [
        FixtureCategory::RomOnly,
        FixtureCategory::Mapper1,
        FixtureCategory::Mapper1Ram,
        FixtureCategory::Mapper1RamBattery,
        FixtureCategory::Mapper2Battery,
        FixtureCategory::Mapper3RamBattery,
        FixtureCategory::Mapper3TimerRamBattery,
        FixtureCategory::Mapper5RamBattery,
        FixtureCategory::ConformanceInstructionSet,
        FixtureCategory::ConformanceInstructionTiming,
    ];

    /// Label used in manifests and on the command line.
    pub fn label(self) -> &'static str {
        match self {
            FixtureCategory::RomOnly => "rom-only",
            FixtureCategory::Mapper1 => "mapper-1",
            FixtureCategory::Mapper1Ram => "mapper-1+ram",
            FixtureCategory::Mapper1RamBattery => "mapper-1+ram+battery",
            FixtureCategory::Mapper2Battery => "mapper-2+battery",
            FixtureCategory::Mapper3RamBattery => "mapper-3+ram+battery",
            FixtureCategory::Mapper3TimerRamBattery => "mapper-3+timer+ram+battery",
            FixtureCategory::Mapper5RamBattery => "mapper-5+ram+battery",
            FixtureCategory::ConformanceInstructionSet => "conformance-instruction-set",
            FixtureCategory::ConformanceInstructionTiming => "conformance-instruction-timing",
        }
    }

    /// Whether the category belongs to the conformance sweep.
    pub fn is_conformance(self) -> bool {
        matches!(
            self,
            FixtureCategory::ConformanceInstructionSet
                | FixtureCategory::ConformanceInstructionTiming
        )
    }
}

impl fmt::Display for FixtureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FixtureCategory {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixtureCategory::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| ManifestError::UnknownCategory(s.to_owned()))
    }
}

/// Which fixture list a run sweeps over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Instruction-set and timing ROMs from the fetched bundle.
    Conformance,
    /// Real-world cartridges at fixed local paths.
    Compatibility,
}

impl Sweep {
    /// Lower-case name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Sweep::Conformance => "conformance",
            Sweep::Compatibility => "compatibility",
        }
    }
}

/// A single cartridge image handed to the emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// What the fixture exercises.
    pub category: FixtureCategory,
    /// Resolved filesystem path; may contain spaces and brackets.
    pub path: PathBuf,
}

impl Fixture {
    /// Creates a fixture entry.
    pub fn new(category: FixtureCategory, path: impl Into<PathBuf>) -> Self {
        Self {
            category,
            path: path.into(),
        }
    }

    /// Filesystem path of the fixture.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
