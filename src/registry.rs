//! # Library Registry
//!
//! The registry is the ordered, immutable list of every library descriptor
//! known to a run. Declaration order matters: libraries are processed in the
//! order they are declared, and that order is also the only dependency order,
//! so a library must be declared after everything it links against.
//!
//! The built-in registry is embedded from `registry/libraries.yaml`; a
//! different file can be loaded with [`Registry::from_file`]. Either way every
//! descriptor is validated while loading.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::descriptor::{DescriptorDef, LibraryDescriptor};
use crate::error::{Error, Result};
use crate::platform::Platform;

const BUILTIN_REGISTRY: &str = include_str!("../registry/libraries.yaml");

/// Ordered collection of validated library descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    libraries: Vec<LibraryDescriptor>,
}

/// A dependency reference that the declaration order does not satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingIssue {
    /// `library` depends on `dependency`, which is declared after it.
    DeclaredLater { library: String, dependency: String },
    /// `library` depends on `dependency`, which is not declared for the platform.
    Unknown { library: String, dependency: String },
}

impl Registry {
    /// The registry shipped with the tool.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_REGISTRY)
    }

    /// Load a registry from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a registry from YAML text.
    pub fn parse(yaml: &str) -> Result<Self> {
        let defs: Vec<DescriptorDef> = serde_yaml::from_str(yaml)?;
        let libraries = defs
            .into_iter()
            .map(LibraryDescriptor::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(libraries)
    }

    /// Build a registry from descriptors, rejecting names declared twice for
    /// the same platform.
    pub fn new(libraries: Vec<LibraryDescriptor>) -> Result<Self> {
        for platform in Platform::ALL {
            let mut seen = HashSet::new();
            for lib in libraries.iter().filter(|lib| lib.supports(platform)) {
                if !seen.insert(lib.name.as_str()) {
                    return Err(Error::DuplicateLibrary {
                        name: lib.name.clone(),
                        platform: platform.to_string(),
                    });
                }
            }
        }
        Ok(Self { libraries })
    }

    pub fn libraries(&self) -> &[LibraryDescriptor] {
        &self.libraries
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Descriptors supporting `platform`, in declaration order.
    pub fn for_platform(&self, platform: Platform) -> impl Iterator<Item = &LibraryDescriptor> {
        self.libraries
            .iter()
            .filter(move |lib| lib.supports(platform))
    }

    /// Check that every active dependency of every library on `platform`
    /// refers to a library declared before it.
    ///
    /// This never reorders anything; callers report the issues and carry on.
    pub fn ordering_issues(&self, platform: Platform) -> Vec<OrderingIssue> {
        let positions: HashMap<&str, usize> = self
            .for_platform(platform)
            .enumerate()
            .map(|(index, lib)| (lib.name.as_str(), index))
            .collect();

        let mut issues = Vec::new();
        for (index, lib) in self.for_platform(platform).enumerate() {
            for dep in lib.dependencies.iter().filter(|d| d.applies_to(platform)) {
                match positions.get(dep.library.as_str()) {
                    None => issues.push(OrderingIssue::Unknown {
                        library: lib.name.clone(),
                        dependency: dep.library.clone(),
                    }),
                    Some(&position) if position >= index => {
                        issues.push(OrderingIssue::DeclaredLater {
                            library: lib.name.clone(),
                            dependency: dep.library.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        issues
    }
}
