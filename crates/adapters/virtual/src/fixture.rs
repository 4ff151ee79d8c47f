//! Home fixture — the entities a virtual session starts with.

use std::path::Path;

use serde::Deserialize;

use hmip_bridge_domain::entity::{Entity, EntityCategory};

use crate::error::VirtualSessionError;

const DEMO: &str = include_str!("../fixtures/home.toml");

/// Groups, devices and the home object, as the platform would report them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HomeFixture {
    pub groups: Vec<Entity>,
    pub devices: Vec<Entity>,
    pub home: Option<Entity>,
}

impl HomeFixture {
    /// Parse a fixture from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualSessionError::Parse`] on malformed TOML and
    /// [`VirtualSessionError::InvalidFixture`] when an entity sits in the
    /// wrong list.
    pub fn from_toml(contents: &str) -> Result<Self, VirtualSessionError> {
        let fixture: Self = toml::from_str(contents)?;
        fixture.validate()?;
        Ok(fixture)
    }

    /// Read and parse a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualSessionError::Io`] if the file cannot be read, or any
    /// error of [`from_toml`](Self::from_toml).
    pub fn from_file(path: &Path) -> Result<Self, VirtualSessionError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// The built-in demo home.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled fixture is broken.
    pub fn demo() -> Result<Self, VirtualSessionError> {
        Self::from_toml(DEMO)
    }

    fn validate(&self) -> Result<(), VirtualSessionError> {
        let misplaced = self
            .groups
            .iter()
            .find(|e| e.category() != EntityCategory::Groups)
            .or_else(|| {
                self.devices
                    .iter()
                    .find(|e| e.category() != EntityCategory::Devices)
            })
            .or_else(|| {
                self.home
                    .as_ref()
                    .filter(|e| e.category() != EntityCategory::Home)
            });
        match misplaced {
            Some(entity) => Err(VirtualSessionError::InvalidFixture(format!(
                "{} {} is listed under the wrong category",
                entity.kind_name(),
                entity.id()
            ))),
            None => Ok(()),
        }
    }
}
