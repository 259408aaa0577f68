use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Where "current location" comes from.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self) -> Result<Coordinates>;
}

/// A position supplied up front (command-line flags or config). With no
/// position, permission is denied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedLocation {
    position: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn at(lat: f64, lng: f64) -> Self {
        Self::new(Some(Coordinates::new(lat, lng)))
    }

    pub fn unknown() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn request_permission(&self) -> PermissionStatus {
        match self.position {
            Some(_) => PermissionStatus::Granted,
            None => PermissionStatus::Denied,
        }
    }

    async fn current_position(&self) -> Result<Coordinates> {
        let coords = self
            .position
            .ok_or_else(|| anyhow!("No position available"))?;

        if !(-90.0..=90.0).contains(&coords.lat) || !(-180.0..=180.0).contains(&coords.lng) {
            return Err(anyhow!("Position {coords} is out of range"));
        }
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_position_is_granted() {
        let source = FixedLocation::at(24.86, 67.0);
        assert_eq!(source.request_permission().await, PermissionStatus::Granted);
        assert_eq!(
            source.current_position().await.unwrap(),
            Coordinates::new(24.86, 67.0)
        );
    }

    #[tokio::test]
    async fn unknown_position_is_denied() {
        let source = FixedLocation::unknown();
        assert_eq!(source.request_permission().await, PermissionStatus::Denied);
        assert!(source.current_position().await.is_err());
    }

    #[tokio::test]
    async fn out_of_range_position_errors() {
        let source = FixedLocation::at(120.0, 0.0);
        let err = source.current_position().await.unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
