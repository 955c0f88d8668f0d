//! Compiled contract artifacts and call encoding for the contracts the
//! harness deploys and talks to.

pub mod artifact;
pub mod polygon_dao;

#[cfg(any(test, feature = "test-util"))]
pub use artifact::MockArtifactSource;
pub use {
    artifact::{Artifact, ArtifactDir, ArtifactError, ArtifactSource, ArgumentError, Artifacts},
    polygon_dao::PolygonDAO,
};
