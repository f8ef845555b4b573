// Reportmill Infrastructure - Filesystem Artifact Store

mod artifact_store;

pub use artifact_store::FsArtifactStore;
