//! The two collaborator seams: acquiring media and publishing the artifact.

/// Handing the finished artifact to durable storage.
pub mod publish;
/// Resolving media references to local decodable files.
pub mod source;
