//! Domain values - pure release rules independent of process execution

pub mod bump;
pub mod prerelease;

pub use bump::VersionBump;
pub use prerelease::PreReleaseId;
