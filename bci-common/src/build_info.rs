//! Build identification shown in the startup banner

/// Compile-time identity of an executable
///
/// Built with [`build_info!`](crate::build_info) from inside the binary
/// crate, whose `build.rs` provides the stamp variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    pub built_at: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    /// `Starting <name> v<version> [<git>] built <time> (<profile>)`
    pub fn banner(&self) -> String {
        format!(
            "Starting {} v{} [{}] built {} ({})",
            self.name, self.version, self.git_hash, self.built_at, self.profile
        )
    }
}

/// Capture the calling crate's [`BuildInfo`]
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::build_info::BuildInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("GIT_HASH"),
            built_at: env!("BUILD_TIMESTAMP"),
            profile: env!("BUILD_PROFILE"),
        }
    };
}
