// Public API exports
pub mod config;
pub mod sandbox;
pub mod security;

// Re-export main types for convenience
pub use config::SandboxConfig;
pub use sandbox::{
    DirectoryEntry, ErrorKind, SandboxBuilder, SandboxError, SandboxedFileService,
};
pub use security::PathGuard;
