//! Dirkit - portable resolution of standard user directories.
//!
//! Maps a [`DirectoryType`](dirs::DirectoryType) to its OS-idiomatic location on Windows,
//! macOS and Linux (XDG), using environmental variables and, on Windows, special folder
//! queries. Paths are neither created nor checked for existence.
//!
//! ```rust,no_run
//! # async fn foo() -> Result<(), dirkit::dirs::ResolveError> {
//! use dirkit::dirs::{DirectoryType, SpecialFolderPolicy};
//!
//! let config = dirkit::dir(DirectoryType::Config).await?;
//! let pictures = dirkit::dir_with("picture", SpecialFolderPolicy::Query).await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use crate::dirs::{Requested, ResolveError, Resolver, SpecialFolderPolicy};

pub mod dirs;
pub mod os;

/// Resolve `requested` with a default [`Resolver`], skipping special folder queries.
pub async fn dir<'a>(requested: impl Into<Requested<'a>>) -> Result<PathBuf, ResolveError> {
    dir_with(requested, SpecialFolderPolicy::Skip).await
}

/// Resolve `requested` with a default [`Resolver`].
pub async fn dir_with<'a>(
    requested: impl Into<Requested<'a>>,
    policy: SpecialFolderPolicy,
) -> Result<PathBuf, ResolveError> {
    Resolver::default().resolve(requested, policy).await
}
