//! External capabilities consumed by the directory resolver.
//!
//! [`Platform`](platform::Platform) detection, an [`Env`](env::Env) snapshot and the
//! [`SpecialFolderQuery`](special_folder::SpecialFolderQuery) capability with its backends.

pub mod command_ext;
pub mod env;
#[cfg(all(windows, feature = "known-folders"))]
pub mod known_folder;
pub mod platform;
pub mod special_folder;
