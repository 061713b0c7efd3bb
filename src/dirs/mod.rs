//! Standard user directories and their resolution.
//!
//! ```rust,no_run
//! # use dirkit::dirs::{DirectoryType, Resolver, SpecialFolderPolicy};
//! # async fn foo() -> Result<(), dirkit::dirs::ResolveError> {
//! let resolver = Resolver::default();
//!
//! let cache = resolver.resolve(DirectoryType::Cache, SpecialFolderPolicy::Skip).await?;
//! let music = resolver.resolve("audio", SpecialFolderPolicy::Query).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

mod error;
mod resolve;
pub mod table;

pub use error::ResolveError;
pub use resolve::{Requested, Resolver, ResolverBuilder, SpecialFolderPolicy};

/// Standard user directory.
///
/// Discriminants index [`table::TABLE`].
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum DirectoryType {
    /// The user's home directory.
    Home,
    /// Application specific cache data.
    Cache,
    /// Application configuration.
    Config,
    /// Application specific data.
    Data,
    /// Application specific local (non-roaming) data.
    DataLocal,
    /// The user's download directory.
    Download,
    /// Short-lived files.
    Tmp,
    /// User executables (Linux only).
    Executable,
    Audio,
    Desktop,
    Document,
    Font,
    Picture,
    /// Files shared with other users (Linux and macOS).
    Public,
    /// Document templates (Linux and Windows).
    Template,
    Video,
}

/// Error returned when parsing an unknown directory name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown directory type `{0}`")]
pub struct UnknownDirectoryType(pub String);

impl DirectoryType {
    pub const COUNT: usize = 16;

    /// Every directory type, in discriminant order.
    pub const ALL: [DirectoryType; Self::COUNT] = [
        DirectoryType::Home,
        DirectoryType::Cache,
        DirectoryType::Config,
        DirectoryType::Data,
        DirectoryType::DataLocal,
        DirectoryType::Download,
        DirectoryType::Tmp,
        DirectoryType::Executable,
        DirectoryType::Audio,
        DirectoryType::Desktop,
        DirectoryType::Document,
        DirectoryType::Font,
        DirectoryType::Picture,
        DirectoryType::Public,
        DirectoryType::Template,
        DirectoryType::Video,
    ];

    /// Snake case name, as accepted by [`FromStr`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            DirectoryType::Home => "home",
            DirectoryType::Cache => "cache",
            DirectoryType::Config => "config",
            DirectoryType::Data => "data",
            DirectoryType::DataLocal => "data_local",
            DirectoryType::Download => "download",
            DirectoryType::Tmp => "tmp",
            DirectoryType::Executable => "executable",
            DirectoryType::Audio => "audio",
            DirectoryType::Desktop => "desktop",
            DirectoryType::Document => "document",
            DirectoryType::Font => "font",
            DirectoryType::Picture => "picture",
            DirectoryType::Public => "public",
            DirectoryType::Template => "template",
            DirectoryType::Video => "video",
        }
    }
}

impl fmt::Display for DirectoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive.
impl FromStr for DirectoryType {
    type Err = UnknownDirectoryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectoryType::ALL
            .into_iter()
            .find(|dir| dir.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDirectoryType(s.to_owned()))
    }
}
