use thiserror::Error;

use crate::dirs::DirectoryType;
use crate::os::platform::Platform;

/// Errors encountered when resolving a directory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// There are no rules for `requested` on `platform`.
    ///
    /// `requested` is the raw input if it named no known [`DirectoryType`].
    #[error("directory type `{requested}` is not supported on this platform ({platform})")]
    UnsupportedOnPlatform { requested: String, platform: Platform },

    /// Every rule for `dir` on `platform` came up empty.
    #[error("no value found for `{dir}` on {platform}{}", retry_hint(.special_folders_skipped))]
    NoValueFound {
        dir: DirectoryType,
        platform: Platform,
        /// Some special folder rules were skipped by
        /// [`SpecialFolderPolicy::Skip`](crate::dirs::SpecialFolderPolicy::Skip).
        special_folders_skipped: bool,
    },
}

fn retry_hint(skipped: &bool) -> &'static str {
    if *skipped {
        "; special folder queries were skipped, retrying with them allowed may succeed"
    } else {
        ""
    }
}

impl ResolveError {
    /// Whether retrying with
    /// [`SpecialFolderPolicy::Query`](crate::dirs::SpecialFolderPolicy::Query) could change
    /// the outcome.
    pub fn special_folders_skipped(&self) -> bool {
        matches!(
            self,
            ResolveError::NoValueFound {
                special_folders_skipped: true,
                ..
            }
        )
    }
}
