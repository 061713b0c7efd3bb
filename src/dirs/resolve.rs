use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::dirs::table::{self, Source};
use crate::dirs::{DirectoryType, ResolveError, UnknownDirectoryType};
use crate::os::env::Env;
use crate::os::platform::Platform;
use crate::os::special_folder::SpecialFolderQuery;

/// Whether Windows special folder rules may be queried.
///
/// Querying may spawn an external process, so it is opt-in.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum SpecialFolderPolicy {
    /// Skip special folder rules. A resulting [`ResolveError::NoValueFound`] reports it.
    #[default]
    Skip,
    /// Query special folder rules.
    Query,
}

/// Directory to resolve, either known or by (case-insensitive) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requested<'a> {
    Known(DirectoryType),
    Named(&'a str),
}

impl From<DirectoryType> for Requested<'_> {
    fn from(dir: DirectoryType) -> Self {
        Requested::Known(dir)
    }
}

impl<'a> From<&'a str> for Requested<'a> {
    fn from(name: &'a str) -> Self {
        Requested::Named(name)
    }
}

impl<'a> From<&'a String> for Requested<'a> {
    fn from(name: &'a String) -> Self {
        Requested::Named(name)
    }
}

/// Resolves [`DirectoryType`]s by walking their rules in [`table::TABLE`].
///
/// Nothing is cached: unless fixed through [`ResolverBuilder`], platform and environment are
/// read anew on every call.
#[derive(Debug, Clone)]
pub struct Resolver {
    env: Option<Env>,
    platform: Option<Platform>,
    special_folders: Arc<dyn SpecialFolderQuery>,
}

/// Builder for [`Resolver`].
#[derive(Debug, Default)]
pub struct ResolverBuilder {
    env: Option<Env>,
    platform: Option<Platform>,
    special_folders: Option<Arc<dyn SpecialFolderQuery>>,
}

impl ResolverBuilder {
    /// Read variables from `env` instead of the process environment.
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    /// Resolve for `platform` instead of the detected one.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Backend for [`Source::SpecialFolder`] rules.
    ///
    /// Defaults to `KnownFolders` with feature `known-folders` on Windows,
    /// [`ShellQuery::powershell`](crate::os::special_folder::ShellQuery::powershell) otherwise.
    pub fn special_folders(mut self, query: impl SpecialFolderQuery + 'static) -> Self {
        self.special_folders = Some(Arc::new(query));
        self
    }

    pub fn build(self) -> Resolver {
        Resolver {
            env: self.env,
            platform: self.platform,
            special_folders: self
                .special_folders
                .unwrap_or_else(default_special_folders),
        }
    }
}

#[cfg(all(windows, feature = "known-folders"))]
fn default_special_folders() -> Arc<dyn SpecialFolderQuery> {
    Arc::new(crate::os::known_folder::KnownFolders)
}

#[cfg(not(all(windows, feature = "known-folders")))]
fn default_special_folders() -> Arc<dyn SpecialFolderQuery> {
    Arc::new(crate::os::special_folder::ShellQuery::powershell())
}

impl Default for Resolver {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// Resolve `requested` to an absolute path.
    ///
    /// Rules are tried in order and the first one producing a value wins: its base value with
    /// the extra folder appended verbatim, or its default directory if the base has no value.
    ///
    /// # Errors
    /// - [`ResolveError::UnsupportedOnPlatform`] if there are no rules for `requested` on the
    ///   platform, or `requested` names no [`DirectoryType`].
    /// - [`ResolveError::NoValueFound`] if every rule came up empty.
    ///
    /// # Examples
    /// ```rust
    /// use dirkit::dirs::{Resolver, SpecialFolderPolicy};
    /// use dirkit::os::{env::Env, platform::Platform};
    /// use std::path::PathBuf;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), dirkit::dirs::ResolveError> {
    /// let resolver = Resolver::builder()
    ///     .platform(Platform::Linux)
    ///     .env([("HOME", "/home/alice")].into_iter().collect::<Env>())
    ///     .build();
    ///
    /// let config = resolver.resolve("config", SpecialFolderPolicy::Skip).await?;
    /// assert_eq!(config, PathBuf::from("/home/alice/.config"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve<'a>(
        &self,
        requested: impl Into<Requested<'a>>,
        policy: SpecialFolderPolicy,
    ) -> Result<PathBuf, ResolveError> {
        let platform = self.platform.unwrap_or_else(Platform::detect);
        let dir = match requested.into() {
            Requested::Known(dir) => dir,
            Requested::Named(name) => name
                .parse::<DirectoryType>()
                .map_err(|UnknownDirectoryType(requested)| {
                    ResolveError::UnsupportedOnPlatform {
                        requested,
                        platform,
                    }
                })?,
        };
        let rules =
            table::lookup(dir, platform).ok_or_else(|| ResolveError::UnsupportedOnPlatform {
                requested: dir.to_string(),
                platform,
            })?;

        let snapshot;
        let env = match &self.env {
            Some(env) => env,
            None => {
                snapshot = Env::new();
                &snapshot
            }
        };

        let mut special_folders_skipped = false;
        for rule in rules {
            let base = match rule.source {
                Source::SpecialFolder(identifier) if platform == Platform::Windows => {
                    match policy {
                        SpecialFolderPolicy::Skip => {
                            trace!(%dir, identifier, "skipping special folder");
                            special_folders_skipped = true;
                            continue;
                        }
                        SpecialFolderPolicy::Query => self
                            .special_folders
                            .query(identifier)
                            .await
                            .map(|value| value.trim().to_owned())
                            .filter(|value| !value.is_empty()),
                    }
                }
                Source::SpecialFolder(key) | Source::Env(key) => env.value(key).map(str::to_owned),
            };
            trace!(
                %dir,
                %platform,
                source = ?rule.source,
                found = base.is_some(),
                "evaluated rule"
            );

            if let Some(mut path) = base {
                if let Some(extra_folder) = rule.extra_folder {
                    path.push_str(extra_folder);
                }
                debug!(
                    %dir,
                    %platform,
                    source = ?rule.source,
                    path = path.as_str(),
                    "resolved directory"
                );
                return Ok(PathBuf::from(path));
            }
            if let Some(default_dir) = rule.default_dir {
                debug!(%dir, %platform, default_dir, "falling back to default directory");
                return Ok(PathBuf::from(default_dir));
            }
        }

        debug!(%dir, %platform, special_folders_skipped, "no rule produced a value");
        Err(ResolveError::NoValueFound {
            dir,
            platform,
            special_folders_skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::table::TABLE;
    use async_trait::async_trait;
    use claim::{assert_err, assert_ok, assert_ok_eq};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records queried identifiers, answers from `paths`.
    #[derive(Debug, Default)]
    struct FakeFolders {
        paths: HashMap<&'static str, &'static str>,
        queried: Mutex<Vec<String>>,
    }

    impl FakeFolders {
        fn with(paths: &[(&'static str, &'static str)]) -> Arc<Self> {
            Arc::new(Self {
                paths: paths.iter().copied().collect(),
                queried: Mutex::default(),
            })
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpecialFolderQuery for FakeFolders {
        async fn query(&self, identifier: &str) -> Option<String> {
            self.queried.lock().unwrap().push(identifier.to_owned());
            self.paths.get(identifier).map(|path| path.to_string())
        }
    }

    fn resolver_for(platform: Platform, vars: &[(&str, &str)]) -> Resolver {
        resolver_with(platform, vars, FakeFolders::with(&[]))
    }

    fn resolver_with(
        platform: Platform,
        vars: &[(&str, &str)],
        folders: Arc<FakeFolders>,
    ) -> Resolver {
        Resolver::builder()
            .platform(platform)
            .env(vars.iter().copied().collect())
            .special_folders(folders)
            .build()
    }

    #[tokio::test]
    async fn first_rule_wins_for_every_entry() {
        for set in &TABLE {
            for platform in Platform::ALL {
                let Some(first) = set.rules(platform).first() else {
                    continue;
                };
                let (vars, folders) = match first.source {
                    Source::Env(key) => (vec![(key, "/base")], FakeFolders::with(&[])),
                    Source::SpecialFolder(id) => (vec![], FakeFolders::with(&[(id, "/base")])),
                };
                let resolver = resolver_with(platform, &vars, folders);
                let expected = format!("/base{}", first.extra_folder.unwrap_or_default());
                assert_ok_eq!(
                    resolver.resolve(set.dir, SpecialFolderPolicy::Query).await,
                    PathBuf::from(expected),
                    "{} on {platform}",
                    set.dir
                );
            }
        }
    }

    #[tokio::test]
    async fn unsupported_on_platform() {
        let resolver = resolver_for(Platform::Macos, &[("HOME", "/Users/bob")]);
        let err = assert_err!(
            resolver.resolve(DirectoryType::Executable, SpecialFolderPolicy::Query).await
        );
        assert_eq!(
            err,
            ResolveError::UnsupportedOnPlatform {
                requested: "executable".to_owned(),
                platform: Platform::Macos,
            }
        );

        let resolver = resolver_for(Platform::Windows, &[]);
        assert_err!(resolver.resolve("public", SpecialFolderPolicy::Query).await);
    }

    #[tokio::test]
    async fn unknown_name_is_unsupported() {
        let resolver = resolver_for(Platform::Linux, &[("HOME", "/home/alice")]);
        let err = assert_err!(resolver.resolve("State", SpecialFolderPolicy::Skip).await);
        assert_eq!(
            err,
            ResolveError::UnsupportedOnPlatform {
                requested: "State".to_owned(),
                platform: Platform::Linux,
            }
        );
        assert!(err.to_string().contains("`State`"));
        assert!(err.to_string().contains("linux"));
    }

    #[tokio::test]
    async fn no_value_found() {
        let resolver = resolver_for(
            Platform::Linux,
            &[("XDG_MUSIC_DIR", ""), ("HOME", "/home/alice")],
        );
        let err = assert_err!(
            resolver.resolve(DirectoryType::Audio, SpecialFolderPolicy::Skip).await
        );
        assert_eq!(
            err,
            ResolveError::NoValueFound {
                dir: DirectoryType::Audio,
                platform: Platform::Linux,
                special_folders_skipped: false,
            }
        );
    }

    #[tokio::test]
    async fn later_rule_used_when_earlier_is_empty() {
        let resolver = resolver_for(
            Platform::Linux,
            &[("XDG_CACHE_HOME", ""), ("HOME", "/home/alice")],
        );
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Cache, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/home/alice/.cache")
        );

        let resolver = resolver_for(
            Platform::Linux,
            &[("XDG_CACHE_HOME", "/var/cache/alice"), ("HOME", "/home/alice")],
        );
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Cache, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/var/cache/alice")
        );
    }

    #[tokio::test]
    async fn extra_folder_is_appended_verbatim() {
        let resolver = resolver_for(
            Platform::Linux,
            &[("XDG_DATA_HOME", "/home/alice/.local/share/"), ("HOME", "/home/alice")],
        );
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Executable, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/home/alice/.local/share//../bin")
        );
    }

    #[tokio::test]
    async fn default_dir_fallback() {
        let resolver = resolver_for(Platform::Linux, &[("TMPDIR", "")]);
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Tmp, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/tmp")
        );

        let resolver = resolver_for(Platform::Linux, &[("TMPDIR", "/run/user/1000/tmp")]);
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Tmp, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/run/user/1000/tmp")
        );

        let resolver = resolver_for(Platform::Macos, &[]);
        assert_err!(resolver.resolve(DirectoryType::Tmp, SpecialFolderPolicy::Skip).await);
    }

    #[tokio::test]
    async fn special_folders_are_gated() {
        let folders = FakeFolders::with(&[("MyMusic", r"C:\Users\Carol\Music")]);
        let resolver = resolver_with(Platform::Windows, &[], folders.clone());

        let err = assert_err!(
            resolver.resolve(DirectoryType::Audio, SpecialFolderPolicy::Skip).await
        );
        assert!(err.special_folders_skipped());
        assert!(err.to_string().contains("retrying"));
        assert!(folders.queried().is_empty());

        assert_ok_eq!(
            resolver.resolve(DirectoryType::Audio, SpecialFolderPolicy::Query).await,
            PathBuf::from(r"C:\Users\Carol\Music")
        );
        assert_eq!(folders.queried(), ["MyMusic"]);
    }

    #[tokio::test]
    async fn skipped_special_folder_does_not_hide_later_rules() {
        let folders = FakeFolders::with(&[("UserProfile", r"C:\Users\Other")]);
        let resolver = resolver_with(Platform::Windows, &[], folders.clone());
        let err = assert_err!(
            resolver.resolve(DirectoryType::Home, SpecialFolderPolicy::Skip).await
        );
        assert_eq!(
            err,
            ResolveError::NoValueFound {
                dir: DirectoryType::Home,
                platform: Platform::Windows,
                special_folders_skipped: true,
            }
        );
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Home, SpecialFolderPolicy::Query).await,
            PathBuf::from(r"C:\Users\Other")
        );
    }

    #[tokio::test]
    async fn env_rule_short_circuits_special_folder() {
        let folders = FakeFolders::with(&[("LocalApplicationData", r"C:\ignored")]);
        let resolver = resolver_with(
            Platform::Windows,
            &[("LOCALAPPDATA", r"C:\Users\Carol\AppData\Local")],
            folders.clone(),
        );
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Cache, SpecialFolderPolicy::Query).await,
            PathBuf::from(r"C:\Users\Carol\AppData\Local")
        );
        assert!(folders.queried().is_empty());
    }

    #[tokio::test]
    async fn blank_special_folder_has_no_value() {
        let folders = FakeFolders::with(&[("UserProfile", "  \r\n")]);
        let resolver = resolver_with(Platform::Windows, &[], folders);
        let err = assert_err!(
            resolver.resolve(DirectoryType::Download, SpecialFolderPolicy::Query).await
        );
        assert!(!err.special_folders_skipped());
    }

    #[tokio::test]
    async fn special_folder_value_is_trimmed() {
        let folders = FakeFolders::with(&[("UserProfile", " C:\\Users\\Carol\r\n")]);
        let resolver = resolver_with(Platform::Windows, &[], folders);
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Download, SpecialFolderPolicy::Query).await,
            PathBuf::from(r"C:\Users\Carol\Downloads")
        );
    }

    #[tokio::test]
    async fn names_are_case_insensitive() {
        let resolver = resolver_for(Platform::Linux, &[("HOME", "/home/alice")]);
        let upper = resolver.resolve("CACHE", SpecialFolderPolicy::Skip).await;
        let lower = resolver.resolve("cache", SpecialFolderPolicy::Skip).await;
        let known = resolver.resolve(DirectoryType::Cache, SpecialFolderPolicy::Skip).await;
        assert_ok!(&known);
        assert_eq!(upper, known);
        assert_eq!(lower, known);

        let name = String::from("Data_Local");
        assert_ok_eq!(
            resolver.resolve(&name, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/home/alice/.local/share")
        );
    }

    #[tokio::test]
    async fn linux_config_falls_back_to_home() {
        let resolver = resolver_for(Platform::Linux, &[("HOME", "/home/alice")]);
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Config, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/home/alice/.config")
        );
    }

    #[tokio::test]
    async fn macos_download() {
        let resolver = resolver_for(Platform::Macos, &[("HOME", "/Users/bob")]);
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Download, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/Users/bob/Downloads")
        );
    }

    #[tokio::test]
    async fn windows_home() {
        let resolver = resolver_for(Platform::Windows, &[("USERPROFILE", r"C:\Users\Carol")]);
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Home, SpecialFolderPolicy::Skip).await,
            PathBuf::from(r"C:\Users\Carol")
        );
    }

    #[tokio::test]
    async fn detects_platform_when_not_fixed() {
        let resolver = Resolver::builder()
            .env([("HOME", "/home/alice"), ("USERPROFILE", "/home/alice")].into_iter().collect())
            .special_folders(FakeFolders::with(&[]))
            .build();
        assert_ok_eq!(
            resolver.resolve(DirectoryType::Home, SpecialFolderPolicy::Skip).await,
            PathBuf::from("/home/alice")
        );
    }
}
