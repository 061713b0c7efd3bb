use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

use thiserror::Error;
use tracing::trace;

/// Snapshot of environmental variables, consulted by the directory resolver.
///
/// On Windows lookups fall back to a case-insensitive match, since its environment is
/// case-insensitive (`UserProfile` and `USERPROFILE` name the same variable).
#[derive(Debug, Clone)]
pub struct Env {
    vars: HashMap<OsString, OsString>,

    folded_vars: HashMap<OsString, OsString>,
}

/// Errors encountered when getting environmental variable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvStrError {
    /// Variable `Missing.0` is not set.
    #[error("there is no environmental variable `${0:?}`")]
    Missing(OsString),

    /// Variable `NonUTF8.0` is set, but is not an UTF-8 string.
    #[error("environmental variable `${0:?}` is not an UTF-8 string")]
    NonUTF8(OsString),
}

impl Env {
    /// Take a snapshot of the current process environment.
    pub fn new() -> Self {
        Self::new_from(std::env::vars_os().collect())
    }

    /// Create [`Env`] using `vars` as the only existing variables.
    pub fn new_from(vars: HashMap<OsString, OsString>) -> Self {
        Self {
            folded_vars: Env::fold_map(&vars),
            vars,
        }
    }

    fn fold_key(key: impl AsRef<OsStr>) -> OsString {
        key.as_ref().to_ascii_uppercase()
    }

    fn fold_map(vars: &HashMap<OsString, OsString>) -> HashMap<OsString, OsString> {
        vars.iter()
            .map(|(key, value)| (Env::fold_key(key), value.clone()))
            .collect()
    }

    /// Replace the snapshot with `vars`.
    pub fn reload_from(&mut self, vars: HashMap<OsString, OsString>) {
        self.folded_vars = Env::fold_map(&vars);
        self.vars = vars;
    }

    /// Replace the snapshot with the current process environment.
    pub fn reload(&mut self) {
        self.reload_from(std::env::vars_os().collect())
    }

    /// Get raw value of `key`.
    ///
    /// ```rust
    /// use dirkit::os::env::Env;
    ///
    /// let env = Env::new();
    /// println!("$HOME = {:?}", env.get_os("HOME"));
    /// ```
    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        match self.vars.get(key) {
            Some(value) => Some(value),
            None if cfg!(windows) => self
                .folded_vars
                .get(&Env::fold_key(key))
                .map(OsString::as_os_str),
            None => None,
        }
    }

    /// Get value of `key` as UTF-8.
    ///
    /// ```rust
    /// use dirkit::os::env::{Env, EnvStrError};
    /// use std::collections::HashMap;
    ///
    /// let env = Env::new_from(HashMap::from([("HOME".into(), "/home/alice".into())]));
    /// assert_eq!(env.get("HOME"), Ok("/home/alice"));
    /// assert_eq!(env.get("XDG_CONFIG_HOME"), Err(EnvStrError::Missing("XDG_CONFIG_HOME".into())));
    /// ```
    pub fn get(&self, key: impl AsRef<OsStr>) -> Result<&str, EnvStrError> {
        let key = key.as_ref();
        self.get_os(key)
            .ok_or_else(|| EnvStrError::Missing(key.to_os_string()))?
            .to_str()
            .ok_or_else(|| EnvStrError::NonUTF8(key.to_os_string()))
    }

    /// Get non-empty UTF-8 value of `key`.
    ///
    /// Missing, empty and non UTF-8 variables all count as having no value.
    pub fn value(&self, key: impl AsRef<OsStr>) -> Option<&str> {
        match self.get(key) {
            Ok("") => None,
            Ok(value) => Some(value),
            Err(err) => {
                trace!(%err, "environment variable unusable");
                None
            }
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Env::new_from(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
