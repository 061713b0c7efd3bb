//! Static rule table.
//!
//! For every [`DirectoryType`] and [`Platform`] there is an ordered list of [`Rule`]s, tried
//! first to last. Conventions followed:
//! - Linux: XDG Base Directory and `xdg-user-dirs` variables, `$HOME` fallbacks.
//! - macOS: `~/Library/...` and the standard home subfolders.
//! - Windows: profile environment variables and `System.Environment.SpecialFolder` names.
//!
//! Extra folders are appended verbatim, so they carry their own leading separator.

use crate::dirs::DirectoryType;
use crate::os::platform::Platform;

/// Where a [`Rule`] takes its base value from.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Source {
    /// Environmental variable.
    Env(&'static str),
    /// Windows special folder identifier.
    SpecialFolder(&'static str),
}

/// One candidate strategy for resolving a directory.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Rule {
    pub source: Source,
    /// Appended to the base value.
    pub extra_folder: Option<&'static str>,
    /// Returned verbatim if the source has no value.
    pub default_dir: Option<&'static str>,
}

impl Rule {
    pub const fn env(key: &'static str) -> Self {
        Self {
            source: Source::Env(key),
            extra_folder: None,
            default_dir: None,
        }
    }

    /// Only valid in [`RuleSet::windows`], which is checked at compile time for [`TABLE`].
    pub const fn special_folder(identifier: &'static str) -> Self {
        Self {
            source: Source::SpecialFolder(identifier),
            extra_folder: None,
            default_dir: None,
        }
    }

    pub const fn with_extra_folder(mut self, extra_folder: &'static str) -> Self {
        self.extra_folder = Some(extra_folder);
        self
    }

    pub const fn with_default_dir(mut self, default_dir: &'static str) -> Self {
        self.default_dir = Some(default_dir);
        self
    }

    pub const fn is_special_folder(&self) -> bool {
        matches!(self.source, Source::SpecialFolder(_))
    }
}

/// Rules of one [`DirectoryType`], per platform. An empty list means unsupported.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub dir: DirectoryType,
    pub windows: &'static [Rule],
    pub linux: &'static [Rule],
    pub macos: &'static [Rule],
}

impl RuleSet {
    pub const fn rules(&self, platform: Platform) -> &'static [Rule] {
        match platform {
            Platform::Windows => self.windows,
            Platform::Linux => self.linux,
            Platform::Macos => self.macos,
        }
    }
}

const fn env(key: &'static str) -> Rule {
    Rule::env(key)
}

const fn home(extra_folder: &'static str) -> Rule {
    Rule::env("HOME").with_extra_folder(extra_folder)
}

const fn special(identifier: &'static str) -> Rule {
    Rule::special_folder(identifier)
}

/// Indexed by `DirectoryType as usize`.
pub const TABLE: [RuleSet; DirectoryType::COUNT] = [
    RuleSet {
        dir: DirectoryType::Home,
        windows: &[env("USERPROFILE"), special("UserProfile")],
        linux: &[env("HOME")],
        macos: &[env("HOME")],
    },
    RuleSet {
        dir: DirectoryType::Cache,
        windows: &[env("LOCALAPPDATA"), special("LocalApplicationData")],
        linux: &[env("XDG_CACHE_HOME"), home("/.cache")],
        macos: &[home("/Library/Caches")],
    },
    RuleSet {
        dir: DirectoryType::Config,
        windows: &[env("APPDATA"), special("LocalApplicationData")],
        linux: &[env("XDG_CONFIG_HOME"), home("/.config")],
        macos: &[home("/Library/Preferences")],
    },
    RuleSet {
        dir: DirectoryType::Data,
        windows: &[env("APPDATA"), special("ApplicationData")],
        linux: &[env("XDG_DATA_HOME"), home("/.local/share")],
        macos: &[home("/Library/Application Support")],
    },
    RuleSet {
        dir: DirectoryType::DataLocal,
        windows: &[env("LOCALAPPDATA"), special("LocalApplicationData")],
        linux: &[env("XDG_DATA_HOME"), home("/.local/share")],
        macos: &[home("/Library/Application Support")],
    },
    RuleSet {
        dir: DirectoryType::Download,
        windows: &[special("UserProfile").with_extra_folder("\\Downloads")],
        linux: &[env("XDG_DOWNLOAD_DIR")],
        macos: &[home("/Downloads")],
    },
    RuleSet {
        dir: DirectoryType::Tmp,
        windows: &[env("TMP")],
        linux: &[env("TMPDIR").with_default_dir("/tmp")],
        macos: &[env("TMPDIR")],
    },
    RuleSet {
        dir: DirectoryType::Executable,
        windows: &[],
        linux: &[
            env("XDG_BIN_HOME"),
            env("XDG_DATA_HOME").with_extra_folder("/../bin"),
            home("/.local/bin"),
        ],
        macos: &[],
    },
    RuleSet {
        dir: DirectoryType::Audio,
        windows: &[special("MyMusic")],
        linux: &[env("XDG_MUSIC_DIR")],
        macos: &[home("/Music")],
    },
    RuleSet {
        dir: DirectoryType::Desktop,
        windows: &[special("DesktopDirectory")],
        linux: &[env("XDG_DESKTOP_DIR")],
        macos: &[home("/Desktop")],
    },
    RuleSet {
        dir: DirectoryType::Document,
        windows: &[special("MyDocuments")],
        linux: &[env("XDG_DOCUMENTS_DIR")],
        macos: &[home("/Documents")],
    },
    RuleSet {
        dir: DirectoryType::Font,
        windows: &[special("Fonts")],
        linux: &[
            env("XDG_DATA_HOME").with_extra_folder("/fonts"),
            home("/.local/share/fonts"),
        ],
        macos: &[home("/Library/Fonts")],
    },
    RuleSet {
        dir: DirectoryType::Picture,
        windows: &[special("MyPictures")],
        linux: &[env("XDG_PICTURES_DIR")],
        macos: &[home("/Pictures")],
    },
    RuleSet {
        dir: DirectoryType::Public,
        windows: &[],
        linux: &[env("XDG_PUBLICSHARE_DIR")],
        macos: &[home("/Public")],
    },
    RuleSet {
        dir: DirectoryType::Template,
        windows: &[special("Templates")],
        linux: &[env("XDG_TEMPLATES_DIR")],
        macos: &[],
    },
    RuleSet {
        dir: DirectoryType::Video,
        windows: &[special("MyVideos")],
        linux: &[env("XDG_VIDEOS_DIR")],
        macos: &[home("/Movies")],
    },
];

const fn env_only(rules: &[Rule]) -> bool {
    let mut i = 0;
    while i < rules.len() {
        if rules[i].is_special_folder() {
            return false;
        }
        i += 1;
    }
    true
}

const fn table_is_well_formed() -> bool {
    let mut i = 0;
    while i < TABLE.len() {
        let set = &TABLE[i];
        if set.dir as usize != i {
            return false;
        }
        if !env_only(set.linux) || !env_only(set.macos) {
            return false;
        }
        if set.windows.is_empty() && set.linux.is_empty() && set.macos.is_empty() {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    table_is_well_formed(),
    "rule table out of order, empty, or with special folders outside windows"
);

/// Rules for `dir` on `platform`, or [`None`] if unsupported.
pub fn lookup(dir: DirectoryType, platform: Platform) -> Option<&'static [Rule]> {
    let rules = TABLE[dir as usize].rules(platform);
    (!rules.is_empty()).then_some(rules)
}
