//! Native special folder lookup through `SHGetKnownFolderPath`.

use std::{ptr, slice};

use async_trait::async_trait;
use tracing::debug;
use windows_sys::Win32::System::Com::CoTaskMemFree;
use windows_sys::Win32::UI::Shell::{
    FOLDERID_Desktop, FOLDERID_Documents, FOLDERID_Fonts, FOLDERID_LocalAppData, FOLDERID_Music,
    FOLDERID_Pictures, FOLDERID_Profile, FOLDERID_RoamingAppData, FOLDERID_Templates,
    FOLDERID_Videos, KF_FLAG_DEFAULT, SHGetKnownFolderPath,
};
use windows_sys::core::{GUID, PWSTR};

use crate::os::special_folder::SpecialFolderQuery;

/// Resolves special folders in-process, without spawning PowerShell.
///
/// Understands the `System.Environment.SpecialFolder` names used by the directory table.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownFolders;

fn folder_id(identifier: &str) -> Option<&'static GUID> {
    Some(match identifier {
        "UserProfile" => &FOLDERID_Profile,
        "LocalApplicationData" => &FOLDERID_LocalAppData,
        "ApplicationData" => &FOLDERID_RoamingAppData,
        "MyMusic" => &FOLDERID_Music,
        "DesktopDirectory" => &FOLDERID_Desktop,
        "MyDocuments" => &FOLDERID_Documents,
        "Fonts" => &FOLDERID_Fonts,
        "MyPictures" => &FOLDERID_Pictures,
        "Templates" => &FOLDERID_Templates,
        "MyVideos" => &FOLDERID_Videos,
        _ => return None,
    })
}

fn known_folder_path(id: &GUID) -> Option<String> {
    let mut raw: PWSTR = ptr::null_mut();
    // SAFETY: `raw` is a valid out pointer; it must be freed with `CoTaskMemFree` whether
    // the call succeeded or not.
    let hr = unsafe { SHGetKnownFolderPath(id, KF_FLAG_DEFAULT as _, ptr::null_mut(), &mut raw) };
    let path = if hr >= 0 && !raw.is_null() {
        // SAFETY: on success `raw` is a NUL terminated wide string.
        unsafe {
            let len = (0..).take_while(|&i| *raw.add(i) != 0).count();
            String::from_utf16(slice::from_raw_parts(raw, len)).ok()
        }
    } else {
        debug!(hr, "SHGetKnownFolderPath failed");
        None
    };
    // SAFETY: see above, null is accepted.
    unsafe { CoTaskMemFree(raw as *const _) };
    path
}

#[async_trait]
impl SpecialFolderQuery for KnownFolders {
    async fn query(&self, identifier: &str) -> Option<String> {
        let path = known_folder_path(folder_id(identifier)?)?;
        let path = path.trim();
        (!path.is_empty()).then(|| path.to_owned())
    }
}
