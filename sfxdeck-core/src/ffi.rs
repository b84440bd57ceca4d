//! C FFI layer for embedding hosts.
//!
//! Exposes the tab-wide guest list store as `extern "C"` functions that
//! exchange JSON strings. Lists use the same layout as the stored blob:
//! `{id, name, sounds: [{id, name, category_name, file_path, url,
//! sound_variant_id, variant_url, variant_label}]}`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Deserialize;
use serde::Serialize;

use crate::catalog::{Sound, Variant};
use crate::identity::{SoundId, VariantId};
use crate::lists::{tab_lists, ListEntry, ListUpdate};

/// Partial update accepted by `sfxdeck_guest_list_update`.
#[derive(Debug, Deserialize)]
struct UpdateBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sounds: Option<Vec<ListEntry>>,
}

unsafe fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

fn to_json_ptr<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => cstr.into_raw(),
            Err(_) => ptr::null_mut(),
        },
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Guest lists
// ============================================================================

/// Returns every guest list as a JSON array. Free the returned string with
/// `sfxdeck_free_string`.
#[no_mangle]
pub extern "C" fn sfxdeck_guest_lists_all() -> *mut c_char {
    to_json_ptr(&tab_lists().all())
}

/// Returns one guest list as JSON, or null when it does not exist.
///
/// # Safety
/// - `id` must be a valid null-terminated UTF-8 string
/// - The returned string must be freed with `sfxdeck_free_string`
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_guest_list_get(id: *const c_char) -> *mut c_char {
    let Some(id) = read_str(id) else {
        return ptr::null_mut();
    };
    match tab_lists().get_by_id(id) {
        Some(list) => to_json_ptr(&list),
        None => ptr::null_mut(),
    }
}

/// Creates a guest list and returns it as JSON. Null for an empty name.
///
/// # Safety
/// - `name` must be a valid null-terminated UTF-8 string
/// - The returned string must be freed with `sfxdeck_free_string`
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_guest_list_create(name: *const c_char) -> *mut c_char {
    let Some(name) = read_str(name) else {
        return ptr::null_mut();
    };
    match tab_lists().create_list(name) {
        Ok(list) => to_json_ptr(&list),
        Err(e) => {
            tracing::debug!("Guest list create rejected: {}", e);
            ptr::null_mut()
        }
    }
}

/// Applies `{name?, sounds?}` to a guest list and returns the result as JSON.
/// Null when the list does not exist or the update is malformed.
///
/// # Safety
/// - `id` and `update_json` must be valid null-terminated UTF-8 strings
/// - The returned string must be freed with `sfxdeck_free_string`
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_guest_list_update(
    id: *const c_char,
    update_json: *const c_char,
) -> *mut c_char {
    let (Some(id), Some(update_json)) = (read_str(id), read_str(update_json)) else {
        return ptr::null_mut();
    };
    let body: UpdateBody = match serde_json::from_str(update_json) {
        Ok(body) => body,
        Err(_) => return ptr::null_mut(),
    };
    let update = ListUpdate {
        name: body.name,
        sounds: body.sounds,
    };
    match tab_lists().update(id, update) {
        Ok(Some(list)) => to_json_ptr(&list),
        _ => ptr::null_mut(),
    }
}

/// Adds a catalog sound (and optionally one of its variants) to a guest list.
/// Returns false when the list does not exist or the JSON is malformed.
/// Adding an entry that is already present returns true.
///
/// # Safety
/// - `id` and `sound_json` must be valid null-terminated UTF-8 strings
/// - `variant_json` must be a valid null-terminated UTF-8 string or null
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_guest_list_add_item(
    id: *const c_char,
    sound_json: *const c_char,
    variant_json: *const c_char,
) -> bool {
    let (Some(id), Some(sound_json)) = (read_str(id), read_str(sound_json)) else {
        return false;
    };
    let Ok(sound) = serde_json::from_str::<Sound>(sound_json) else {
        return false;
    };
    let variant = match read_str(variant_json) {
        Some(json) => match serde_json::from_str::<Variant>(json) {
            Ok(variant) => Some(variant),
            Err(_) => return false,
        },
        None => None,
    };
    tab_lists().add_sound(id, &sound, variant.as_ref()).is_ok()
}

/// Removes the entry `(sound_id, variant_id)` from a guest list. Pass
/// `has_variant = false` to target the sound's base entry.
///
/// # Safety
/// - `id` must be a valid null-terminated UTF-8 string
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_guest_list_remove_item(
    id: *const c_char,
    sound_id: u64,
    has_variant: bool,
    variant_id: u64,
) -> bool {
    let Some(id) = read_str(id) else {
        return false;
    };
    let variant = has_variant.then_some(VariantId(variant_id));
    tab_lists().remove_sound(id, SoundId(sound_id), variant).is_ok()
}

/// Deletes a guest list. Unknown ids are ignored.
///
/// # Safety
/// - `id` must be a valid null-terminated UTF-8 string
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_guest_list_delete(id: *const c_char) -> bool {
    match read_str(id) {
        Some(id) => tab_lists().delete_list(id).is_ok(),
        None => false,
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Frees a string returned by an FFI function.
///
/// # Safety
/// - `s` must be a valid pointer returned by an sfxdeck FFI function, or null
#[no_mangle]
pub unsafe extern "C" fn sfxdeck_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Returns the library version as a string. Free it with
/// `sfxdeck_free_string`.
#[no_mangle]
pub extern "C" fn sfxdeck_version() -> *mut c_char {
    let version = env!("CARGO_PKG_VERSION");
    match CString::new(version) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::SessionList;

    unsafe fn take_json(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        let value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
        sfxdeck_free_string(ptr);
        value
    }

    #[test]
    fn test_guest_list_lifecycle() {
        let name = CString::new("Tavern").unwrap();
        let sound = CString::new(r#"{"id": 5, "name": "Sword Clash", "file_path": "combat/clash.mp3"}"#).unwrap();
        let variant = CString::new(r#"{"id": 9, "url": "/static/audio/combat/clash_loud.mp3", "label": "Loud"}"#).unwrap();

        unsafe {
            let created = take_json(sfxdeck_guest_list_create(name.as_ptr()));
            let list: SessionList = serde_json::from_value(created).unwrap();
            let id = CString::new(list.id.as_str()).unwrap();

            assert!(sfxdeck_guest_list_add_item(id.as_ptr(), sound.as_ptr(), variant.as_ptr()));
            assert!(sfxdeck_guest_list_add_item(id.as_ptr(), sound.as_ptr(), variant.as_ptr()));
            assert!(sfxdeck_guest_list_add_item(id.as_ptr(), sound.as_ptr(), ptr::null()));

            let fetched = take_json(sfxdeck_guest_list_get(id.as_ptr()));
            assert_eq!(fetched["sounds"].as_array().unwrap().len(), 2);
            assert_eq!(fetched["sounds"][0]["sound_variant_id"], 9);
            assert_eq!(fetched["sounds"][0]["variant_label"], "Loud");

            assert!(sfxdeck_guest_list_remove_item(id.as_ptr(), 5, true, 9));
            let fetched = take_json(sfxdeck_guest_list_get(id.as_ptr()));
            assert_eq!(fetched["sounds"].as_array().unwrap().len(), 1);
            assert!(fetched["sounds"][0]["sound_variant_id"].is_null());

            let rename = CString::new(r#"{"name": "Inn"}"#).unwrap();
            let renamed = take_json(sfxdeck_guest_list_update(id.as_ptr(), rename.as_ptr()));
            assert_eq!(renamed["name"], "Inn");

            assert!(sfxdeck_guest_list_delete(id.as_ptr()));
            assert!(sfxdeck_guest_list_get(id.as_ptr()).is_null());
            assert!(sfxdeck_guest_list_delete(id.as_ptr()));
        }
    }

    #[test]
    fn test_invalid_input_returns_null_or_false() {
        let empty = CString::new("   ").unwrap();
        let missing = CString::new("guest-0").unwrap();
        let garbage = CString::new("{").unwrap();

        unsafe {
            assert!(sfxdeck_guest_list_create(empty.as_ptr()).is_null());
            assert!(sfxdeck_guest_list_create(ptr::null()).is_null());
            assert!(sfxdeck_guest_list_get(missing.as_ptr()).is_null());
            assert!(sfxdeck_guest_list_update(missing.as_ptr(), garbage.as_ptr()).is_null());
            assert!(!sfxdeck_guest_list_add_item(missing.as_ptr(), garbage.as_ptr(), ptr::null()));
            assert!(!sfxdeck_guest_list_remove_item(missing.as_ptr(), 1, false, 0));
        }
    }

    #[test]
    fn test_lists_all_is_json_array() {
        unsafe {
            let all = take_json(sfxdeck_guest_lists_all());
            assert!(all.is_array());
        }
    }

    #[test]
    fn test_free_null_string() {
        unsafe {
            // Should not crash
            sfxdeck_free_string(ptr::null_mut());
        }
    }

    #[test]
    fn test_version() {
        unsafe {
            let version = sfxdeck_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());

            sfxdeck_free_string(version);
        }
    }
}
