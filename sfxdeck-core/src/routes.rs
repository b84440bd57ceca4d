//! Page paths for lists, the pinned browse view and sign-in redirects.

use std::sync::OnceLock;

use regex::Regex;

use crate::lists::{ListId, GUEST_ID_PREFIX};

/// The session list index page.
pub const SESSION_INDEX: &str = "/session";

/// The catalog browse page.
pub const BROWSE: &str = "/browse";

/// Query parameter pinning a list on the browse page.
pub const ADD_TO_LIST_PARAM: &str = "addToList";

/// Page of one list: `/session/<id>` or `/session/guest/<suffix>`.
pub fn list_page(id: &ListId) -> String {
    match id {
        ListId::Remote(raw) => format!("{}/{}", SESSION_INDEX, urlencoding::encode(raw)),
        ListId::Ephemeral(raw) => {
            let suffix = raw.strip_prefix(GUEST_ID_PREFIX).unwrap_or(raw);
            format!("{}/guest/{}", SESSION_INDEX, urlencoding::encode(suffix))
        }
    }
}

/// Browse page with `id` pinned as the add destination.
pub fn browse_with_list(id: &ListId) -> String {
    format!("{}?{}={}", BROWSE, ADD_TO_LIST_PARAM, urlencoding::encode(id.as_str()))
}

/// Sign-in page that returns to `return_path` afterwards.
pub fn sign_in_redirect(return_path: &str) -> String {
    format!("/login?next={}", urlencoding::encode(return_path))
}

/// Sign-in redirect that comes back to `page_path` with the list still pinned.
pub fn sign_in_redirect_pinned(page_path: &str, id: &ListId) -> String {
    sign_in_redirect(&format!("{}?{}={}", page_path, ADD_TO_LIST_PARAM, id))
}

/// Reads the pinned list from a query string (with or without the leading `?`).
pub fn pinned_list(query: &str) -> Option<ListId> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == ADD_TO_LIST_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(|value| ListId::parse(&value))
}

/// Matches `/session/<id>` and `/session/guest/<suffix>`, compiled once.
fn list_route() -> Option<&'static Regex> {
    static LIST_ROUTE: OnceLock<Option<Regex>> = OnceLock::new();
    LIST_ROUTE
        .get_or_init(|| Regex::new(r"^/session/(guest/)?([^/?#]+)/?$").ok())
        .as_ref()
}

impl ListId {
    /// Parses a list page path back into its id.
    pub fn from_route(path: &str) -> Option<ListId> {
        let caps = list_route()?.captures(path)?;
        let segment = urlencoding::decode(caps.get(2)?.as_str()).ok()?;
        if caps.get(1).is_some() {
            Some(ListId::Ephemeral(format!("{}{}", GUEST_ID_PREFIX, segment)))
        } else {
            Some(ListId::parse(&segment))
        }
    }
}
