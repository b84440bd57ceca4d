//! Session lists and the two backends that store them.
//!
//! - [`RemoteListBackend`]: server-side lists for signed-in users
//! - [`EphemeralListBackend`]: guest lists that live as long as the tab
//! - [`ListStore`]: routes each operation to the backend owning the list id

mod backend;
mod ephemeral;
mod remote;
mod store;
mod types;

pub use backend::ListBackend;
pub use ephemeral::{tab_lists, EphemeralListBackend, MemoryStorage, TabStorage, GUEST_LISTS_KEY};
pub use remote::RemoteListBackend;
pub use store::ListStore;
pub use types::{
    validate_name, BackendKind, EntrySound, ListEntry, ListId, ListSummary, ListUpdate,
    SessionList, GUEST_ID_PREFIX,
};
