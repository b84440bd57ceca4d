//! Add-to-list flow: pinned destination or a chooser of the user's lists.

use std::sync::Arc;

use crate::catalog::{Sound, Variant};
use crate::error::Error;
use crate::lists::{ListId, ListStore, ListSummary, SessionList};
use crate::routes::{sign_in_redirect, sign_in_redirect_pinned};

/// Chooser hint for a signed-in user without lists.
pub const SIGNED_IN_EMPTY_HINT: &str = "Create a list first from Session List page";

/// Chooser hint for a guest without lists.
pub const GUEST_EMPTY_HINT: &str = "Create a list first (Session lists \u{2192} Create new list)";

/// What the chooser offers.
#[derive(Debug, Clone, PartialEq)]
pub enum ChooserOptions {
    Lists(Vec<ListSummary>),
    /// No lists exist yet; show this hint instead of an empty choice.
    CreateFirst(&'static str),
}

/// Result of a flow step.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The store accepted the add; render from this list.
    Added(SessionList),
    /// The chooser is open with these options.
    Choosing(ChooserOptions),
    /// Send the user to sign in.
    SignInRequired { redirect: String },
    /// The add was rejected; show the message. A chooser stays open.
    Failed(String),
    /// The chooser closed without adding.
    Closed,
}

#[derive(Debug, Clone)]
enum FlowState {
    Idle,
    Choosing {
        sound: Sound,
        variant: Option<Variant>,
        options: ChooserOptions,
    },
}

/// Drives `idle -> choosing -> idle` for one page.
pub struct AddToListFlow {
    store: Arc<ListStore>,
    pinned: Option<ListId>,
    page_path: String,
    state: FlowState,
}

impl AddToListFlow {
    /// Creates a flow for the page at `page_path`, optionally with a pinned list.
    pub fn new(store: Arc<ListStore>, pinned: Option<ListId>, page_path: &str) -> Self {
        Self {
            store,
            pinned,
            page_path: page_path.to_string(),
            state: FlowState::Idle,
        }
    }

    pub fn pinned(&self) -> Option<&ListId> {
        self.pinned.as_ref()
    }

    pub fn is_choosing(&self) -> bool {
        matches!(self.state, FlowState::Choosing { .. })
    }

    /// Options of the open chooser.
    pub fn options(&self) -> Option<&ChooserOptions> {
        match &self.state {
            FlowState::Choosing { options, .. } => Some(options),
            FlowState::Idle => None,
        }
    }

    /// Whether add buttons are shown: a pinned list, a signed-in user, or
    /// existing guest lists.
    pub async fn can_add(&self) -> bool {
        if self.pinned.is_some() || self.store.is_signed_in() {
            return true;
        }
        self.store.list_all().await.map_or(false, |lists| !lists.is_empty())
    }

    /// Starts adding `(sound, variant?)`. Adds directly to a pinned list,
    /// otherwise opens the chooser.
    pub async fn start(&mut self, sound: &Sound, variant: Option<&Variant>) -> AddOutcome {
        if let Some(pinned) = self.pinned.clone() {
            return self.add_to(&pinned, sound, variant).await;
        }

        let options = match self.store.list_all().await {
            Ok(lists) if lists.is_empty() => ChooserOptions::CreateFirst(self.empty_hint()),
            Ok(lists) => ChooserOptions::Lists(lists),
            Err(Error::AuthRequired) => {
                return AddOutcome::SignInRequired {
                    redirect: sign_in_redirect(&self.page_path),
                }
            }
            Err(e) => return AddOutcome::Failed(e.user_message()),
        };

        self.state = FlowState::Choosing {
            sound: sound.clone(),
            variant: variant.cloned(),
            options: options.clone(),
        };
        AddOutcome::Choosing(options)
    }

    /// Confirms the chooser. With no selection the chooser closes without adding.
    pub async fn confirm(&mut self, selection: Option<&ListId>) -> AddOutcome {
        let FlowState::Choosing { sound, variant, .. } = self.state.clone() else {
            return AddOutcome::Closed;
        };
        let Some(id) = selection else {
            self.state = FlowState::Idle;
            return AddOutcome::Closed;
        };

        let outcome = self.add_to(id, &sound, variant.as_ref()).await;
        if !matches!(outcome, AddOutcome::Failed(_)) {
            self.state = FlowState::Idle;
        }
        outcome
    }

    pub fn cancel(&mut self) {
        self.state = FlowState::Idle;
    }

    async fn add_to(&self, id: &ListId, sound: &Sound, variant: Option<&Variant>) -> AddOutcome {
        match self.store.add_item(id, sound, variant).await {
            Ok(list) => {
                tracing::info!("Added {} to list {}", sound.name, list.id);
                AddOutcome::Added(list)
            }
            Err(Error::AuthRequired) => AddOutcome::SignInRequired {
                redirect: sign_in_redirect_pinned(&self.page_path, id),
            },
            Err(e) => AddOutcome::Failed(e.user_message()),
        }
    }

    fn empty_hint(&self) -> &'static str {
        if self.store.is_signed_in() {
            SIGNED_IN_EMPTY_HINT
        } else {
            GUEST_EMPTY_HINT
        }
    }
}
