//! Browse page: catalog grid, pinned-list sidebar, variant popover and the
//! add-to-list flow wired to one playback coordinator.

use std::sync::Arc;

use crate::add_flow::{AddOutcome, AddToListFlow};
use crate::catalog::{CatalogClient, Sound, SoundQuery, Variant};
use crate::config::OverlayConfig;
use crate::error::{Error, Result};
use crate::identity::{has_choice, SoundId};
use crate::lists::{ListEntry, ListId, ListStore, SessionList};
use crate::playback::{AudioBackend, Binding, PlaybackCoordinator, SurfaceId, SurfaceKind};
use crate::routes::{list_page, BROWSE};
use crate::variant_popover::{
    ClickTarget, ListenerHost, Rect, RowAction, VariantChoice, VariantPopover, Viewport,
};

/// Sidebar title when the pinned list could not be loaded.
const FALLBACK_SIDEBAR_TITLE: &str = "List";

/// Pinned list shown next to the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Sidebar {
    pub title: String,
    /// Link back to the list's own page.
    pub back_path: String,
    pub rows: Vec<(SurfaceId, ListEntry)>,
}

/// One browse page view.
pub struct BrowsePage<B: AudioBackend, H: ListenerHost> {
    store: Arc<ListStore>,
    coordinator: PlaybackCoordinator<B>,
    popover: VariantPopover<H>,
    flow: AddToListFlow,
    viewport: Viewport,
    cards: Vec<(SurfaceId, Sound)>,
    sidebar: Option<Sidebar>,
    can_add: bool,
}

impl<B: AudioBackend, H: ListenerHost> BrowsePage<B, H> {
    pub fn new(
        store: Arc<ListStore>,
        coordinator: PlaybackCoordinator<B>,
        host: H,
        geometry: OverlayConfig,
        pinned: Option<ListId>,
    ) -> Self {
        let flow = AddToListFlow::new(Arc::clone(&store), pinned, BROWSE);
        Self {
            store,
            coordinator,
            viewport: geometry.initial_viewport(),
            popover: VariantPopover::new(host, geometry),
            flow,
            cards: Vec::new(),
            sidebar: None,
            can_add: false,
        }
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator<B> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut PlaybackCoordinator<B> {
        &mut self.coordinator
    }

    pub fn popover(&self) -> &VariantPopover<H> {
        &self.popover
    }

    pub fn flow(&self) -> &AddToListFlow {
        &self.flow
    }

    pub fn cards(&self) -> &[(SurfaceId, Sound)] {
        &self.cards
    }

    pub fn sidebar(&self) -> Option<&Sidebar> {
        self.sidebar.as_ref()
    }

    /// Whether cards and popover rows show an add button.
    pub fn can_add(&self) -> bool {
        self.can_add
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Loads the sounds matching `query` and the pinned sidebar.
    pub async fn load(&mut self, catalog: &CatalogClient, query: &SoundQuery) -> Result<()> {
        let sounds = catalog.sounds(query).await?;
        self.show_sounds(sounds).await;
        self.load_sidebar().await;
        Ok(())
    }

    /// Re-renders the grid with `sounds`.
    pub async fn show_sounds(&mut self, sounds: Vec<Sound>) {
        self.can_add = self.flow.can_add().await;
        self.coordinator.unmount_kind(SurfaceKind::GridCard);
        self.cards = sounds
            .into_iter()
            .map(|sound| {
                let id = self.coordinator.mount(SurfaceKind::GridCard, Binding::Sound(sound.id));
                (id, sound)
            })
            .collect();
    }

    /// Clicking a grid card: the popover for multi-variant sounds, else play.
    pub fn activate_card(&mut self, sound_id: SoundId, trigger: Rect) {
        let Some(sound) = self.card_sound(sound_id).cloned() else {
            return;
        };
        if has_choice(&sound) {
            self.popover.open(&sound, trigger, self.viewport, self.can_add);
        } else {
            self.coordinator.play(&sound, None);
        }
    }

    /// The card's play/pause button: toggles whatever recording of the sound is live.
    pub fn toggle_card(&mut self, sound_id: SoundId) {
        if let Some(key) = self.coordinator.state().active_key.filter(|k| k.sound == sound_id) {
            self.coordinator.toggle(&key);
        }
    }

    /// Clicking a sidebar row: play the stored variant, else the popover for
    /// multi-variant sounds, else the base audio.
    pub fn activate_row(&mut self, index: usize, trigger: Rect) {
        let Some(entry) = self.row_entry(index).cloned() else {
            return;
        };
        let sound = entry.to_sound();
        if !entry.pins_variant() && has_choice(&sound) {
            self.popover.open(&sound, trigger, self.viewport, self.can_add);
        } else {
            self.coordinator.play_entry(&entry);
        }
    }

    pub fn toggle_row(&mut self, index: usize) {
        if let Some(key) = self.row_entry(index).map(ListEntry::key) {
            self.coordinator.toggle(&key);
        }
    }

    /// A popover row was clicked.
    pub async fn choose(&mut self, index: usize, action: RowAction) -> Option<AddOutcome> {
        match self.popover.select(index, action)? {
            VariantChoice::Play { sound, variant } => {
                self.coordinator.play(&sound, Some(&variant));
                None
            }
            VariantChoice::Add { sound, variant } => Some(self.add(&sound, Some(&variant)).await),
        }
    }

    /// The add button of a card (or a popover row).
    pub async fn add(&mut self, sound: &Sound, variant: Option<&Variant>) -> AddOutcome {
        let outcome = self.flow.start(sound, variant).await;
        self.after_add(&outcome).await;
        outcome
    }

    /// Confirms the add chooser.
    pub async fn confirm_add(&mut self, selection: Option<&ListId>) -> AddOutcome {
        let outcome = self.flow.confirm(selection).await;
        self.after_add(&outcome).await;
        outcome
    }

    pub fn cancel_add(&mut self) {
        self.flow.cancel();
    }

    pub fn on_click(&mut self, target: ClickTarget) {
        self.popover.on_click(target);
    }

    pub fn on_scroll(&mut self) {
        self.popover.on_scroll();
    }

    /// Navigating away: playback stops and transient UI closes.
    pub fn leave(&mut self) {
        self.coordinator.stop();
        self.popover.close();
        self.flow.cancel();
    }

    /// Loads the pinned list into the sidebar. Load failures leave an empty
    /// sidebar with a generic title.
    pub async fn load_sidebar(&mut self) {
        let Some(pinned) = self.flow.pinned().cloned() else {
            return;
        };
        match self.store.get(&pinned).await {
            Ok(list) => self.render_sidebar(&list),
            Err(e) => {
                tracing::warn!("Could not load pinned list {}: {}", pinned, e);
                self.render_empty_sidebar(&pinned);
            }
        }
    }

    async fn after_add(&mut self, outcome: &AddOutcome) {
        let AddOutcome::Added(list) = outcome else {
            return;
        };
        if self.flow.pinned() == Some(&list.id) {
            self.render_sidebar(list);
        }
        if !self.can_add {
            self.can_add = self.flow.can_add().await;
        }
    }

    fn render_sidebar(&mut self, list: &SessionList) {
        self.coordinator.unmount_kind(SurfaceKind::SidebarRow);
        let rows = list
            .sounds
            .iter()
            .map(|entry| {
                let id = self.coordinator.mount(SurfaceKind::SidebarRow, Binding::Key(entry.key()));
                (id, entry.clone())
            })
            .collect();
        self.sidebar = Some(Sidebar {
            title: list.name.clone(),
            back_path: list_page(&list.id),
            rows,
        });
    }

    fn render_empty_sidebar(&mut self, pinned: &ListId) {
        self.coordinator.unmount_kind(SurfaceKind::SidebarRow);
        self.sidebar = Some(Sidebar {
            title: FALLBACK_SIDEBAR_TITLE.to_string(),
            back_path: list_page(pinned),
            rows: Vec::new(),
        });
    }

    fn card_sound(&self, id: SoundId) -> Option<&Sound> {
        self.cards.iter().map(|(_, s)| s).find(|s| s.id == id)
    }

    fn row_entry(&self, index: usize) -> Option<&ListEntry> {
        self.sidebar.as_ref()?.rows.get(index).map(|(_, e)| e)
    }
}

/// Resolves the pinned list of a page, failing with `NotFound` when it no
/// longer exists in its backend.
pub async fn resolve_pinned(store: &ListStore, pinned: &ListId) -> Result<SessionList> {
    match store.get(pinned).await {
        Err(Error::NotFound(_)) if pinned.is_ephemeral() => Err(Error::NotFound(
            "List not found. Guest lists are kept only for this tab.".to_string(),
        )),
        other => other,
    }
}
