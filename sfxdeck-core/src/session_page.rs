//! Session list page: the cards of one list, their playback, and renaming,
//! removing from and deleting the list.

use std::sync::Arc;

use crate::config::OverlayConfig;
use crate::error::{Error, Result};
use crate::identity::has_choice;
use crate::lists::{ListEntry, ListId, ListStore, SessionList};
use crate::playback::{AudioBackend, Binding, PlaybackCoordinator, SurfaceId, SurfaceKind};
use crate::routes::{browse_with_list, list_page, sign_in_redirect, SESSION_INDEX};
use crate::variant_popover::{
    ClickTarget, ListenerHost, Rect, RowAction, VariantChoice, VariantPopover, Viewport,
};

const GUEST_LIST_MISSING: &str =
    "List not found or it was cleared (guest lists last until the tab is closed).";
const SERVER_LIST_MISSING: &str = "List not found or you don't have access.";

/// What the page shows in place of the list.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Loading,
    Ready,
    /// The list does not exist (any more). `back_path` leads to the index.
    Missing { message: String, back_path: String },
    SignInRequired { redirect: String },
    Failed(String),
}

/// One session list page.
pub struct SessionPage<B: AudioBackend, H: ListenerHost> {
    store: Arc<ListStore>,
    coordinator: PlaybackCoordinator<B>,
    popover: VariantPopover<H>,
    viewport: Viewport,
    id: ListId,
    list: Option<SessionList>,
    cards: Vec<(SurfaceId, ListEntry)>,
    view: SessionView,
}

impl<B: AudioBackend, H: ListenerHost> SessionPage<B, H> {
    pub fn new(
        store: Arc<ListStore>,
        coordinator: PlaybackCoordinator<B>,
        host: H,
        geometry: OverlayConfig,
        id: ListId,
    ) -> Self {
        Self {
            store,
            coordinator,
            viewport: geometry.initial_viewport(),
            popover: VariantPopover::new(host, geometry),
            id,
            list: None,
            cards: Vec::new(),
            view: SessionView::Loading,
        }
    }

    pub fn id(&self) -> &ListId {
        &self.id
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// The list name, once loaded.
    pub fn title(&self) -> Option<&str> {
        self.list.as_ref().map(|l| l.name.as_str())
    }

    pub fn cards(&self) -> &[(SurfaceId, ListEntry)] {
        &self.cards
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

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Link to the browse page with this list pinned.
    pub fn add_sounds_path(&self) -> String {
        browse_with_list(&self.id)
    }

    /// Loads the list and mounts one card per entry.
    pub async fn load(&mut self) {
        match self.store.get(&self.id).await {
            Ok(list) => self.render(list),
            Err(e) => self.render_error(e),
        }
    }

    /// Clicking a card: a stored variant plays directly, a base entry of a
    /// multi-variant sound opens the popover, anything else plays.
    pub fn activate_card(&mut self, index: usize, trigger: Rect) {
        let Some(entry) = self.entry(index).cloned() else {
            return;
        };
        let sound = entry.to_sound();
        if !entry.pins_variant() && has_choice(&sound) {
            self.popover.open(&sound, trigger, self.viewport, false);
        } else {
            self.coordinator.play_entry(&entry);
        }
    }

    /// The card's play/pause button. Only the live entry responds.
    pub fn toggle_card(&mut self, index: usize) {
        if let Some(key) = self.entry(index).map(ListEntry::key) {
            self.coordinator.toggle(&key);
        }
    }

    /// A popover row was clicked.
    pub fn choose(&mut self, index: usize) {
        if let Some(VariantChoice::Play { sound, variant }) = self.popover.select(index, RowAction::Play) {
            self.coordinator.play(&sound, Some(&variant));
        }
    }

    /// Removes the entry at `index`. Playback of that entry stops and its
    /// card unmounts.
    pub async fn remove(&mut self, index: usize) -> Result<()> {
        let Some(key) = self.entry(index).map(ListEntry::key) else {
            return Ok(());
        };
        let list = match self.store.remove_item(&self.id, key.sound, key.variant).await {
            Ok(list) => list,
            Err(Error::NotFound(message)) => {
                self.show_missing();
                return Err(Error::NotFound(message));
            }
            Err(e) => return Err(e),
        };
        if !list.contains(&key) && self.coordinator.state().active_key == Some(key) {
            self.coordinator.stop();
        }
        self.render(list);
        Ok(())
    }

    /// Renames the list. A rejected name leaves the title as it was.
    pub async fn rename(&mut self, name: &str) -> Result<()> {
        let renamed = self.store.rename(&self.id, name).await?;
        if let Some(list) = self.list.as_mut() {
            list.name = renamed.name;
        }
        Ok(())
    }

    /// Deletes the list and returns the page to navigate to.
    pub async fn delete(&mut self) -> Result<String> {
        self.store.delete(&self.id).await?;
        tracing::info!("Deleted list {} from its page", self.id);
        self.leave();
        self.clear();
        Ok(SESSION_INDEX.to_string())
    }

    pub fn on_click(&mut self, target: ClickTarget) {
        self.popover.on_click(target);
    }

    pub fn on_scroll(&mut self) {
        self.popover.on_scroll();
    }

    /// Navigating away: playback stops and the popover closes.
    pub fn leave(&mut self) {
        self.coordinator.stop();
        self.popover.close();
    }

    fn render(&mut self, list: SessionList) {
        self.coordinator.unmount_kind(SurfaceKind::ListCard);
        self.cards = list
            .sounds
            .iter()
            .map(|entry| {
                let id = self.coordinator.mount(SurfaceKind::ListCard, Binding::Key(entry.key()));
                (id, entry.clone())
            })
            .collect();
        self.list = Some(list);
        self.view = SessionView::Ready;
    }

    fn render_error(&mut self, error: Error) {
        if matches!(error, Error::NotFound(_)) {
            self.show_missing();
            return;
        }
        self.clear();
        self.view = match error {
            Error::AuthRequired => SessionView::SignInRequired {
                redirect: sign_in_redirect(&list_page(&self.id)),
            },
            other => {
                tracing::warn!("Could not load list {}: {}", self.id, other);
                SessionView::Failed(other.user_message())
            }
        };
    }

    fn show_missing(&mut self) {
        self.clear();
        let message = if self.id.is_ephemeral() {
            GUEST_LIST_MISSING
        } else {
            SERVER_LIST_MISSING
        };
        self.view = SessionView::Missing {
            message: message.to_string(),
            back_path: SESSION_INDEX.to_string(),
        };
    }

    fn clear(&mut self) {
        self.coordinator.unmount_kind(SurfaceKind::ListCard);
        self.cards.clear();
        self.list = None;
    }

    fn entry(&self, index: usize) -> Option<&ListEntry> {
        self.cards.get(index).map(|(_, e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::catalog::{Sound, Variant};
    use crate::identity::{PlaybackKey, SoundId, VariantId};
    use crate::lists::{EphemeralListBackend, ListBackend, MemoryStorage, RemoteListBackend};
    use crate::playback::testing::FakeBackend;
    use crate::playback::PlaybackStatus;
    use crate::variant_popover::ListenerTable;

    fn guest_store() -> Arc<ListStore> {
        let api = ApiClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
        let remote: Arc<dyn ListBackend> = Arc::new(RemoteListBackend::new(api));
        let ephemeral: Arc<dyn ListBackend> = Arc::new(EphemeralListBackend::new(MemoryStorage::new()));
        Arc::new(ListStore::new(remote, ephemeral, false))
    }

    fn thunder() -> Sound {
        Sound {
            id: SoundId(1),
            name: "Thunder".to_string(),
            file_path: "thunder.mp3".to_string(),
            ..Default::default()
        }
    }

    fn clash() -> Sound {
        let variant = |id: u64, label: Option<&str>| Variant {
            id: VariantId(id),
            file_path: Some(format!("v{}.mp3", id)),
            url: None,
            label: label.map(str::to_string),
        };
        Sound {
            id: SoundId(5),
            name: "Sword Clash".to_string(),
            file_path: "clash.mp3".to_string(),
            variants: vec![variant(8, None), variant(9, Some("Loud"))],
            ..Default::default()
        }
    }

    /// A guest list holding Thunder, Sword Clash (Loud) and Sword Clash.
    async fn tavern(store: &ListStore) -> ListId {
        let list = store.create("Tavern").await.unwrap();
        let clash = clash();
        store.add_item(&list.id, &thunder(), None).await.unwrap();
        store.add_item(&list.id, &clash, Some(&clash.variants[1])).await.unwrap();
        store.add_item(&list.id, &clash, None).await.unwrap();
        list.id
    }

    fn page(store: Arc<ListStore>, id: ListId) -> SessionPage<FakeBackend, ListenerTable> {
        SessionPage::new(
            store,
            PlaybackCoordinator::new(FakeBackend::new()),
            ListenerTable::new(),
            OverlayConfig::default(),
            id,
        )
    }

    fn trigger() -> Rect {
        Rect::new(10.0, 10.0, 100.0, 40.0)
    }

    #[tokio::test]
    async fn test_load_mounts_one_card_per_entry() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(Arc::clone(&store), id.clone());

        page.load().await;

        assert_eq!(page.view(), &SessionView::Ready);
        assert_eq!(page.title(), Some("Tavern"));
        assert_eq!(page.cards().len(), 3);
        assert_eq!(page.coordinator().surfaces().len(), 3);
        assert_eq!(page.add_sounds_path(), format!("/browse?addToList={}", id));
    }

    #[tokio::test]
    async fn test_list_card_goes_idle_when_grid_card_plays() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(store, id);
        page.load().await;
        let thunder_card = page.cards()[0].0;

        page.activate_card(0, trigger());
        assert_eq!(page.coordinator().surfaces().appearance(thunder_card), Some(PlaybackStatus::Playing));

        let coordinator = page.coordinator_mut();
        let grid_card = coordinator.mount(SurfaceKind::GridCard, Binding::Sound(SoundId(5)));
        coordinator.play(&clash(), None);

        let surfaces = page.coordinator().surfaces();
        assert_eq!(surfaces.appearance(thunder_card), Some(PlaybackStatus::Idle));
        assert_eq!(surfaces.appearance(grid_card), Some(PlaybackStatus::Playing));
        // The base Sword Clash card shows it; the Loud card does not.
        assert_eq!(surfaces.appearance(page.cards()[1].0), Some(PlaybackStatus::Idle));
        assert_eq!(surfaces.appearance(page.cards()[2].0), Some(PlaybackStatus::Playing));
    }

    #[tokio::test]
    async fn test_stored_variant_plays_and_base_entry_asks() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(store, id);
        page.load().await;

        page.activate_card(1, trigger());
        assert!(!page.popover().is_open());
        assert_eq!(
            page.coordinator().state().active_key,
            Some(PlaybackKey::new(SoundId(5), Some(VariantId(9))))
        );

        page.activate_card(2, trigger());
        assert!(page.popover().is_open());
        assert!(!page.popover().options()[0].can_add);
        page.choose(0);
        assert_eq!(
            page.coordinator().state().active_key,
            Some(PlaybackKey::new(SoundId(5), Some(VariantId(8))))
        );

        // Neither stored entry is the live key, so their buttons do nothing.
        page.toggle_card(1);
        page.toggle_card(2);
        assert_eq!(page.coordinator().state().status, PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn test_removing_playing_entry_stops_and_unmounts_card() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(Arc::clone(&store), id.clone());
        page.load().await;
        let loud_card = page.cards()[1].0;
        page.activate_card(1, trigger());

        page.remove(1).await.unwrap();

        assert!(page.coordinator().state().is_idle());
        assert_eq!(page.coordinator().surfaces().appearance(loud_card), None);
        assert_eq!(page.cards().len(), 2);
        assert_eq!(
            store.get(&id).await.unwrap().keys(),
            vec![PlaybackKey::base(SoundId(1)), PlaybackKey::base(SoundId(5))]
        );
    }

    #[tokio::test]
    async fn test_removing_other_entry_keeps_playback() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(store, id);
        page.load().await;
        page.activate_card(0, trigger());

        page.remove(2).await.unwrap();

        assert_eq!(page.coordinator().state().active_key, Some(PlaybackKey::base(SoundId(1))));
        assert_eq!(page.coordinator().surfaces().appearance(page.cards()[0].0), Some(PlaybackStatus::Playing));
    }

    #[tokio::test]
    async fn test_missing_guest_list_links_back_to_index() {
        let mut page = page(guest_store(), ListId::parse("guest-404"));

        page.load().await;

        match page.view() {
            SessionView::Missing { message, back_path } => {
                assert!(message.contains("cleared"));
                assert_eq!(back_path, SESSION_INDEX);
            }
            other => panic!("unexpected view {:?}", other),
        }
        assert!(page.cards().is_empty());
        assert_eq!(page.title(), None);
    }

    #[tokio::test]
    async fn test_rename_blank_keeps_title() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(store, id);
        page.load().await;

        assert!(matches!(page.rename("  ").await, Err(Error::Validation(_))));
        assert_eq!(page.title(), Some("Tavern"));

        page.rename("Inn").await.unwrap();
        assert_eq!(page.title(), Some("Inn"));
    }

    #[tokio::test]
    async fn test_delete_returns_to_index() {
        let store = guest_store();
        let id = tavern(&store).await;
        let mut page = page(Arc::clone(&store), id.clone());
        page.load().await;
        page.activate_card(0, trigger());

        assert_eq!(page.delete().await.unwrap(), SESSION_INDEX);

        assert!(page.coordinator().state().is_idle());
        assert!(page.coordinator().surfaces().is_empty());
        assert!(matches!(store.get(&id).await, Err(Error::NotFound(_))));
    }
}
