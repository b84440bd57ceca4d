//! Variant chooser shown before a multi-variant sound can be played or added.
//!
//! The popover is an explicit open/closed controller. Opening always tears
//! down the previous instance's outside-click and scroll listeners before
//! attaching new ones, so at most one pair is ever live.

use crate::catalog::{Sound, Variant};
use crate::config::OverlayConfig;
use crate::identity::option_label;

/// Screen rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Visible area of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Where the popover is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    /// True when there was not enough room below the trigger.
    pub above: bool,
}

/// Positions the popover for a trigger.
///
/// Below the trigger by `gap`, or above it when fewer than
/// `min_space_below` pixels remain. The left edge is clamped to
/// `[edge_margin, viewport.width - width]`, margin winning on narrow screens.
pub fn place(trigger: &Rect, viewport: &Viewport, geometry: &OverlayConfig) -> Placement {
    let left = trigger
        .left
        .min(viewport.width - geometry.width)
        .max(geometry.edge_margin);
    let above = trigger.bottom() + geometry.min_space_below > viewport.height;
    let top = if above {
        trigger.top - geometry.gap
    } else {
        trigger.bottom() + geometry.gap
    };
    Placement { left, top, above }
}

/// Page-level listeners the popover needs while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    OutsideClick,
    Scroll,
}

/// Handle returned when a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

/// Where page listeners get registered (the document and window).
pub trait ListenerHost {
    fn attach(&mut self, kind: ListenerKind) -> ListenerToken;
    fn detach(&mut self, token: ListenerToken);
}

/// In-memory listener registry.
#[derive(Debug, Default)]
pub struct ListenerTable {
    next: u64,
    active: Vec<(ListenerToken, ListenerKind)>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attached listeners of `kind`.
    pub fn active(&self, kind: ListenerKind) -> usize {
        self.active.iter().filter(|(_, k)| *k == kind).count()
    }
}

impl ListenerHost for ListenerTable {
    fn attach(&mut self, kind: ListenerKind) -> ListenerToken {
        let token = ListenerToken(self.next);
        self.next += 1;
        self.active.push((token, kind));
        token
    }

    fn detach(&mut self, token: ListenerToken) {
        self.active.retain(|(t, _)| *t != token);
    }
}

/// One row of the popover.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOption {
    pub variant: Variant,
    /// Variant label, or `Option N`.
    pub label: String,
    /// Whether the row shows an add-to-list button.
    pub can_add: bool,
}

/// What a row click asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Play,
    Add,
}

/// Outcome of a selection, handed to the coordinator or the add flow.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantChoice {
    Play { sound: Sound, variant: Variant },
    Add { sound: Sound, variant: Variant },
}

/// Where a click landed relative to the open popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Overlay,
    Trigger,
    Elsewhere,
}

#[derive(Debug, Clone)]
struct OpenPopover {
    sound: Sound,
    trigger: Rect,
    placement: Placement,
    options: Vec<VariantOption>,
    listeners: Vec<ListenerToken>,
}

/// The variant popover controller.
pub struct VariantPopover<H: ListenerHost> {
    host: H,
    geometry: OverlayConfig,
    open: Option<OpenPopover>,
}

impl<H: ListenerHost> VariantPopover<H> {
    pub fn new(host: H, geometry: OverlayConfig) -> Self {
        Self {
            host,
            geometry,
            open: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Sound the popover is open for.
    pub fn sound(&self) -> Option<&Sound> {
        self.open.as_ref().map(|o| &o.sound)
    }

    pub fn trigger(&self) -> Option<Rect> {
        self.open.as_ref().map(|o| o.trigger)
    }

    pub fn placement(&self) -> Option<Placement> {
        self.open.as_ref().map(|o| o.placement)
    }

    pub fn options(&self) -> &[VariantOption] {
        self.open.as_ref().map_or(&[], |o| o.options.as_slice())
    }

    /// Opens the popover for `sound` next to `trigger`, replacing any open one.
    pub fn open(&mut self, sound: &Sound, trigger: Rect, viewport: Viewport, can_add: bool) {
        self.close();

        let options = sound
            .variants
            .iter()
            .enumerate()
            .map(|(i, v)| VariantOption {
                variant: v.clone(),
                label: option_label(v, i),
                can_add,
            })
            .collect();

        let listeners = vec![
            self.host.attach(ListenerKind::OutsideClick),
            self.host.attach(ListenerKind::Scroll),
        ];

        self.open = Some(OpenPopover {
            sound: sound.clone(),
            trigger,
            placement: place(&trigger, &viewport, &self.geometry),
            options,
            listeners,
        });
    }

    /// Closes the popover and detaches its listeners.
    pub fn close(&mut self) {
        if let Some(open) = self.open.take() {
            for token in open.listeners {
                self.host.detach(token);
            }
        }
    }

    /// Handles a page click. Returns true when it closed the popover.
    pub fn on_click(&mut self, target: ClickTarget) -> bool {
        if !self.is_open() || target != ClickTarget::Elsewhere {
            return false;
        }
        self.close();
        true
    }

    /// Any scroll closes the popover.
    pub fn on_scroll(&mut self) {
        self.close();
    }

    /// Handles a row click, closing the popover. `None` when the row does
    /// not exist or its add button is hidden.
    pub fn select(&mut self, index: usize, action: RowAction) -> Option<VariantChoice> {
        let open = self.open.as_ref()?;
        let option = open.options.get(index)?;
        if action == RowAction::Add && !option.can_add {
            return None;
        }

        let sound = open.sound.clone();
        let variant = option.variant.clone();
        self.close();
        Some(match action {
            RowAction::Play => VariantChoice::Play { sound, variant },
            RowAction::Add => VariantChoice::Add { sound, variant },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{SoundId, VariantId};

    fn sound(id: u64, labels: &[Option<&str>]) -> Sound {
        Sound {
            id: SoundId(id),
            name: format!("Sound {}", id),
            variants: labels
                .iter()
                .enumerate()
                .map(|(i, l)| Variant {
                    id: VariantId(i as u64 + 10),
                    file_path: Some(format!("v{}.mp3", i)),
                    url: None,
                    label: l.map(str::to_string),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 1024.0,
            height: 768.0,
        }
    }

    fn popover() -> VariantPopover<ListenerTable> {
        VariantPopover::new(ListenerTable::new(), OverlayConfig::default())
    }

    #[test]
    fn test_place_below_trigger() {
        let placement = place(&Rect::new(100.0, 50.0, 120.0, 40.0), &viewport(), &OverlayConfig::default());
        assert_eq!(placement, Placement { left: 100.0, top: 96.0, above: false });
    }

    #[test]
    fn test_place_flips_near_bottom() {
        let placement = place(&Rect::new(100.0, 600.0, 120.0, 40.0), &viewport(), &OverlayConfig::default());
        assert!(placement.above);
        assert_eq!(placement.top, 594.0);
    }

    #[test]
    fn test_place_clamps_left() {
        let geometry = OverlayConfig::default();
        let right = place(&Rect::new(900.0, 10.0, 100.0, 20.0), &viewport(), &geometry);
        assert_eq!(right.left, 1024.0 - 280.0);

        let left = place(&Rect::new(-20.0, 10.0, 100.0, 20.0), &viewport(), &geometry);
        assert_eq!(left.left, 8.0);

        let narrow = Viewport { width: 200.0, height: 768.0 };
        assert_eq!(place(&Rect::new(50.0, 10.0, 100.0, 20.0), &narrow, &geometry).left, 8.0);
    }

    #[test]
    fn test_options_fall_back_to_position_labels() {
        let mut popover = popover();
        popover.open(&sound(1, &[None, Some("Heavy")]), Rect::new(0.0, 0.0, 10.0, 10.0), viewport(), false);

        let labels: Vec<&str> = popover.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Option 1", "Heavy"]);
        assert!(popover.options().iter().all(|o| !o.can_add));
    }

    #[test]
    fn test_reopen_tears_down_previous_listeners() {
        let mut popover = popover();
        let trigger = Rect::new(0.0, 0.0, 10.0, 10.0);
        popover.open(&sound(1, &[None, None]), trigger, viewport(), true);
        popover.open(&sound(2, &[None, None]), trigger, viewport(), true);

        assert_eq!(popover.host().active(ListenerKind::OutsideClick), 1);
        assert_eq!(popover.host().active(ListenerKind::Scroll), 1);
        assert_eq!(popover.sound().map(|s| s.id), Some(SoundId(2)));
    }

    #[test]
    fn test_click_inside_keeps_open() {
        let mut popover = popover();
        popover.open(&sound(1, &[None, None]), Rect::new(0.0, 0.0, 10.0, 10.0), viewport(), true);

        assert!(!popover.on_click(ClickTarget::Overlay));
        assert!(!popover.on_click(ClickTarget::Trigger));
        assert!(popover.is_open());

        assert!(popover.on_click(ClickTarget::Elsewhere));
        assert!(!popover.is_open());
        assert_eq!(popover.host().active(ListenerKind::OutsideClick), 0);
    }

    #[test]
    fn test_scroll_closes() {
        let mut popover = popover();
        popover.open(&sound(1, &[None, None]), Rect::new(0.0, 0.0, 10.0, 10.0), viewport(), true);
        popover.on_scroll();

        assert!(!popover.is_open());
        assert_eq!(popover.host().active(ListenerKind::Scroll), 0);
    }

    #[test]
    fn test_select_play_and_add_close() {
        let mut popover = popover();
        let s = sound(1, &[None, Some("Loud")]);
        popover.open(&s, Rect::new(0.0, 0.0, 10.0, 10.0), viewport(), true);

        match popover.select(1, RowAction::Add) {
            Some(VariantChoice::Add { sound, variant }) => {
                assert_eq!(sound.id, SoundId(1));
                assert_eq!(variant.id, VariantId(11));
            }
            other => panic!("unexpected choice {:?}", other),
        }
        assert!(!popover.is_open());

        popover.open(&s, Rect::new(0.0, 0.0, 10.0, 10.0), viewport(), false);
        assert!(popover.select(0, RowAction::Add).is_none());
        assert!(popover.is_open());
        assert!(matches!(popover.select(0, RowAction::Play), Some(VariantChoice::Play { .. })));
        assert!(!popover.is_open());
    }
}
