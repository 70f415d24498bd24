//! The demo's screen hierarchy.
//!
//! Screens are thin views over the shared [`AppModel`], rebuilt on every walk:
//! `Shell` (pass-through) → `TabBar` → tab root → pushed screens.
//! A newly shown screen only becomes usable once its simulated transition
//! has finished, at which point an [`AppEvent::Appeared`] is sent so the app
//! can resume any route waiting for it.

use crate::model::{album_tracks, AppModel, Place, StackEntry, Tab};
use crate::state::Entity;
use log::{debug, warn};
use nav_nexus::{Destination, DestinationRef, Navigatable, NavigationController, Scheduler, Screen};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Lifecycle notifications from screens to the app loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    WillAppear(Place),
    Appeared(Place),
    Disappeared(Place),
}

/// Where a presented screen sits: a tab root or an index in its tab's stack.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Root(Tab),
    Pushed(Tab, usize),
}

/// State every screen view needs.
pub struct Shared {
    pub model: Entity<AppModel>,
    scheduler: Arc<dyn Scheduler>,
    transition: Duration,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl Shared {
    pub fn new(
        model: Entity<AppModel>,
        scheduler: Arc<dyn Scheduler>,
        transition: Duration,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            model,
            scheduler,
            transition,
            events,
        }
    }

    fn send(&self, event: AppEvent) {
        if self.events.send(event).is_err() {
            debug!("App loop gone, dropping {:?}", event);
        }
    }

    /// Start the transition of the screen at `slot`; it turns visible when
    /// the transition ends, unless it was dismissed in the meantime.
    fn present(self: &Arc<Self>, place: Place, slot: Slot) {
        self.send(AppEvent::WillAppear(place));
        let shared = Arc::clone(self);
        // Never cancelled: a dismissed screen simply fails the check below.
        let _ = self.scheduler.post_after(
            self.transition,
            Box::new(move || {
                let shown = shared
                    .model
                    .update(|m| match slot {
                        Slot::Root(tab) if m.selected == tab => {
                            m.tab_visible = true;
                            true
                        }
                        Slot::Pushed(tab, index) => match m.stack_mut(tab).get_mut(index) {
                            Some(entry) if entry.place == place => {
                                entry.visible = true;
                                true
                            }
                            _ => false,
                        },
                        _ => false,
                    })
                    .unwrap_or(false);
                if shown {
                    shared.send(AppEvent::Appeared(place));
                }
            }),
        );
    }

    /// Pop `tab`'s stack down to `len` entries.
    fn pop_to(&self, tab: Tab, len: usize) -> Vec<Place> {
        let popped = self
            .model
            .update(|m| {
                let stack = m.stack_mut(tab);
                let cut = len.min(stack.len());
                stack.drain(cut..).map(|e| e.place).collect::<Vec<_>>()
            })
            .unwrap_or_default();
        for place in popped.iter().rev() {
            self.send(AppEvent::Disappeared(*place));
        }
        popped
    }

    /// Replace everything above `len` in `tab`'s stack with `place`.
    fn push(self: &Arc<Self>, tab: Tab, len: usize, place: Place) {
        self.pop_to(tab, len);
        let index = self.model.update(|m| {
            let stack = m.stack_mut(tab);
            stack.push(StackEntry {
                place,
                visible: false,
            });
            stack.len() - 1
        });
        match index {
            Ok(index) => self.present(place, Slot::Pushed(tab, index)),
            Err(e) => warn!("Failed to push {:?}: {}", place, e),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&AppModel) -> R) -> Option<R> {
        self.model.read(f).ok()
    }
}

fn as_place(to: &dyn Destination) -> Option<Place> {
    to.as_any().downcast_ref::<Place>().copied()
}

/// The window. Does not take part in matching.
pub struct Shell(pub Arc<Shared>);

impl Screen for Shell {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        None
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        Some(Arc::new(TabBar(Arc::clone(&self.0))))
    }
}

/// Switches tabs. Selecting the current tab again pops it to its root.
struct TabBar(Arc<Shared>);

impl Screen for TabBar {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        Some(Arc::new(TabBar(Arc::clone(&self.0))))
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        let tab = self.0.read(|m| m.selected)?;
        Some(Arc::new(TabRoot {
            shared: Arc::clone(&self.0),
            tab,
        }))
    }
}

impl Navigatable for TabBar {
    fn origin(&self) -> DestinationRef {
        Arc::new(Place::Main)
    }

    fn as_controller(&self) -> Option<&dyn NavigationController> {
        Some(self)
    }
}

impl NavigationController for TabBar {
    fn navigate(&self, to: &dyn Destination, _animated: bool) -> bool {
        let Some(tab) = as_place(to).and_then(Tab::for_place) else {
            return false;
        };
        let Some(selected) = self.0.read(|m| m.selected) else {
            return false;
        };
        if selected == tab {
            self.0.pop_to(tab, 0);
            return true;
        }
        let switched = self.0.model.update(|m| {
            m.selected = tab;
            m.tab_visible = false;
        });
        if switched.is_err() {
            return false;
        }
        self.0.present(tab.place(), Slot::Root(tab));
        true
    }
}

/// Root screen of a tab. The library root opens albums.
struct TabRoot {
    shared: Arc<Shared>,
    tab: Tab,
}

impl Screen for TabRoot {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        Some(Arc::new(TabRoot {
            shared: Arc::clone(&self.shared),
            tab: self.tab,
        }))
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        Pushed::at(&self.shared, self.tab, 0)
    }
}

impl Navigatable for TabRoot {
    fn origin(&self) -> DestinationRef {
        Arc::new(self.tab.place())
    }

    fn as_controller(&self) -> Option<&dyn NavigationController> {
        match self.tab {
            Tab::Library => Some(self),
            _ => None,
        }
    }
}

impl NavigationController for TabRoot {
    fn navigate(&self, to: &dyn Destination, _animated: bool) -> bool {
        let Some(Place::Album(album)) = as_place(to) else {
            return false;
        };
        let ready = self
            .shared
            .read(|m| m.selected == self.tab && m.tab_visible)
            .unwrap_or(false);
        if !ready || album_tracks(album).is_none() {
            return false;
        }
        self.shared.push(self.tab, 0, Place::Album(album));
        true
    }
}

/// A screen pushed on a tab's stack. Albums open their tracks.
struct Pushed {
    shared: Arc<Shared>,
    tab: Tab,
    index: usize,
    entry: StackEntry,
}

impl Pushed {
    fn at(shared: &Arc<Shared>, tab: Tab, index: usize) -> Option<Arc<dyn Screen>> {
        let entry = shared.read(|m| m.stack(tab).get(index).copied())??;
        Some(Arc::new(Pushed {
            shared: Arc::clone(shared),
            tab,
            index,
            entry,
        }))
    }
}

impl Screen for Pushed {
    fn navigatable(&self) -> Option<Arc<dyn Navigatable>> {
        Some(Arc::new(Pushed {
            shared: Arc::clone(&self.shared),
            tab: self.tab,
            index: self.index,
            entry: self.entry,
        }))
    }

    fn frontmost_child(&self) -> Option<Arc<dyn Screen>> {
        Pushed::at(&self.shared, self.tab, self.index + 1)
    }
}

impl Navigatable for Pushed {
    fn origin(&self) -> DestinationRef {
        Arc::new(self.entry.place)
    }

    fn as_controller(&self) -> Option<&dyn NavigationController> {
        match self.entry.place {
            Place::Album(_) => Some(self),
            _ => None,
        }
    }
}

impl NavigationController for Pushed {
    fn navigate(&self, to: &dyn Destination, _animated: bool) -> bool {
        let (Place::Album(album), Some(Place::Track(track_album, track))) =
            (self.entry.place, as_place(to))
        else {
            return false;
        };
        let in_range = album_tracks(album).is_some_and(|tracks| (1..=tracks).contains(&track));
        if track_album != album || !in_range {
            return false;
        }
        // The snapshot may be stale; check the live entry.
        let visible = self
            .shared
            .read(|m| {
                m.stack(self.tab)
                    .get(self.index)
                    .is_some_and(|e| e.place == self.entry.place && e.visible)
            })
            .unwrap_or(false);
        if !visible {
            return false;
        }
        self.shared
            .push(self.tab, self.index + 1, Place::Track(album, track));
        true
    }
}
