//! Destinations and the screen model behind the demo hierarchy.

use nav_nexus::destination;

/// Every place the demo can show.
#[destination]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    /// The tab bar itself.
    Main,
    Home,
    Library,
    Settings,
    Album(u32),
    Track(u32, u32),
}

impl Place {
    pub fn label(&self) -> String {
        match self {
            Place::Main => "Main".into(),
            Place::Home => "Home".into(),
            Place::Library => "Library".into(),
            Place::Settings => "Settings".into(),
            Place::Album(album) => format!("Album {album}"),
            Place::Track(album, track) => format!("Track {album}.{track}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Library,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Home, Tab::Library, Tab::Settings];

    pub fn place(&self) -> Place {
        match self {
            Tab::Home => Place::Home,
            Tab::Library => Place::Library,
            Tab::Settings => Place::Settings,
        }
    }

    pub fn for_place(place: Place) -> Option<Tab> {
        match place {
            Place::Home => Some(Tab::Home),
            Place::Library => Some(Tab::Library),
            Place::Settings => Some(Tab::Settings),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Library => 1,
            Tab::Settings => 2,
        }
    }
}

/// (album id, title, track count)
pub const ALBUMS: &[(u32, &str, u32)] = &[
    (1, "Signals", 6),
    (2, "Low Tide", 4),
    (3, "Field Notes", 9),
];

pub fn album_tracks(album: u32) -> Option<u32> {
    ALBUMS
        .iter()
        .find(|(id, _, _)| *id == album)
        .map(|(_, _, tracks)| *tracks)
}

/// A screen pushed on a tab's stack. It cannot host navigation until its
/// transition has finished.
#[derive(Debug, Clone, Copy)]
pub struct StackEntry {
    pub place: Place,
    pub visible: bool,
}

const LOG_LINES: usize = 14;

#[derive(Debug, Clone)]
pub struct AppModel {
    pub selected: Tab,
    /// Whether the selected tab's root screen has finished appearing.
    pub tab_visible: bool,
    stacks: [Vec<StackEntry>; 3],
    pub log: Vec<String>,
}

impl Default for AppModel {
    fn default() -> Self {
        Self {
            selected: Tab::Home,
            tab_visible: true,
            stacks: Default::default(),
            log: Vec::new(),
        }
    }
}

impl AppModel {
    pub fn stack(&self, tab: Tab) -> &[StackEntry] {
        &self.stacks[tab.index()]
    }

    pub fn stack_mut(&mut self, tab: Tab) -> &mut Vec<StackEntry> {
        &mut self.stacks[tab.index()]
    }

    /// The frontmost place of the selected tab.
    pub fn top(&self) -> Place {
        self.stack(self.selected)
            .last()
            .map(|entry| entry.place)
            .unwrap_or(self.selected.place())
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
        if self.log.len() > LOG_LINES {
            self.log.remove(0);
        }
    }
}
