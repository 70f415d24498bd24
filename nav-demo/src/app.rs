//! Terminal front end: key handling, rendering and the event loop.

use crate::model::{AppModel, Place, Tab, ALBUMS};
use crate::screens::{AppEvent, Shared, Shell};
use crate::state::Entity;
use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use nav_nexus::{
    route, Destination, HierarchyPathProvider, LifecycleMonitor, PathProvider, Route, Router,
    RouterConfig, Scheduler, ScreenLifecycle, TokioScheduler,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Tabs};
use std::io::{self, stdout};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Counts screen appearances for the status line.
#[derive(Clone, Default)]
struct Visibility {
    shown: Arc<AtomicUsize>,
    dismissed: Arc<AtomicUsize>,
}

impl LifecycleMonitor for Visibility {
    fn will_appear(&self) {
        self.shown.fetch_add(1, Ordering::Relaxed);
    }

    fn did_disappear(&self) {
        self.dismissed.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    model: Entity<AppModel>,
    router: Router,
    scheduler: Arc<dyn Scheduler>,
    paths: Arc<HierarchyPathProvider>,
    lifecycle: Arc<ScreenLifecycle<Router>>,
    visibility: Visibility,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    /// Build the screen hierarchy and router. Must run inside a tokio runtime.
    pub fn new(config: RouterConfig, transition: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let model = Entity::new(AppModel::default());
        let scheduler: Arc<dyn Scheduler> = Arc::new(TokioScheduler::new());
        let shared = Arc::new(Shared::new(
            model.clone(),
            Arc::clone(&scheduler),
            transition,
            tx,
        ));
        let paths = Arc::new(HierarchyPathProvider::with_root(Arc::new(Shell(
            Arc::clone(&shared),
        ))));
        let router = Router::with_config(paths.clone(), Arc::clone(&scheduler), config);

        let visibility = Visibility::default();
        let mut lifecycle = ScreenLifecycle::new(router.clone());
        lifecycle.add_monitor(Box::new(visibility.clone()));

        Self {
            model,
            router,
            scheduler,
            paths,
            lifecycle: Arc::new(lifecycle),
            visibility,
            events,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut changes = self.model.subscribe();
        terminal.draw(|frame| self.render(frame))?;

        loop {
            tokio::select! {
                Ok(()) = changes.changed() => {}
                Some(event) = self.events.recv() => self.on_screen_event(event),
                ready = async { event::poll(Duration::from_millis(50)) } => {
                    if let Ok(true) = ready {
                        if let CrosstermEvent::Key(key) = event::read()? {
                            if key.kind == KeyEventKind::Press && self.on_key(key.code) == Flow::Quit {
                                info!("Quit requested");
                                return Ok(());
                            }
                        }
                    }
                }
            }
            // Pending destinations change without touching the model, so
            // redraw on every tick.
            terminal.draw(|frame| self.render(frame))?;
        }
    }

    fn note(&self, line: impl Into<String>) {
        note(&self.model, line);
    }

    /// Run `f` on the router's scheduler, where screens are driven.
    fn on_router<F>(&self, f: F)
    where
        F: FnOnce(&ScreenLifecycle<Router>, &Entity<AppModel>) + Send + 'static,
    {
        let lifecycle = Arc::clone(&self.lifecycle);
        let model = self.model.clone();
        self.scheduler.post(Box::new(move || f(&lifecycle, &model)));
    }

    fn on_screen_event(&self, event: AppEvent) {
        match event {
            AppEvent::WillAppear(place) => {
                self.lifecycle.will_appear();
                self.note(format!("{} appearing", place.label()));
            }
            AppEvent::Appeared(place) => {
                self.note(format!("{} appeared", place.label()));
                self.on_router(|lifecycle, _| lifecycle.did_appear());
            }
            AppEvent::Disappeared(place) => {
                self.lifecycle.did_disappear();
                self.note(format!("{} dismissed", place.label()));
            }
        }
    }

    fn on_key(&self, code: KeyCode) -> Flow {
        match code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('1') => self.open(route![
                Place::Main,
                Place::Library,
                Place::Album(1),
                Place::Track(1, 3)
            ]),
            KeyCode::Char('2') => self.open(route![
                Place::Main,
                Place::Library,
                Place::Album(3),
                Place::Track(3, 7)
            ]),
            KeyCode::Char('3') => self.open(route![Place::Main, Place::Settings]),
            KeyCode::Char('4') => self.open(route![
                Place::Main,
                Place::Library,
                Place::Album(2),
                Place::Track(2, 99)
            ]),
            KeyCode::Char('h') => self.select(Place::Home),
            KeyCode::Char('l') => self.select(Place::Library),
            KeyCode::Char('s') => self.select(Place::Settings),
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            _ => {}
        }
        Flow::Continue
    }

    fn open(&self, route: Route) {
        let names: Vec<String> = route
            .iter()
            .filter_map(|d| place_of(d.as_ref()))
            .map(|p| p.label())
            .collect();
        self.note(format!("open {}", names.join(" > ")));
        self.on_router(move |lifecycle, model| {
            if let Err(e) = lifecycle.navigate(&route, true) {
                note(model, format!("refused: {e}"));
            }
        });
    }

    fn select(&self, place: Place) {
        self.note(format!("select {}", place.label()));
        self.on_router(move |lifecycle, _| lifecycle.navigate_to(&place, true));
    }

    /// Pops on the scheduler too, so it never races a push from a route step.
    fn back(&self) {
        self.on_router(|lifecycle, model| {
            let popped = model.update(|m| {
                let tab = m.selected;
                m.stack_mut(tab).pop().map(|entry| entry.place)
            });
            match popped {
                Ok(Some(place)) => {
                    lifecycle.did_disappear();
                    note(model, format!("{} dismissed", place.label()));
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to pop: {}", e),
            }
        });
    }

    fn render(&self, frame: &mut Frame) {
        let model = match self.model.read(|m| m.clone()) {
            Ok(model) => model,
            Err(_) => return,
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|tab| Line::from(tab.place().label()))
            .collect();
        let selected = Tab::ALL.iter().position(|t| *t == model.selected).unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(panel(" nav-demo "));
        frame.render_widget(tabs, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(columns[1]);

        frame.render_widget(List::new(self.path_items()).block(panel(" Live path ")), left[0]);
        frame.render_widget(List::new(stack_items(&model)).block(panel(" Stack ")), left[1]);
        frame.render_widget(List::new(self.pending_items()).block(panel(" Pending ")), right[0]);

        let log: Vec<ListItem> = model.log.iter().map(|l| ListItem::new(l.as_str())).collect();
        frame.render_widget(List::new(log).block(panel(" Events ")), right[1]);

        let footer = Paragraph::new(Line::from(vec![
            Span::styled(" 1-4 ", Style::default().fg(Color::Yellow)),
            Span::raw("deep links  "),
            Span::styled(" h/l/s ", Style::default().fg(Color::Yellow)),
            Span::raw("tabs  "),
            Span::styled(" esc ", Style::default().fg(Color::Yellow)),
            Span::raw("back  "),
            Span::styled(" q ", Style::default().fg(Color::Yellow)),
            Span::raw(format!(
                "quit   shown {} / dismissed {}",
                self.visibility.shown.load(Ordering::Relaxed),
                self.visibility.dismissed.load(Ordering::Relaxed)
            )),
        ]))
        .block(panel(""));
        frame.render_widget(footer, rows[2]);
    }

    fn path_items(&self) -> Vec<ListItem<'static>> {
        self.paths
            .current_path()
            .iter()
            .enumerate()
            .map(|(depth, slot)| {
                let indent = "  ".repeat(depth);
                match slot {
                    None => ListItem::new(format!("{indent}(window)"))
                        .style(Style::default().fg(Color::DarkGray)),
                    Some(node) => {
                        let origin = node.origin();
                        let label = place_of(origin.as_ref())
                            .map(|p| p.label())
                            .unwrap_or_else(|| format!("{origin:?}"));
                        let marker = if node.as_controller().is_some() { " *" } else { "" };
                        ListItem::new(format!("{indent}{label}{marker}"))
                    }
                }
            })
            .collect()
    }

    fn pending_items(&self) -> Vec<ListItem<'static>> {
        let pending = self.router.pending();
        if pending.is_empty() {
            return vec![ListItem::new("idle").style(Style::default().fg(Color::DarkGray))];
        }
        pending
            .iter()
            .map(|d| {
                let label = place_of(d.as_ref()).map(|p| p.label()).unwrap_or_default();
                ListItem::new(label).style(Style::default().fg(Color::Magenta))
            })
            .collect()
    }
}

fn note(model: &Entity<AppModel>, line: impl Into<String>) {
    let line = line.into();
    if let Err(e) = model.update(|m| m.note(line)) {
        warn!("Failed to record log line: {}", e);
    }
}

fn place_of(destination: &dyn Destination) -> Option<Place> {
    destination.as_any().downcast_ref::<Place>().copied()
}

fn stack_items(model: &AppModel) -> Vec<ListItem<'static>> {
    let mut items = vec![ListItem::new(format!(
        "{}{}",
        model.selected.place().label(),
        if model.tab_visible { "" } else { " …" }
    ))];
    for entry in model.stack(model.selected) {
        let title = match entry.place {
            Place::Album(id) => ALBUMS
                .iter()
                .find(|(album, _, _)| *album == id)
                .map(|(_, title, _)| format!("{} \"{}\"", entry.place.label(), title))
                .unwrap_or_else(|| entry.place.label()),
            other => other.label(),
        };
        let pending = if entry.visible { "" } else { " …" };
        items.push(ListItem::new(format!("  {title}{pending}")));
    }
    items
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}
