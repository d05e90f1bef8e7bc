//! Owned-library view: load, free-text filter, detail inspection and
//! delete-with-confirmation. Re-enters `Loading` on every load, search or
//! post-delete reload.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::gateway::CatalogApi;
use crate::models::{CardDisplay, OwnedFilm};
use crate::tui::events::AppEvent;
use crate::tui::widgets::{centered_rect, InputBuffer};

const MAX_ACTORS_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryPhase {
    Idle,
    Loading,
    Populated,
    Empty,
    Errored,
}

/// What the view asks the app shell to do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum LibraryOutcome {
    Consumed,
    NotConsumed,
    /// Open the destructive confirmation for this owned film id.
    ConfirmDelete(i32),
}

pub struct LibraryState {
    pub phase: LibraryPhase,
    pub films: Vec<OwnedFilm>,
    pub selected: usize,
    pub search: InputBuffer,
    pub editing_search: bool,
    /// Detail modal content. Re-opening replaces it.
    pub detail: Option<OwnedFilm>,
    /// Fences stale listing responses: only the latest issued load may land.
    seq: u64,
}

impl LibraryState {
    pub fn new() -> Self {
        Self {
            phase: LibraryPhase::Idle,
            films: Vec::new(),
            selected: 0,
            search: InputBuffer::new(),
            editing_search: false,
            detail: None,
            seq: 0,
        }
    }

    /// Issue a listing load. An empty or whitespace-only query is the
    /// unfiltered listing, so `load(None)` and `load(Some(""))` are
    /// equivalent.
    pub fn load(
        &mut self,
        api: &Arc<dyn CatalogApi>,
        tx: &UnboundedSender<AppEvent>,
        query: Option<String>,
    ) {
        let query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        self.phase = LibraryPhase::Loading;
        self.seq += 1;
        let seq = self.seq;
        debug!(seq, ?query, "Loading library");

        let api = Arc::clone(api);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = match &query {
                Some(q) => api.search_library(q).await,
                None => api.list_films().await,
            };
            let _ = tx.send(AppEvent::LibraryLoaded { seq, result });
        });
    }

    /// Re-run the listing with whatever is in the search box.
    pub fn submit_search(&mut self, api: &Arc<dyn CatalogApi>, tx: &UnboundedSender<AppEvent>) {
        let query = self.search.trimmed().to_string();
        self.load(api, tx, Some(query));
    }

    /// A listing response landed. Returns false when it was stale and
    /// discarded.
    pub fn on_loaded(&mut self, seq: u64, films: Vec<OwnedFilm>) -> bool {
        if seq != self.seq {
            debug!(seq, current = self.seq, "Discarding stale library response");
            return false;
        }
        self.phase = if films.is_empty() {
            LibraryPhase::Empty
        } else {
            LibraryPhase::Populated
        };
        self.films = films;
        self.selected = 0;
        true
    }

    /// A listing load failed. The list contents are left untouched; only the
    /// phase changes. Returns false when the failure was stale.
    pub fn on_load_failed(&mut self, seq: u64) -> bool {
        if seq != self.seq {
            return false;
        }
        self.phase = LibraryPhase::Errored;
        true
    }

    pub fn on_detail(&mut self, film: OwnedFilm) {
        self.detail = Some(film);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn selected_film(&self) -> Option<&OwnedFilm> {
        self.films.get(self.selected)
    }

    fn open_selected_detail(&self, api: &Arc<dyn CatalogApi>, tx: &UnboundedSender<AppEvent>) {
        let Some(film) = self.selected_film() else {
            return;
        };
        let id = film.id;
        let api = Arc::clone(api);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = api.film_detail(id).await;
            let _ = tx.send(AppEvent::DetailLoaded(result));
        });
    }

    pub fn handle_input(
        &mut self,
        event: &Event,
        api: &Arc<dyn CatalogApi>,
        tx: &UnboundedSender<AppEvent>,
    ) -> LibraryOutcome {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return LibraryOutcome::NotConsumed;
        };

        // The detail modal swallows everything except its own keys.
        if let Some(film) = &self.detail {
            return match code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.close_detail();
                    LibraryOutcome::Consumed
                }
                KeyCode::Char('d') => LibraryOutcome::ConfirmDelete(film.id),
                _ => LibraryOutcome::Consumed,
            };
        }

        if self.editing_search {
            match code {
                KeyCode::Enter => {
                    self.editing_search = false;
                    self.submit_search(api, tx);
                }
                KeyCode::Esc => self.editing_search = false,
                other => {
                    self.search.handle_key(*other);
                }
            }
            return LibraryOutcome::Consumed;
        }

        match code {
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.editing_search = true;
                LibraryOutcome::Consumed
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.films.len() {
                    self.selected += 1;
                }
                LibraryOutcome::Consumed
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                LibraryOutcome::Consumed
            }
            KeyCode::Enter => {
                self.open_selected_detail(api, tx);
                LibraryOutcome::Consumed
            }
            KeyCode::Char('r') => {
                self.submit_search(api, tx);
                LibraryOutcome::Consumed
            }
            _ => LibraryOutcome::NotConsumed,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).split(area);
        self.render_search_bar(frame, chunks[0]);
        self.render_listing(frame, chunks[1]);

        if let Some(film) = &self.detail {
            render_detail_modal(frame, film);
        }
    }

    fn render_search_bar(&self, frame: &mut Frame, area: Rect) {
        let border = if self.editing_search {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(" Rechercher un film ")
            .borders(Borders::ALL)
            .border_style(border);
        let mut text = self.search.text().to_string();
        if self.editing_search {
            text.push('▏');
        }
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn render_listing(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Films ({}) ", self.films.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.phase {
            LibraryPhase::Idle | LibraryPhase::Loading => {
                frame.render_widget(
                    Paragraph::new("Chargement...")
                        .style(Style::default().fg(Color::DarkGray))
                        .alignment(Alignment::Center),
                    inner,
                );
            }
            LibraryPhase::Empty => {
                let lines = vec![
                    Line::raw(""),
                    Line::from(Span::styled(
                        "🎬 Votre vidéothèque est vide",
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::raw(""),
                    Line::raw("Ajoutez des films depuis la recherche TMDB (F2)."),
                ];
                frame.render_widget(
                    Paragraph::new(lines).alignment(Alignment::Center),
                    inner,
                );
            }
            LibraryPhase::Populated | LibraryPhase::Errored => {
                let items: Vec<ListItem> = self.films.iter().map(film_card).collect();
                let mut state = ListState::default();
                state.select(Some(self.selected));
                let list = List::new(items)
                    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
                frame.render_stateful_widget(list, inner, &mut state);
            }
        }
    }
}

fn film_card(film: &OwnedFilm) -> ListItem<'_> {
    let mut spans = vec![
        Span::styled(
            film.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", film.year_label()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(rating) = film.rating_label() {
        spans.push(Span::styled(
            format!("  {rating}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn render_detail_modal(frame: &mut Frame, film: &OwnedFilm) {
    let area = centered_rect(72, 80, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::raw(""),
        detail_row("Année", film.year_label()),
        detail_row("Langue", film.lang.clone()),
        detail_row("Support", film.support.clone()),
    ];
    if let Some(director) = &film.director {
        lines.push(detail_row("Réalisateur", director.full_name()));
    }
    if let Some(rating) = film.rating_label() {
        lines.push(detail_row("Note", rating));
    }
    if let Some(opinion) = film.opinion.as_deref().filter(|o| !o.is_empty()) {
        lines.push(detail_row("Avis", opinion.to_string()));
    }
    lines.push(detail_row("Description", film.description.clone()));
    if !film.actors.is_empty() {
        let actors = film
            .actors
            .iter()
            .take(MAX_ACTORS_SHOWN)
            .map(|a| a.full_name())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(detail_row("Acteurs", actors));
    }
    lines.push(detail_row(
        "Affiche",
        film.poster_url()
            .unwrap_or_else(|| "Affiche indisponible".to_string()),
    ));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "d : supprimer — Échap : fermer",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(format!(" {} ", film.title))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn detail_row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label} : "),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}
