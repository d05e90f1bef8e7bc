//! TMDB catalog search: title + language form, paginated results and the
//! add-to-library form. Submitting the form always starts over at page 1;
//! the pagination keys move one page at a time from the current response.

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
use crate::models::{AddFilmRequest, CardDisplay, CatalogResult, SearchPage};
use crate::tui::events::AppEvent;
use crate::tui::widgets::{centered_rect, InputBuffer};

/// TMDB language codes offered by the search form.
pub const LANG_OPTIONS: [(&str, &str); 4] = [
    ("fr", "Français"),
    ("en", "Anglais"),
    ("es", "Espagnol"),
    ("de", "Allemand"),
];

pub const SUPPORT_OPTIONS: [&str; 5] = ["DVD", "Blu-ray", "4K UHD", "Numérique", "VHS"];

const MAX_RATE: f32 = 10.0;
const RATE_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Loading,
    Results,
    Empty,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    Title,
    Language,
    Results,
}

pub struct SearchState {
    pub phase: SearchPhase,
    pub page: Option<SearchPage>,
    pub selected: usize,
    pub title: InputBuffer,
    pub language_idx: usize,
    pub focus: SearchFocus,
    pub add_form: Option<AddForm>,
    /// The (title, language) pair behind the current result set, reused by
    /// the pagination keys.
    last_query: Option<(String, String)>,
    /// Fences stale search responses.
    seq: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            phase: SearchPhase::Idle,
            page: None,
            selected: 0,
            title: InputBuffer::new(),
            language_idx: 0,
            focus: SearchFocus::Title,
            add_form: None,
            last_query: None,
            seq: 0,
        }
    }

    /// Submit the form. Always restarts at page 1, whatever page the
    /// previous result set was on.
    pub fn submit(&mut self, api: &Arc<dyn CatalogApi>, tx: &UnboundedSender<AppEvent>) {
        if self.title.is_blank() {
            return;
        }
        let title = self.title.trimmed().to_string();
        let language = LANG_OPTIONS[self.language_idx].0.to_string();
        self.last_query = Some((title.clone(), language.clone()));
        self.run_query(api, tx, title, language, 1);
    }

    pub fn go_next(&mut self, api: &Arc<dyn CatalogApi>, tx: &UnboundedSender<AppEvent>) {
        let Some(page) = &self.page else { return };
        if !page.can_go_next() {
            return;
        }
        let next = page.page + 1;
        self.go_to_page(api, tx, next);
    }

    pub fn go_prev(&mut self, api: &Arc<dyn CatalogApi>, tx: &UnboundedSender<AppEvent>) {
        let Some(page) = &self.page else { return };
        if !page.can_go_prev() {
            return;
        }
        let prev = page.page - 1;
        self.go_to_page(api, tx, prev);
    }

    fn go_to_page(&mut self, api: &Arc<dyn CatalogApi>, tx: &UnboundedSender<AppEvent>, page: i32) {
        let Some((title, language)) = self.last_query.clone() else {
            return;
        };
        self.run_query(api, tx, title, language, page);
    }

    fn run_query(
        &mut self,
        api: &Arc<dyn CatalogApi>,
        tx: &UnboundedSender<AppEvent>,
        title: String,
        language: String,
        page: i32,
    ) {
        self.phase = SearchPhase::Loading;
        self.seq += 1;
        let seq = self.seq;
        debug!(seq, %title, %language, page, "Searching catalog");

        let api = Arc::clone(api);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = api.search_catalog(&title, &language, page).await;
            let _ = tx.send(AppEvent::CatalogSearched { seq, result });
        });
    }

    /// A search response landed. Returns false when stale.
    pub fn on_results(&mut self, seq: u64, page: SearchPage) -> bool {
        if seq != self.seq {
            debug!(seq, current = self.seq, "Discarding stale search response");
            return false;
        }
        self.phase = if page.results.is_empty() {
            SearchPhase::Empty
        } else {
            SearchPhase::Results
        };
        // New page: selection (and so the viewport) returns to the top.
        self.selected = 0;
        self.focus = SearchFocus::Results;
        self.page = Some(page);
        true
    }

    /// A search failed. Returns false when stale.
    pub fn on_failed(&mut self, seq: u64) -> bool {
        if seq != self.seq {
            return false;
        }
        self.phase = SearchPhase::Errored;
        true
    }

    pub fn close_add_form(&mut self) {
        self.add_form = None;
    }

    fn results(&self) -> &[CatalogResult] {
        self.page.as_ref().map(|p| p.results.as_slice()).unwrap_or(&[])
    }

    pub fn handle_input(
        &mut self,
        event: &Event,
        api: &Arc<dyn CatalogApi>,
        tx: &UnboundedSender<AppEvent>,
    ) -> bool {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        if self.add_form.is_some() {
            self.handle_add_form_key(*code, api, tx);
            return true;
        }

        match self.focus {
            SearchFocus::Title => match code {
                KeyCode::Enter => self.submit(api, tx),
                KeyCode::Tab | KeyCode::Down => self.focus = SearchFocus::Language,
                other => {
                    self.title.handle_key(*other);
                }
            },
            SearchFocus::Language => match code {
                KeyCode::Enter => self.submit(api, tx),
                KeyCode::Left => {
                    self.language_idx =
                        (self.language_idx + LANG_OPTIONS.len() - 1) % LANG_OPTIONS.len();
                }
                KeyCode::Right => {
                    self.language_idx = (self.language_idx + 1) % LANG_OPTIONS.len();
                }
                KeyCode::Tab | KeyCode::Down => {
                    self.focus = if self.results().is_empty() {
                        SearchFocus::Title
                    } else {
                        SearchFocus::Results
                    };
                }
                KeyCode::BackTab | KeyCode::Up => self.focus = SearchFocus::Title,
                _ => {}
            },
            SearchFocus::Results => match code {
                KeyCode::Char('j') | KeyCode::Down => {
                    if self.selected + 1 < self.results().len() {
                        self.selected += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.selected = self.selected.saturating_sub(1);
                }
                KeyCode::Char('n') => self.go_next(api, tx),
                KeyCode::Char('p') => self.go_prev(api, tx),
                KeyCode::Enter => {
                    if let Some(result) = self.results().get(self.selected) {
                        self.add_form = Some(AddForm::new(result.clone()));
                    }
                }
                KeyCode::Char('/') | KeyCode::Char('i') | KeyCode::Tab => {
                    self.focus = SearchFocus::Title;
                }
                _ => {}
            },
        }
        true
    }

    fn handle_add_form_key(
        &mut self,
        code: KeyCode,
        api: &Arc<dyn CatalogApi>,
        tx: &UnboundedSender<AppEvent>,
    ) {
        let Some(form) = &mut self.add_form else { return };
        if form.submitting {
            return;
        }
        match code {
            KeyCode::Esc => self.add_form = None,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter if form.focus == AddField::Submit => {
                form.submitting = true;
                let request = form.request();
                let api = Arc::clone(api);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = api.add_film(&request).await;
                    let _ = tx.send(AppEvent::FilmAdded(result));
                });
            }
            KeyCode::Enter => form.next_field(),
            KeyCode::Left if form.focus != AddField::Opinion => form.cycle(-1),
            KeyCode::Right if form.focus != AddField::Opinion => form.cycle(1),
            other if form.focus == AddField::Opinion => {
                form.opinion.handle_key(other);
            }
            _ => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).split(area);
        self.render_form(frame, chunks[0]);
        self.render_results(frame, chunks[1]);

        if let Some(form) = &self.add_form {
            form.render(frame);
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let chunks =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(18)]).split(area);

        let title_style = if self.focus == SearchFocus::Title {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut text = self.title.text().to_string();
        if self.focus == SearchFocus::Title {
            text.push('▏');
        }
        frame.render_widget(
            Paragraph::new(text).block(
                Block::default()
                    .title(" Titre ")
                    .borders(Borders::ALL)
                    .border_style(title_style),
            ),
            chunks[0],
        );

        let lang_style = if self.focus == SearchFocus::Language {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(format!("◂ {} ▸", LANG_OPTIONS[self.language_idx].1)).block(
                Block::default()
                    .title(" Langue ")
                    .borders(Borders::ALL)
                    .border_style(lang_style),
            ),
            chunks[1],
        );
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let mut title = " Résultats ".to_string();
        if let Some(page) = self.page.as_ref().filter(|p| p.has_pagination()) {
            title = format!(" Résultats — page {}/{} ", page.page, page.total_pages);
        }
        let border = if self.focus == SearchFocus::Results {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.phase {
            SearchPhase::Idle => {
                frame.render_widget(
                    Paragraph::new("Recherchez un film sur TMDB pour l'ajouter.")
                        .style(Style::default().fg(Color::DarkGray))
                        .alignment(Alignment::Center),
                    inner,
                );
            }
            SearchPhase::Loading => {
                frame.render_widget(
                    Paragraph::new("Recherche...")
                        .style(Style::default().fg(Color::DarkGray))
                        .alignment(Alignment::Center),
                    inner,
                );
            }
            SearchPhase::Empty => {
                frame.render_widget(
                    Paragraph::new("Aucun résultat trouvé").alignment(Alignment::Center),
                    inner,
                );
            }
            SearchPhase::Results | SearchPhase::Errored => {
                let items: Vec<ListItem> = self.results().iter().map(result_card).collect();
                let mut state = ListState::default();
                state.select(Some(self.selected));
                let list = List::new(items)
                    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
                frame.render_stateful_widget(list, inner, &mut state);
            }
        }
    }
}

fn result_card(result: &CatalogResult) -> ListItem<'_> {
    let mut spans = vec![
        Span::styled(
            result.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", result.year_label()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(rating) = result.rating_label() {
        spans.push(Span::styled(
            format!("  {rating}"),
            Style::default().fg(Color::Yellow),
        ));
    }
    ListItem::new(Line::from(spans))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Language,
    Support,
    Rate,
    Opinion,
    Submit,
}

/// The add-to-library form, opened on a catalog result.
pub struct AddForm {
    pub film: CatalogResult,
    pub language_idx: usize,
    pub support_idx: usize,
    pub rate: f32,
    pub opinion: InputBuffer,
    pub focus: AddField,
    pub submitting: bool,
}

impl AddForm {
    pub fn new(film: CatalogResult) -> Self {
        Self {
            film,
            language_idx: 0,
            support_idx: 0,
            rate: 0.0,
            opinion: InputBuffer::new(),
            focus: AddField::Language,
            submitting: false,
        }
    }

    pub fn request(&self) -> AddFilmRequest {
        AddFilmRequest {
            tmdb_id: self.film.id,
            lang: LANG_OPTIONS[self.language_idx].0.to_string(),
            support: SUPPORT_OPTIONS[self.support_idx].to_string(),
            rate: self.rate,
            opinion: self.opinion.trimmed().to_string(),
        }
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            AddField::Language => AddField::Support,
            AddField::Support => AddField::Rate,
            AddField::Rate => AddField::Opinion,
            AddField::Opinion => AddField::Submit,
            AddField::Submit => AddField::Language,
        };
    }

    fn prev_field(&mut self) {
        self.focus = match self.focus {
            AddField::Language => AddField::Submit,
            AddField::Support => AddField::Language,
            AddField::Rate => AddField::Support,
            AddField::Opinion => AddField::Rate,
            AddField::Submit => AddField::Opinion,
        };
    }

    /// Left/Right on an option field cycles its value; on the rate field it
    /// steps by half a point within 0..=10.
    fn cycle(&mut self, direction: i32) {
        match self.focus {
            AddField::Language => {
                let len = LANG_OPTIONS.len();
                self.language_idx = (self.language_idx + len)
                    .wrapping_add_signed(direction as isize)
                    % len;
            }
            AddField::Support => {
                let len = SUPPORT_OPTIONS.len();
                self.support_idx = (self.support_idx + len)
                    .wrapping_add_signed(direction as isize)
                    % len;
            }
            AddField::Rate => {
                self.rate = (self.rate + direction as f32 * RATE_STEP).clamp(0.0, MAX_RATE);
            }
            AddField::Opinion | AddField::Submit => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);

        let field = |label: &str, value: String, focused: bool| {
            let style = if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(
                    format!("{label} : "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(value, style),
            ])
        };

        let mut opinion = self.opinion.text().to_string();
        if self.focus == AddField::Opinion {
            opinion.push('▏');
        }

        let submit_label = if self.submitting {
            "[ Ajout... ]"
        } else {
            "[ Ajouter à ma vidéothèque ]"
        };
        let submit_style = if self.focus == AddField::Submit {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Green)
        };

        let lines = vec![
            Line::raw(""),
            field(
                "Langue",
                format!("◂ {} ▸", LANG_OPTIONS[self.language_idx].1),
                self.focus == AddField::Language,
            ),
            field(
                "Support",
                format!("◂ {} ▸", SUPPORT_OPTIONS[self.support_idx]),
                self.focus == AddField::Support,
            ),
            field(
                "Note",
                format!("◂ {:.1}/10 ▸", self.rate),
                self.focus == AddField::Rate,
            ),
            field("Avis", opinion, false),
            Line::raw(""),
            Line::from(Span::styled(submit_label, submit_style)),
            Line::raw(""),
            Line::from(Span::styled(
                "Tab : champ suivant — Échap : annuler",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let block = Block::default()
            .title(format!(" Ajouter « {} » ", self.film.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }
}
