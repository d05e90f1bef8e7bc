//! Application shell: owns the route, the per-view states, the confirmation
//! dialog slot and the status banner, and runs the event loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::gateway::{ApiError, CatalogApi};
use crate::models::User;
use crate::tui::dialog::{ConfirmDialog, ConfirmOptions};
use crate::tui::events::{AppEvent, Route};
use crate::tui::notify::TransientNotifier;
use crate::tui::views::library::{LibraryOutcome, LibraryState};
use crate::tui::views::login::LoginState;
use crate::tui::views::search::SearchState;

const TICK: Duration = Duration::from_millis(250);

/// Action parked behind an open confirmation dialog. Executed only when the
/// dialog resolves to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    DeleteFilm(i32),
    Logout,
}

pub struct App {
    pub running: bool,
    pub route: Route,
    pub user: Option<User>,
    pub login: LoginState,
    pub library: LibraryState,
    pub search: SearchState,
    pub dialog: Option<ConfirmDialog>,
    pending: Option<PendingAction>,
    pub notifier: TransientNotifier,
    api: Arc<dyn CatalogApi>,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            route: Route::Login,
            user: None,
            login: LoginState::new(),
            library: LibraryState::new(),
            search: SearchState::new(),
            dialog: None,
            pending: None,
            notifier: TransientNotifier::new(),
            api,
            tx,
            rx,
        }
    }

    /// Drain one completion event, for driving the state machine without a
    /// terminal.
    pub async fn recv_event(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut tick = tokio::time::interval(TICK);
        let mut input = EventStream::new();

        // Start on the library; a missing session cookie falls through to
        // the login view via the 401 path.
        self.goto(Route::Library);

        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            tokio::select! {
                _ = tick.tick() => self.notifier.prune(),
                Some(event) = self.rx.recv() => self.handle_event(event),
                Some(Ok(event)) = input.next() => self.handle_event(AppEvent::Input(event)),
            }
        }
        Ok(())
    }

    /// Navigate. Entering a page rebuilds its state from scratch and, for
    /// the authenticated pages, re-resolves the session.
    pub fn goto(&mut self, route: Route) {
        info!(?route, "Navigating");
        self.route = route;
        self.dialog = None;
        self.pending = None;
        match route {
            Route::Login => {
                self.user = None;
                self.login = LoginState::new();
            }
            Route::Library => {
                self.resolve_session();
                self.library = LibraryState::new();
                self.library.load(&self.api, &self.tx, None);
            }
            Route::Search => {
                self.resolve_session();
                self.search = SearchState::new();
            }
        }
    }

    fn resolve_session(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.current_user().await;
            let _ = tx.send(AppEvent::SessionResolved(result));
        });
    }

    fn open_dialog(&mut self, opts: ConfirmOptions, action: PendingAction) {
        // At most one dialog is live; a second trigger replaces the first
        // and its parked action.
        debug_assert!(self.dialog.is_none(), "confirmation dialog already open");
        self.dialog = Some(ConfirmDialog::new(opts));
        self.pending = Some(action);
    }

    fn confirm_delete(&mut self, id: i32) {
        self.open_dialog(
            ConfirmOptions {
                icon: "🗑",
                title: "Supprimer ce film ?".to_string(),
                message: "Êtes-vous sûr de vouloir supprimer ce film de votre vidéothèque ? \
                          Cette action est irréversible."
                    .to_string(),
                confirm_text: "Supprimer".to_string(),
                cancel_text: "Annuler".to_string(),
                destructive: true,
            },
            PendingAction::DeleteFilm(id),
        );
    }

    fn confirm_logout(&mut self) {
        self.open_dialog(
            ConfirmOptions {
                icon: "👋",
                title: "Se déconnecter ?".to_string(),
                message: "Êtes-vous sûr de vouloir vous déconnecter ?".to_string(),
                confirm_text: "Déconnexion".to_string(),
                cancel_text: "Rester connecté".to_string(),
                destructive: true,
            },
            PendingAction::Logout,
        );
    }

    fn execute(&mut self, action: PendingAction) {
        match action {
            PendingAction::DeleteFilm(id) => {
                // The detail modal closes right away; the listing refreshes
                // once the backend confirms.
                self.library.close_detail();
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.delete_film(id).await;
                    let _ = tx.send(AppEvent::FilmDeleted(result));
                });
            }
            PendingAction::Logout => {
                let api = Arc::clone(&self.api);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = api.logout().await;
                    let _ = tx.send(AppEvent::LoggedOut(result));
                });
            }
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::SessionResolved(Ok(user)) => self.user = Some(user),
            AppEvent::SessionResolved(Err(_)) => {
                if self.route != Route::Login {
                    self.goto(Route::Login);
                }
            }
            AppEvent::LibraryLoaded { seq, result } => match result {
                Ok(films) => {
                    self.library.on_loaded(seq, films);
                }
                Err(ApiError::AuthLost) => self.goto(Route::Login),
                Err(e) => {
                    if self.library.on_load_failed(seq) {
                        warn!("Library load failed: {e}");
                        self.notifier.notify("Erreur lors du chargement des films");
                    }
                }
            },
            AppEvent::DetailLoaded(Ok(film)) => self.library.on_detail(film),
            AppEvent::DetailLoaded(Err(ApiError::AuthLost)) => self.goto(Route::Login),
            AppEvent::DetailLoaded(Err(e)) => {
                warn!("Detail load failed: {e}");
                self.notifier
                    .notify("Erreur lors du chargement des détails du film");
            }
            AppEvent::FilmDeleted(Ok(())) => {
                // Unfiltered reload, matching the page refresh after delete.
                self.library.load(&self.api, &self.tx, None);
            }
            AppEvent::FilmDeleted(Err(ApiError::AuthLost)) => self.goto(Route::Login),
            AppEvent::FilmDeleted(Err(e)) => {
                warn!("Delete failed: {e}");
                self.notifier.notify("Erreur lors de la suppression du film");
            }
            AppEvent::CatalogSearched { seq, result } => match result {
                Ok(page) => {
                    self.search.on_results(seq, page);
                }
                Err(ApiError::AuthLost) => self.goto(Route::Login),
                Err(e) => {
                    if self.search.on_failed(seq) {
                        warn!("Catalog search failed: {e}");
                        self.notifier.notify("Erreur lors de la recherche");
                    }
                }
            },
            AppEvent::FilmAdded(Ok(())) => self.goto(Route::Library),
            AppEvent::FilmAdded(Err(ApiError::AuthLost)) => self.goto(Route::Login),
            AppEvent::FilmAdded(Err(e)) => {
                warn!("Add film failed: {e}");
                self.search.close_add_form();
                self.notifier.notify(
                    "Erreur lors de l'ajout du film. Il est peut-être déjà dans votre bibliothèque.",
                );
            }
            AppEvent::LoggedIn(result) => {
                self.login.on_settled();
                match result {
                    Ok(user) => {
                        info!(email = %user.email, "Logged in");
                        self.user = Some(user);
                        self.goto(Route::Library);
                    }
                    Err(e) => self.notifier.notify(login_error_message(&e)),
                }
            }
            AppEvent::Registered(result) => {
                self.login.on_settled();
                match result {
                    Ok(user) => {
                        info!(email = %user.email, "Account created");
                        self.user = Some(user);
                        self.goto(Route::Library);
                    }
                    Err(e) => self.notifier.notify(register_error_message(&e)),
                }
            }
            AppEvent::LoggedOut(Ok(())) => self.goto(Route::Login),
            AppEvent::LoggedOut(Err(e)) => {
                // The cookie may already be dead; leaving anyway would strand
                // state, so just report and stay.
                warn!("Logout failed: {e}");
                self.notifier.notify("Erreur de connexion au serveur");
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        // An open dialog takes every key first.
        if let Some(dialog) = &mut self.dialog {
            if let Event::Key(key) = event {
                if key.kind != KeyEventKind::Press {
                    return;
                }
                if let Some(decision) = dialog.handle_key(key) {
                    self.dialog = None;
                    let pending = self.pending.take();
                    if decision {
                        if let Some(action) = pending {
                            self.execute(action);
                        }
                    }
                }
            }
            return;
        }

        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            let ctrl = modifiers.contains(KeyModifiers::CONTROL);
            match code {
                KeyCode::Char('c') if ctrl => {
                    self.running = false;
                    return;
                }
                KeyCode::F(1) if self.route != Route::Login => {
                    self.goto(Route::Library);
                    return;
                }
                KeyCode::F(2) if self.route != Route::Login => {
                    self.goto(Route::Search);
                    return;
                }
                KeyCode::Char('l') if ctrl && self.route != Route::Login => {
                    self.confirm_logout();
                    return;
                }
                _ => {}
            }
        }

        match self.route {
            Route::Login => self.login.handle_input(&event, &self.api, &self.tx),
            Route::Library => {
                if let LibraryOutcome::ConfirmDelete(id) =
                    self.library.handle_input(&event, &self.api, &self.tx)
                {
                    self.confirm_delete(id);
                }
            }
            Route::Search => {
                self.search.handle_input(&event, &self.api, &self.tx);
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

        self.render_header(frame, chunks[0]);

        match self.route {
            Route::Login => self.login.render(frame, chunks[1]),
            Route::Library => self.library.render(frame, chunks[1]),
            Route::Search => self.search.render(frame, chunks[1]),
        }

        self.render_status(frame, chunks[2]);
        self.render_banner(frame, chunks[1]);

        if let Some(dialog) = &self.dialog {
            dialog.render(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                " 🎬 Cinéthèque ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("— {}", self.route.label()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(user) = &self.user {
            spans.push(Span::styled(
                format!("   {}", user.display_name()),
                Style::default().fg(Color::Green),
            ));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.route {
            Route::Login => "Tab : champ suivant — Entrée : valider — Ctrl+C : quitter",
            Route::Library => {
                "/ : filtrer — Entrée : détails — F2 : recherche — Ctrl+L : déconnexion — Ctrl+C : quitter"
            }
            Route::Search => {
                "Entrée : rechercher/ajouter — n/p : pages — F1 : vidéothèque — Ctrl+L : déconnexion"
            }
        };
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    /// Status banner overlaid on the top line of the main area.
    fn render_banner(&self, frame: &mut Frame, main: Rect) {
        let Some(message) = self.notifier.message() else {
            return;
        };
        let width = (message.chars().count() as u16 + 4).min(main.width);
        let area = Rect::new(main.x + main.width - width, main.y, width, 1);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(format!(" {message} "))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::White).bg(Color::Red)),
            area,
        );
    }
}

fn login_error_message(error: &ApiError) -> &'static str {
    match error {
        ApiError::AuthLost | ApiError::RequestFailed { status: Some(_) } => {
            "Email ou mot de passe incorrect"
        }
        _ => "Erreur de connexion au serveur",
    }
}

fn register_error_message(error: &ApiError) -> &'static str {
    match error {
        ApiError::RequestFailed { status: Some(400) } => "Cet email est déjà utilisé",
        ApiError::AuthLost | ApiError::RequestFailed { status: Some(_) } => {
            "Erreur lors de l'inscription"
        }
        _ => "Erreur de connexion au serveur",
    }
}
