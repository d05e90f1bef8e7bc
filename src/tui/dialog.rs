//! Reusable confirmation modal. Mounts an overlay with configurable copy and
//! resolves exactly once: confirm → `true`, cancel or Escape → `false`.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::widgets::centered_fixed;

/// Copy and styling for one confirmation. Defaults mirror the service's
/// French UI copy.
#[derive(Debug, Clone)]
pub struct ConfirmOptions {
    pub icon: &'static str,
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    /// Styles the confirm button as destructive (red).
    pub destructive: bool,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            icon: "⚠",
            title: "Confirmation".to_string(),
            message: "Êtes-vous sûr ?".to_string(),
            confirm_text: "Confirmer".to_string(),
            cancel_text: "Annuler".to_string(),
            destructive: false,
        }
    }
}

/// An open confirmation dialog. The owner keeps at most one alive at a time;
/// the decision is produced by [`ConfirmDialog::handle_key`] and the overlay
/// is dropped before the decision is acted on.
#[derive(Debug)]
pub struct ConfirmDialog {
    opts: ConfirmOptions,
    /// Which button holds focus. Cancel by default: destructive actions
    /// should not trigger on a reflexive Enter.
    focus_confirm: bool,
    resolved: bool,
}

impl ConfirmDialog {
    pub fn new(opts: ConfirmOptions) -> Self {
        Self {
            opts,
            focus_confirm: false,
            resolved: false,
        }
    }

    /// Feed a key press. `Some(decision)` is returned at most once over the
    /// dialog's lifetime; every later key is ignored.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<bool> {
        if self.resolved {
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') => Some(self.resolve(false)),
            KeyCode::Char('o') | KeyCode::Char('y') => Some(self.resolve(true)),
            KeyCode::Enter => Some(self.resolve(self.focus_confirm)),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.focus_confirm = !self.focus_confirm;
                None
            }
            _ => None,
        }
    }

    fn resolve(&mut self, decision: bool) -> bool {
        self.resolved = true;
        decision
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = centered_fixed(52, 9, frame.area());
        frame.render_widget(Clear, area);

        let confirm_style = if self.opts.destructive {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let focused = Style::default().add_modifier(Modifier::REVERSED);

        let mut cancel = Style::default();
        let mut confirm = confirm_style;
        if self.focus_confirm {
            confirm = confirm.patch(focused);
        } else {
            cancel = cancel.patch(focused);
        }

        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                format!("{} {}", self.opts.icon, self.opts.title),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::raw(self.opts.message.clone()),
            Line::raw(""),
            Line::from(vec![
                Span::styled(format!("[ {} ]", self.opts.cancel_text), cancel),
                Span::raw("   "),
                Span::styled(format!("[ {} ]", self.opts.confirm_text), confirm),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(block),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn escape_resolves_false_once() {
        let mut dialog = ConfirmDialog::new(ConfirmOptions::default());
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)), Some(false));
        // Already resolved: no second decision from any trigger.
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)), None);
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), None);
    }

    #[test]
    fn cancel_shortcut_resolves_false() {
        let mut dialog = ConfirmDialog::new(ConfirmOptions::default());
        assert_eq!(dialog.handle_key(key(KeyCode::Char('n'))), Some(false));
    }

    #[test]
    fn confirm_shortcut_resolves_true() {
        let mut dialog = ConfirmDialog::new(ConfirmOptions::default());
        assert_eq!(dialog.handle_key(key(KeyCode::Char('o'))), Some(true));
    }

    #[test]
    fn enter_follows_button_focus() {
        let mut dialog = ConfirmDialog::new(ConfirmOptions::default());
        // Cancel is focused by default.
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), Some(false));

        let mut dialog = ConfirmDialog::new(ConfirmOptions::default());
        assert_eq!(dialog.handle_key(key(KeyCode::Tab)), None);
        assert_eq!(dialog.handle_key(key(KeyCode::Enter)), Some(true));
    }

    #[test]
    fn unrelated_keys_do_not_resolve() {
        let mut dialog = ConfirmDialog::new(ConfirmOptions::default());
        assert_eq!(dialog.handle_key(key(KeyCode::Char('x'))), None);
        assert_eq!(dialog.handle_key(key(KeyCode::Up)), None);
    }
}
