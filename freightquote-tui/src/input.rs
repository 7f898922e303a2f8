use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Price the request in the form with every carrier
    Quote,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global quit shortcut
    if key.code == Char('c') && control {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::RequestForm => {
            let field = app.selected_field();
            match key.code {
                Char('n') if control => {
                    if let Err(message) = app.form.add_item() {
                        app.error_message = Some(message);
                    } else {
                        app.error_message = None;
                    }
                }
                Char('x') if control => {
                    app.form.items.clear();
                }
                Up | BackTab => app.previous_field(),
                Down | Tab => app.next_field(),
                Left | Right | Char(' ') if field.is_toggle() => app.form.toggle(field),
                Char(character) => {
                    if !control && !key.modifiers.contains(KeyModifiers::ALT) {
                        if let Some(text) = app.form.text_mut(field) {
                            text.push(character);
                        }
                    }
                }
                Backspace => {
                    if let Some(text) = app.form.text_mut(field) {
                        text.pop();
                    }
                }
                Enter => {
                    action = Action::Quote;
                }
                Esc => {
                    if app.results.is_empty() {
                        app.error_message = None;
                    } else {
                        app.screen = Screen::QuoteList;
                    }
                }
                _ => {}
            }
        }

        Screen::QuoteList => match key.code {
            Char('q') if key.modifiers.is_empty() => action = Action::Quit,
            Up | Char('k') => {
                if app.result_index > 0 {
                    app.result_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.result_index + 1 < app.results.len() {
                    app.result_index += 1;
                }
            }
            Enter | Right | Tab => {
                if app.selected_result().is_some() {
                    app.screen = Screen::QuoteDetail;
                }
            }
            Left | Esc | Char('b') => {
                app.screen = Screen::RequestForm;
            }
            _ => {}
        },

        Screen::QuoteDetail => match key.code {
            Char('q') if key.modifiers.is_empty() => action = Action::Quit,
            Up | Char('k') => {
                if app.result_index > 0 {
                    app.result_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.result_index + 1 < app.results.len() {
                    app.result_index += 1;
                }
            }
            Left | Esc | Char('b') => {
                app.screen = Screen::QuoteList;
            }
            _ => {}
        },
    }
    action
}
