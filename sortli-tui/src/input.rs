use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Field, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.classify`(...) on the image path or highlighted category
    Classify,
    /// Run `service.log_disposal`(...) for the reviewed classification
    LogDisposal,
    /// Run `service.nearby_centers`(...) around the configured location
    LoadCenters,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, BackTab, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut; plain 'q' is reserved for typing paths
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Capture => match key.code {
            Up => {
                if app.category_index > 0 {
                    app.category_index -= 1;
                }
            }
            Down => {
                if app.category_index + 1 < app.categories.len() {
                    app.category_index += 1;
                }
            }
            Tab | BackTab => {
                app.focus = match app.focus {
                    Field::ImagePath => Field::Weight,
                    Field::Weight => Field::ImagePath,
                };
            }
            Left | Right => app.toggle_disposal(),
            Char(character) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.focused_input().push(character);
                }
            }
            Backspace => {
                app.focused_input().pop();
            }
            Enter => {
                action = Action::Classify;
            }
            Esc => {
                action = Action::Quit;
            }
            _ => {}
        },

        Screen::Review => match key.code {
            Up => app.step_override(false),
            Down => app.step_override(true),
            Enter => {
                action = Action::LogDisposal;
            }
            Left | Esc | Char('b') => {
                app.clear_review();
                app.screen = Screen::Capture;
            }
            _ => {}
        },

        Screen::Progress => match key.code {
            Char('c') => {
                action = Action::LoadCenters;
            }
            Left | Esc | Char('b') => {
                app.screen = Screen::Capture;
            }
            Char('q') => {
                action = Action::Quit;
            }
            _ => {}
        },

        Screen::Centers => match key.code {
            Left | Esc | Char('b') => {
                app.screen = Screen::Progress;
            }
            Char('q') => {
                action = Action::Quit;
            }
            _ => {}
        },
    }
    action
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sortli_core::{
        Backends, Catalog, Classification, ClassificationResult, Profile, ServiceOptions,
        SortliService, WasteCategory,
    };

    use super::*;

    fn reviewing(classification: Classification) -> App {
        let service = SortliService::new(
            Arc::new(Catalog::standard()),
            Backends::offline(),
            ServiceOptions::default(),
        );
        let mut app = App::new(Arc::new(service), Profile::new("kim"), None, 5.0);
        app.classification = Some(classification);
        app.screen = Screen::Review;
        app
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    fn inconclusive() -> Classification {
        Classification::Inconclusive {
            result: ClassificationResult::new(WasteCategory::NonRecyclable, 0.5),
            best_score: 0.0,
        }
    }

    #[test]
    fn review_arrows_correct_an_uncertain_category() {
        let mut app = reviewing(inconclusive());

        // Non-recyclable is last in the list, so down wraps to the first category
        press(&mut app, KeyCode::Down);
        let result = app.reviewed_result().expect("reviewed result");
        assert_eq!(result.category, WasteCategory::Plastic);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Up);
        assert_eq!(
            app.reviewed_result().map(|result| result.category),
            Some(WasteCategory::Plastic)
        );

        assert!(matches!(press(&mut app, KeyCode::Enter), Action::LogDisposal));
        assert!(app.classification.is_some());
    }

    #[test]
    fn untouched_review_keeps_the_classified_result() {
        let app = reviewing(Classification::Annotated(ClassificationResult::new(
            WasteCategory::Glass,
            0.8,
        )));
        let result = app.reviewed_result().expect("reviewed result");
        assert_eq!(result.category, WasteCategory::Glass);
        assert!((result.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn leaving_review_drops_the_correction() {
        let mut app = reviewing(inconclusive());
        press(&mut app, KeyCode::Up);
        assert!(app.category_override.is_some());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Capture);
        assert!(app.classification.is_none());
        assert!(app.category_override.is_none());
        assert!(app.reviewed_result().is_none());
    }
}
