use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, InputField};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Viewer,
    FilterInput,
    ConfirmClear,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::DismissError);
        bindings.insert(KeyContext::Global, global);

        // Viewer bindings - less-like navigation
        let mut viewer = HashMap::new();
        viewer.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        viewer.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        viewer.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        viewer.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        viewer.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        viewer.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        viewer.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        viewer.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        viewer.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        viewer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        viewer.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        viewer.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        // Filters
        viewer.insert(
            KeyBinding::new(KeyCode::Char('/')),
            Action::EditField(InputField::Domain),
        );
        viewer.insert(
            KeyBinding::new(KeyCode::Char('c')),
            Action::EditField(InputField::Client),
        );
        viewer.insert(KeyBinding::new(KeyCode::Char('t')), Action::NextQueryType);
        viewer.insert(KeyBinding::shift(KeyCode::Char('T')), Action::PrevQueryType);
        viewer.insert(KeyBinding::new(KeyCode::Char('+')), Action::MoreEntries);
        viewer.insert(KeyBinding::shift(KeyCode::Char('+')), Action::MoreEntries);
        viewer.insert(KeyBinding::new(KeyCode::Char('=')), Action::MoreEntries);
        viewer.insert(KeyBinding::new(KeyCode::Char('-')), Action::FewerEntries);
        viewer.insert(KeyBinding::new(KeyCode::Char('n')), Action::ResetFilters);
        // Log
        viewer.insert(KeyBinding::new(KeyCode::Char('r')), Action::Refresh);
        viewer.insert(KeyBinding::new(KeyCode::F(5)), Action::Refresh);
        viewer.insert(KeyBinding::shift(KeyCode::Char('D')), Action::RequestClear);
        bindings.insert(KeyContext::Viewer, viewer);

        // Filter input bindings (when a text filter is being edited)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::ApplyInput);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::CancelInput);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::InputBackspace);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::InputClear);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CancelInput);
        bindings.insert(KeyContext::FilterInput, filter_input);

        // Clear confirmation bindings
        let mut confirm = HashMap::new();
        confirm.insert(KeyBinding::new(KeyCode::Char('y')), Action::ConfirmClear);
        confirm.insert(KeyBinding::shift(KeyCode::Char('Y')), Action::ConfirmClear);
        confirm.insert(KeyBinding::new(KeyCode::Char('n')), Action::CancelClear);
        confirm.insert(KeyBinding::shift(KeyCode::Char('N')), Action::CancelClear);
        confirm.insert(KeyBinding::new(KeyCode::Esc), Action::CancelClear);
        confirm.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CancelClear);
        bindings.insert(KeyContext::ConfirmClear, confirm);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(context_bindings) = self.bindings.get(&context) {
            if let Some(action) = context_bindings.get(&binding) {
                return Some(action.clone());
            }
        }

        // The confirmation dialog swallows everything else
        if context == KeyContext::ConfirmClear {
            return None;
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in filter input mode
    /// Returns Some(Action) for special keys, None for unbound control keys
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(filter_bindings) = self.bindings.get(&KeyContext::FilterInput) {
            if let Some(action) = filter_bindings.get(&binding) {
                return Some(action.clone());
            }
        }

        // For regular characters, return InputChar action
        if let KeyCode::Char(c) = key.code {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                return Some(Action::InputChar(c));
            }
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
