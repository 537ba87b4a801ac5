use crate::app::InputField;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // UI toggles
    ToggleHelp,

    // Scrolling
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,

    // Text filter input
    EditField(InputField),
    InputChar(char),
    InputBackspace,
    InputClear,
    ApplyInput,
    CancelInput,

    // Selector filters
    NextQueryType,
    PrevQueryType,
    MoreEntries,
    FewerEntries,
    ResetFilters,

    // Log actions
    Refresh,
    RequestClear,
    ConfirmClear,
    CancelClear,

    // Error handling
    DismissError,

    // Tick (auto-refresh)
    Tick,

    // Render request
    Render,
}
