//! Session state and its action reducer
//!
//! Pure state machine: `reduce` takes the current state and a tagged
//! action, returns the next state, and performs no I/O. The caller
//! (`SessionManager`) executes the side effects implied by each
//! transition — persistence, bearer injection, alarm scheduling.
//!
//! State invariants:
//! - `authenticated == true` implies both `user` and `tokens` are set
//! - `user` and `tokens` are never cleared independently
//! - starting a new operation clears the previous error before setting
//!   `loading`

use campus_auth::{Identity, TokenPair};

/// The authoritative in-memory session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<Identity>,
    pub tokens: Option<TokenPair>,
    pub authenticated: bool,
    pub loading: bool,
    /// Exactly one current error message is retained at a time.
    pub error: Option<String>,
}

/// Tagged transitions dispatched through the single mutation entry point.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// An operation began: loading, previous error cleared.
    Start,
    /// An auth operation succeeded: identity and tokens replaced wholesale.
    Success { user: Identity, tokens: TokenPair },
    /// An auth operation failed: session torn down, message surfaced.
    Failure { message: String },
    /// A non-fatal operation failed: message surfaced, session intact.
    OperationError { message: String },
    /// A profile operation replaced the identity; tokens untouched.
    ProfileUpdated { user: Identity },
    /// Return to the unauthenticated default state.
    Reset,
    /// Drop the current error message only.
    ClearError,
}

/// Handle a state transition. Pure function: no I/O.
pub fn reduce(state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::Start => SessionState {
            loading: true,
            error: None,
            ..state
        },
        SessionAction::Success { user, tokens } => SessionState {
            user: Some(user),
            tokens: Some(tokens),
            authenticated: true,
            loading: false,
            error: None,
        },
        SessionAction::Failure { message } => SessionState {
            user: None,
            tokens: None,
            authenticated: false,
            loading: false,
            error: Some(message),
        },
        SessionAction::OperationError { message } => SessionState {
            loading: false,
            error: Some(message),
            ..state
        },
        SessionAction::ProfileUpdated { user } => SessionState {
            user: Some(user),
            loading: false,
            ..state
        },
        SessionAction::Reset => SessionState::default(),
        SessionAction::ClearError => SessionState {
            error: None,
            ..state
        },
    }
}
