use crate::value::ParamKind;

/// Errors raised while decoding or dispatching wire commands.
///
/// Per-message and per-entry failures are contained by the dispatcher:
/// they are reported through the diagnostic sink and never abort
/// `update()` or close the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum UiError {
    /// The wire text is not a JSON object
    Parse(String),
    /// A recognized-looking top-level key that is not get/set/select
    UnknownCommand(String),
    /// The named parameter is not bound
    UnknownParameter(String),
    /// The wire value does not match the bound kind's shape
    TypeMismatch { expected: ParamKind, value: String },
    /// `bind` was called twice for the same name
    DuplicateName(String),
    /// The transport refused the operation
    Transport(TransportError),
}

impl std::fmt::Display for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "malformed message: {}", msg),
            Self::UnknownCommand(cmd) => write!(f, "unrecognized command: {}", cmd),
            Self::UnknownParameter(name) => write!(f, "unknown param: {}", name),
            Self::TypeMismatch { expected, value } => {
                write!(f, "cannot decode {} as {}", value, expected)
            }
            Self::DuplicateName(name) => write!(f, "param {} is already bound", name),
            Self::Transport(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl std::error::Error for UiError {}

impl From<TransportError> for UiError {
    fn from(err: TransportError) -> Self {
        Self::Transport(err)
    }
}

/// Errors surfaced by a [`Transport`](crate::transport::Transport) impl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The peer side is gone
    Closed,
    /// `write` or `poll` was called before `listen`
    NotListening,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "connection closed"),
            Self::NotListening => write!(f, "transport is not listening"),
        }
    }
}

impl std::error::Error for TransportError {}
