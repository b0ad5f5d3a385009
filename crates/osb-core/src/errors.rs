/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the core can
/// handle failures consistently (user-facing usage hint vs silent drop vs
/// logged storage failure).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Caller-supplied arguments failed validation. Carries the usage hint
    /// that should be echoed back; never partially mutates state.
    #[error("malformed input: {usage}")]
    MalformedInput { usage: String },

    /// Non-operator invoking an operator-only operation. Handlers drop this
    /// silently so privileged command surfaces are not confirmed.
    #[error("unauthorized")]
    Unauthorized,

    /// Registry/ledger access failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A single notification send failed.
    #[error("delivery error: {0}")]
    Delivery(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
