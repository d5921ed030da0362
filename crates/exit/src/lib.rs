//! Exit-mode routing (§4.6): a relay at the end of a path can be asked to forward IP traffic to
//! the wider internet on the client's behalf. Gated behind the `exit-mode` feature; routers with
//! no DNS resolver configured must refuse to construct an [`ExitContext`] at all rather than
//! silently accept traffic they can't resolve names for (Open Question (c)).

mod error;
mod messages;
mod session;

pub use error::{ExitError, Result};
pub use messages::{
    CloseExitMessage, GrantExitMessage, ObtainExitMessage, RejectExitMessage, TransferTrafficMessage,
    UpdateExitMessage,
};
pub use session::{ExitContext, ExitPolicy, ExitSession, ExitSessionStatus};
