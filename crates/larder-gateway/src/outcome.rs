use larder_types::events::ServerEvent;

use crate::error::SyncError;

/// Who an outbound event is for, relative to the connection that sent the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Caller(ServerEvent),
    Others(ServerEvent),
    All(ServerEvent),
    /// Status line for the announcement feed; goes to everyone.
    Announcement(String),
}

impl Delivery {
    pub fn announcement(text: impl Into<String>) -> Self {
        Self::Announcement(text.into())
    }
}

/// Result of handling one inbound command.
#[derive(Debug)]
pub enum Outcome {
    /// The command took effect; deliveries fan out in order.
    Applied(Vec<Delivery>),

    /// The command was refused; only the caller hears about it.
    Rejected(ServerEvent),

    /// Dropped without a reply (bad nickname, wrong session state).
    Ignored,

    /// The store failed; the caller gets a generic notice.
    Failed {
        operation: &'static str,
        error: SyncError,
    },
}

impl Outcome {
    pub fn into_deliveries(self) -> Vec<Delivery> {
        match self {
            Self::Applied(deliveries) => deliveries,
            Self::Rejected(event) => vec![Delivery::Caller(event)],
            Self::Ignored => Vec::new(),
            Self::Failed { operation, .. } => vec![Delivery::Caller(ServerEvent::OperationFailed {
                operation: operation.to_owned(),
            })],
        }
    }
}
