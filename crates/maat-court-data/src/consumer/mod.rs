//! Inbound queue messages: decoding, routing to the pipelines, and the ack/redeliver decision.
//!
//! Every failure except a system error is final for the message. Redelivering a payload that
//! failed validation or referenced unknown data would fail the same way again.

mod pool;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::config::ProcessingConfig;
use crate::domain::messages::{
    HearingResultEvent, LinkRequest, ResultCodeEvent, StatusUpdateRequest, UnlinkRequest,
};
use crate::domain::CourtDataError;
use crate::hearing::HearingResultService;
use crate::link::LinkService;
use crate::reference::ResultCodeProcessor;
use crate::status::StatusUpdateService;
use crate::store::CourtDataStore;

pub use pool::{ConsumerPool, PoolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Link,
    Unlink,
    LaaStatus,
    HearingResulted,
    ResultCode,
}

impl QueueKind {
    pub const ALL: [QueueKind; 5] = [
        QueueKind::Link,
        QueueKind::Unlink,
        QueueKind::LaaStatus,
        QueueKind::HearingResulted,
        QueueKind::ResultCode,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            QueueKind::Link => "link",
            QueueKind::Unlink => "unlink",
            QueueKind::LaaStatus => "laa-status",
            QueueKind::HearingResulted => "hearing-resulted",
            QueueKind::ResultCode => "result-code",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown queue '{0}', expected one of link, unlink, laa-status, hearing-resulted, result-code")]
pub struct UnknownQueue(String);

impl FromStr for QueueKind {
    type Err = UnknownQueue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        QueueKind::ALL
            .into_iter()
            .find(|kind| kind.label() == normalized)
            .ok_or_else(|| UnknownQueue(value.to_string()))
    }
}

/// What the transport should do with a message once it has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    Redeliver,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Ack => f.write_str("ack"),
            Disposition::Redeliver => f.write_str("redeliver"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub kind: QueueKind,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(kind: QueueKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: QueueKind,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    CourtData(#[from] CourtDataError),
}

impl DispatchError {
    pub fn disposition(&self) -> Disposition {
        match self {
            DispatchError::CourtData(CourtDataError::System { .. }) => Disposition::Redeliver,
            _ => Disposition::Ack,
        }
    }
}

/// Routes decoded messages to the pipeline owning their queue.
pub struct MessageDispatcher<S> {
    link: Arc<LinkService<S>>,
    status: Arc<StatusUpdateService<S>>,
    hearing: HearingResultService<S>,
    result_codes: ResultCodeProcessor<S>,
}

impl<S> MessageDispatcher<S>
where
    S: CourtDataStore,
{
    pub fn new(store: Arc<S>, config: ProcessingConfig) -> Self {
        Self {
            link: Arc::new(LinkService::new(Arc::clone(&store), config.clone())),
            status: Arc::new(StatusUpdateService::new(Arc::clone(&store), config.clone())),
            hearing: HearingResultService::new(Arc::clone(&store), config),
            result_codes: ResultCodeProcessor::new(store),
        }
    }

    /// Link service shared with the HTTP surface.
    pub fn link_service(&self) -> Arc<LinkService<S>> {
        Arc::clone(&self.link)
    }

    pub fn status_service(&self) -> Arc<StatusUpdateService<S>> {
        Arc::clone(&self.status)
    }

    /// Decodes and processes one message, returning a short summary of what was done.
    pub fn dispatch(&self, message: &InboundMessage) -> Result<String, DispatchError> {
        match message.kind {
            QueueKind::Link => {
                let request: LinkRequest = decode(message)?;
                let outcome = self.link.save_and_link(&request)?;
                Ok(format!(
                    "maat {} linked to case {} (tx {})",
                    outcome.maat_id, outcome.case_id, outcome.tx_id
                ))
            }
            QueueKind::Unlink => {
                let request: UnlinkRequest = decode(message)?;
                let outcome = self.link.unlink(&request)?;
                Ok(format!(
                    "maat {} unlinked from case {} (tx {})",
                    outcome.maat_id, outcome.case_id, outcome.removed_tx_id
                ))
            }
            QueueKind::LaaStatus => {
                let request: StatusUpdateRequest = decode(message)?;
                let outcome = self.status.execute(&request)?;
                Ok(format!(
                    "status applied to case {} (tx {}, {} new result codes)",
                    outcome.case_id, outcome.tx_id, outcome.result_codes_created
                ))
            }
            QueueKind::HearingResulted => {
                let event: HearingResultEvent = decode(message)?;
                let outcome = self.hearing.process(&event)?;
                Ok(format!(
                    "hearing result for maat {} processed ({} new result codes, crown court {:?})",
                    event.maat_id, outcome.result_codes_created, outcome.crown_court
                ))
            }
            QueueKind::ResultCode => {
                let event: ResultCodeEvent = decode(message)?;
                let healing = self.result_codes.process_result_code(event.result_code)?;
                Ok(format!("result code {:?}: {healing:?}", event.result_code))
            }
        }
    }

    /// Processes one message and logs the result, returning what the transport should do.
    pub fn handle(&self, message: &InboundMessage) -> Disposition {
        match self.dispatch(message) {
            Ok(summary) => {
                info!(queue = %message.kind, %summary, "message processed");
                Disposition::Ack
            }
            Err(err) => {
                let disposition = err.disposition();
                match &err {
                    DispatchError::CourtData(CourtDataError::System { .. }) => {
                        error!(queue = %message.kind, error = %err, "message failed, redelivering");
                    }
                    DispatchError::CourtData(
                        CourtDataError::Contract(_) | CourtDataError::FatalLookup(_),
                    ) => {
                        error!(queue = %message.kind, error = %err, "message rejected");
                    }
                    _ => {
                        warn!(queue = %message.kind, error = %err, "message dropped");
                    }
                }
                disposition
            }
        }
    }
}

fn decode<T: DeserializeOwned>(message: &InboundMessage) -> Result<T, DispatchError> {
    serde_json::from_str(&message.payload).map_err(|source| DispatchError::Malformed {
        kind: message.kind,
        source,
    })
}
