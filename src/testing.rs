//! In-crate fakes for the RPC, webhook and role seams.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::discord::{RoleMention, RoleResolver, WebhookMessage, WebhookSink};
use crate::domain::{
    Chain, ChainEvent, GuildId, ReferendumIndex, RoleId, WebhookId, WebhookRegistration,
};
use crate::error::{DeliveryError, RoleLookupError, RpcError};
use crate::rpc::{EventBatchStream, RpcConnection, RpcConnector};
use crate::watcher::ReferendumHandler;

/// A `Democracy::Started` event for `index`.
pub(crate) fn started(index: u32) -> ChainEvent {
    ChainEvent::new(
        "Democracy",
        "Started",
        json!({"ref_index": index, "threshold": {"SimpleMajority": []}}),
    )
}

/// A registration whose URL is unique per id.
pub(crate) fn registration(id: u64, chain: &str, guild: u64) -> WebhookRegistration {
    WebhookRegistration {
        id: WebhookId::new(id),
        guild_id: GuildId::new(guild),
        chain: chain.to_string(),
        token: format!("token-{id}"),
        url: format!("https://discord.test/api/webhooks/{id}/token-{id}"),
        role_ids: None,
    }
}

/// How a fake event subscription finishes after its scripted batches.
#[derive(Debug, Clone, Copy)]
pub(crate) enum StreamEnd {
    /// Stays open without further items.
    Pending,
    /// Ends cleanly.
    Close,
    /// Yields an error.
    Fail,
}

/// Behaviour of one fake endpoint.
#[derive(Debug, Clone)]
pub(crate) enum FakeEndpoint {
    /// Refuses the connection.
    Unreachable,
    /// Connects but the liveness probe fails.
    BadProbe,
    /// Never finishes connecting.
    Hang,
    /// Connects, answers the probe and streams the scripted batches.
    Live {
        finalized: u64,
        batches: Vec<Vec<ChainEvent>>,
        end: StreamEnd,
    },
}

impl FakeEndpoint {
    /// Healthy endpoint with an idle subscription.
    pub(crate) fn healthy(finalized: u64) -> Self {
        Self::Live {
            finalized,
            batches: Vec::new(),
            end: StreamEnd::Pending,
        }
    }

    /// Healthy endpoint streaming `batches`, then `end`.
    pub(crate) fn streaming(batches: Vec<Vec<ChainEvent>>, end: StreamEnd) -> Self {
        Self::Live {
            finalized: 1,
            batches,
            end,
        }
    }
}

/// Connector over scripted endpoints; unknown URLs are unreachable.
#[derive(Debug, Default)]
pub(crate) struct FakeConnector {
    endpoints: HashMap<String, FakeEndpoint>,
    attempts: Mutex<Vec<(String, Instant)>>,
}

impl FakeConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, endpoint: FakeEndpoint) -> Self {
        self.endpoints.insert(url.to_string(), endpoint);
        self
    }

    /// URLs passed to `open`, in call order.
    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// When each `open` call happened, in call order.
    pub(crate) fn attempt_times(&self) -> Vec<Instant> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl RpcConnector for FakeConnector {
    type Connection = FakeConnection;

    async fn open(&self, url: &str) -> Result<FakeConnection, RpcError> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), Instant::now()));

        match self.endpoints.get(url).cloned() {
            None | Some(FakeEndpoint::Unreachable) => {
                Err(RpcError::Client(subxt::Error::Other(
                    "connection refused".to_string(),
                )))
            }
            Some(FakeEndpoint::Hang) => std::future::pending().await,
            Some(FakeEndpoint::BadProbe) => Ok(FakeConnection {
                finalized: None,
                batches: Vec::new(),
                end: StreamEnd::Pending,
            }),
            Some(FakeEndpoint::Live {
                finalized,
                batches,
                end,
            }) => Ok(FakeConnection {
                finalized: Some(finalized),
                batches,
                end,
            }),
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeConnection {
    finalized: Option<u64>,
    batches: Vec<Vec<ChainEvent>>,
    end: StreamEnd,
}

#[async_trait]
impl RpcConnection for FakeConnection {
    async fn finalized_block_number(&self) -> Result<u64, RpcError> {
        self.finalized
            .ok_or_else(|| RpcError::Client(subxt::Error::Other("block number missing".to_string())))
    }

    async fn subscribe_events(&self) -> Result<EventBatchStream, RpcError> {
        let scripted = stream::iter(self.batches.clone().into_iter().map(Ok));
        let tail: EventBatchStream = match self.end {
            StreamEnd::Pending => stream::pending().boxed(),
            StreamEnd::Close => stream::empty().boxed(),
            StreamEnd::Fail => stream::iter([Err(RpcError::SubscriptionClosed)]).boxed(),
        };
        Ok(scripted.chain(tail).boxed())
    }
}

/// Handler that forwards every referendum to a channel.
#[derive(Debug)]
pub(crate) struct RecordingHandler {
    sender: mpsc::UnboundedSender<(String, ReferendumIndex)>,
}

impl RecordingHandler {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<(String, ReferendumIndex)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ReferendumHandler for RecordingHandler {
    async fn referendum_started(&self, chain: &Chain, index: ReferendumIndex) {
        let _ = self.sender.send((chain.name.clone(), index));
    }
}

/// Scripted outcome of a webhook call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Delivery {
    Gone,
    Fail,
}

/// Sink that records every call; URLs without a script succeed.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    outcomes: HashMap<String, Delivery>,
    executed: Mutex<Vec<(String, WebhookMessage)>>,
    deleted: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, outcome: Delivery) -> Self {
        self.outcomes.insert(url.to_string(), outcome);
        self
    }

    pub(crate) fn executed(&self) -> Vec<(String, WebhookMessage)> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn outcome(&self, url: &str) -> Result<(), DeliveryError> {
        match self.outcomes.get(url) {
            None => Ok(()),
            Some(Delivery::Gone) => Err(DeliveryError::Gone),
            Some(Delivery::Fail) => Err(DeliveryError::Rejected {
                status: 500,
                code: None,
                message: "internal error".to_string(),
            }),
        }
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn execute(&self, url: &str, message: &WebhookMessage) -> Result<(), DeliveryError> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((url.to_string(), message.clone()));
        self.outcome(url)
    }

    async fn delete(&self, url: &str) -> Result<(), DeliveryError> {
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        self.outcome(url)
    }
}

/// Role resolver over fixed sets of known and failing role ids.
#[derive(Debug, Default)]
pub(crate) struct StaticRoles {
    known: HashSet<u64>,
    failing: HashSet<u64>,
}

impl StaticRoles {
    pub(crate) fn known(roles: impl IntoIterator<Item = u64>) -> Self {
        Self {
            known: roles.into_iter().collect(),
            failing: HashSet::new(),
        }
    }

    pub(crate) fn failing(mut self, roles: impl IntoIterator<Item = u64>) -> Self {
        self.failing.extend(roles);
        self
    }
}

#[async_trait]
impl RoleResolver for StaticRoles {
    async fn resolve(
        &self,
        _guild: GuildId,
        role: RoleId,
    ) -> Result<Option<RoleMention>, RoleLookupError> {
        if self.failing.contains(&role.get()) {
            return Err(RoleLookupError::Transport("timed out".to_string()));
        }
        Ok(self
            .known
            .contains(&role.get())
            .then_some(RoleMention::new(role)))
    }
}
