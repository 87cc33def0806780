//! `subxt`-backed implementation of the chain RPC seam.
//!
//! Events are decoded dynamically against the runtime metadata fetched on
//! connect, so no generated runtime bindings are needed. Decoded field
//! values are rendered to JSON for the event filter.

use std::fmt;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::{Map, Value};
use subxt::events::{EventDetails, Events};
use subxt::ext::scale_value::{Composite, Primitive, Value as ScaleValue, ValueDef};
use subxt::{OnlineClient, PolkadotConfig};

use super::{EventBatchStream, RpcConnection, RpcConnector};
use crate::domain::ChainEvent;
use crate::error::RpcError;

/// Dynamic client for any Polkadot-family chain.
pub type SubstrateClient = OnlineClient<PolkadotConfig>;

/// Opens `subxt` websocket clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstrateConnector;

impl SubstrateConnector {
    /// Creates a connector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RpcConnector for SubstrateConnector {
    type Connection = SubstrateConnection;

    async fn open(&self, url: &str) -> Result<SubstrateConnection, RpcError> {
        let client = if url.starts_with("wss://") || url.starts_with("https://") {
            SubstrateClient::from_url(url).await?
        } else {
            tracing::warn!(%url, "connecting over an unencrypted transport");
            SubstrateClient::from_insecure_url(url).await?
        };
        Ok(SubstrateConnection { client })
    }
}

/// A live `subxt` client bound to one endpoint.
pub struct SubstrateConnection {
    client: SubstrateClient,
}

impl fmt::Debug for SubstrateConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstrateConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl RpcConnection for SubstrateConnection {
    async fn finalized_block_number(&self) -> Result<u64, RpcError> {
        let block = self.client.blocks().at_latest().await?;
        let number: u64 = block.number().into();
        Ok(number)
    }

    async fn subscribe_events(&self) -> Result<EventBatchStream, RpcError> {
        let blocks = self.client.blocks().subscribe_finalized().await?;
        let batches = blocks.then(|block| async move {
            let block = block?;
            let events = block.events().await?;
            Ok::<_, RpcError>(decode_events(&events))
        });
        Ok(batches.boxed())
    }
}

fn decode_events(events: &Events<PolkadotConfig>) -> Vec<ChainEvent> {
    events
        .iter()
        .filter_map(|details| match details {
            Ok(details) => Some(to_chain_event(&details)),
            Err(err) => {
                tracing::debug!(error = %err, "skipping undecodable event");
                None
            }
        })
        .collect()
}

fn to_chain_event(details: &EventDetails<PolkadotConfig>) -> ChainEvent {
    let fields = match details.field_values() {
        Ok(composite) => composite_to_json(&composite),
        Err(err) => {
            tracing::debug!(
                pallet = details.pallet_name(),
                variant = details.variant_name(),
                error = %err,
                "event fields could not be decoded"
            );
            Value::Null
        }
    };
    ChainEvent::new(details.pallet_name(), details.variant_name(), fields)
}

/// Renders decoded fields: named fields as an object, positional fields
/// as an array.
pub(crate) fn composite_to_json<T>(composite: &Composite<T>) -> Value {
    match composite {
        Composite::Named(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), value_to_json(value)))
                .collect::<Map<_, _>>(),
        ),
        Composite::Unnamed(values) => Value::Array(values.iter().map(value_to_json).collect()),
    }
}

fn value_to_json<T>(value: &ScaleValue<T>) -> Value {
    match &value.value {
        ValueDef::Composite(composite) => composite_to_json(composite),
        ValueDef::Variant(variant) => {
            let mut tagged = Map::new();
            tagged.insert(variant.name.clone(), composite_to_json(&variant.values));
            Value::Object(tagged)
        }
        ValueDef::Primitive(primitive) => primitive_to_json(primitive),
        _ => Value::Null,
    }
}

fn primitive_to_json(primitive: &Primitive) -> Value {
    match primitive {
        Primitive::Bool(flag) => Value::Bool(*flag),
        Primitive::Char(ch) => Value::String(ch.to_string()),
        Primitive::String(text) => Value::String(text.clone()),
        Primitive::U128(n) => u64::try_from(*n).map_or_else(|_| Value::String(n.to_string()), Value::from),
        Primitive::I128(n) => i64::try_from(*n).map_or_else(|_| Value::String(n.to_string()), Value::from),
        _ => Value::Null,
    }
}
