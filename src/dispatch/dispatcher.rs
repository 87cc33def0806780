//! Fan-out of one referendum to every webhook subscribed to its chain.

use std::sync::Arc;

use async_trait::async_trait;

use super::message::referendum_notice;
use crate::discord::{RoleMention, RoleResolver, WebhookSink};
use crate::domain::{Chain, ReferendumIndex, WebhookRegistration};
use crate::store::SubscriptionStore;
use crate::watcher::ReferendumHandler;

/// Outcome counts of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Registrations found for the chain.
    pub attempted: usize,
    /// Deliveries the platform accepted.
    pub delivered: usize,
    /// Registrations deleted because their webhook was gone.
    pub removed: usize,
    /// Deliveries that failed for any other reason.
    pub failed: usize,
}

/// Delivers referendum notices to registered webhooks.
///
/// Best effort: each destination gets one attempt, failures are logged
/// and never abort the fan-out. A webhook reported as gone is removed from
/// the store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: SubscriptionStore,
    sink: Arc<dyn WebhookSink>,
    roles: Arc<dyn RoleResolver>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        store: SubscriptionStore,
        sink: Arc<dyn WebhookSink>,
        roles: Arc<dyn RoleResolver>,
    ) -> Self {
        Self { store, sink, roles }
    }

    /// Sends the notice for referendum `index` on `chain` to every
    /// registration of that chain, reading the registrations fresh.
    pub async fn dispatch(&self, chain: &Chain, index: ReferendumIndex) -> DispatchReport {
        let registrations = match self.store.for_chain(&chain.name).await {
            Ok(registrations) => registrations,
            Err(e) => {
                tracing::error!(chain = %chain.name, %index, error = %e, "cannot load webhooks, dispatch skipped");
                return DispatchReport::default();
            }
        };

        let mut report = DispatchReport {
            attempted: registrations.len(),
            ..DispatchReport::default()
        };

        for registration in &registrations {
            let mentions = self.resolve_mentions(registration).await;
            let message = referendum_notice(chain, index, &mentions);

            match self.sink.execute(&registration.url, &message).await {
                Ok(()) => {
                    report.delivered += 1;
                    tracing::debug!(chain = %chain.name, webhook = %registration.id, "notice delivered");
                }
                Err(e) if e.is_gone() => {
                    tracing::warn!(
                        chain = %chain.name,
                        webhook = %registration.id,
                        guild = %registration.guild_id,
                        "webhook no longer exists, removing registration"
                    );
                    match self.store.delete(registration.id).await {
                        Ok(true) => report.removed += 1,
                        Ok(false) => {}
                        Err(e) => tracing::error!(webhook = %registration.id, error = %e, "cannot remove stale webhook"),
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(chain = %chain.name, webhook = %registration.id, error = %e, "delivery failed");
                }
            }
        }

        tracing::info!(
            chain = %chain.name,
            %index,
            attempted = report.attempted,
            delivered = report.delivered,
            removed = report.removed,
            failed = report.failed,
            "referendum dispatched"
        );
        report
    }

    /// Resolves the registration's roles in stored order; unknown roles
    /// and failed lookups are left out.
    async fn resolve_mentions(&self, registration: &WebhookRegistration) -> Vec<RoleMention> {
        let Some(roles) = registration.role_ids.as_ref() else {
            return Vec::new();
        };
        let mut mentions = Vec::with_capacity(roles.len());
        for role in roles.iter() {
            match self.roles.resolve(registration.guild_id, role).await {
                Ok(Some(mention)) => mentions.push(mention),
                Ok(None) => {
                    tracing::debug!(guild = %registration.guild_id, %role, "role not found, not mentioned");
                }
                Err(e) => {
                    tracing::warn!(guild = %registration.guild_id, %role, error = %e, "role lookup failed");
                }
            }
        }
        mentions
    }
}

#[async_trait]
impl ReferendumHandler for Dispatcher {
    async fn referendum_started(&self, chain: &Chain, index: ReferendumIndex) {
        self.dispatch(chain, index).await;
    }
}
