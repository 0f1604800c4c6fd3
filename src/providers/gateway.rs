//! Backend Gateway
//!
//! Each lookup opens its own session, makes exactly one primary-object call
//! and one tag call, and drops the session before returning. Failures are
//! folded into `AppError` here so callers only ever see operator text.

use tracing::{debug, info};

use crate::models::errors::AppError;
use crate::models::types::{BackendRecord, CurrencyCode, Lookup, LookupResult, LookupTarget};
use crate::providers::graphsense::{BackendFault, BackendSession, Connector};

/// Uniform lookup facade over a `Connector`
pub struct Gateway<C: Connector> {
    connector: C,
}

impl<C: Connector> Gateway<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Address details plus the address's tags
    pub fn lookup_address(&self, currency: CurrencyCode, address: &str) -> LookupResult {
        self.fetch(LookupTarget::Address, |session| {
            let record = session.get_address(currency, address)?;
            let tags = session.list_tags_by_address(currency, address)?;
            Ok(Lookup {
                primary: BackendRecord::Address(record),
                tags,
            })
        })
    }

    /// Cluster details plus the address tags inside the cluster
    pub fn lookup_entity(&self, currency: CurrencyCode, entity_id: u64) -> LookupResult {
        self.fetch(LookupTarget::Entity, |session| {
            let record = session.get_entity(currency, entity_id)?;
            let tags = session.list_address_tags_by_entity(currency, entity_id)?;
            Ok(Lookup {
                primary: BackendRecord::Cluster(record),
                tags,
            })
        })
    }

    /// Cluster owning `address`: address lookup first, then the entity lookup
    pub fn lookup_address_cluster(&self, currency: CurrencyCode, address: &str) -> LookupResult {
        let lookup = self.lookup_address(currency, address)?;
        let cluster_id = match lookup.primary {
            BackendRecord::Address(ref record) => record.entity,
            BackendRecord::Cluster(ref cluster) => Some(cluster.entity),
        }
        .ok_or_else(|| AppError::no_cluster(currency, address))?;

        debug!("{} belongs to cluster {} in {}", address, cluster_id, currency);
        self.lookup_entity(currency, cluster_id)
    }

    fn fetch<F>(&self, target: LookupTarget, call: F) -> LookupResult
    where
        F: FnOnce(&C::Session) -> Result<Lookup, BackendFault>,
    {
        let outcome = self.connector.open().and_then(|session| call(&session));

        match outcome {
            Ok(lookup) => {
                info!("🔍 GraphSense {} lookup: {} tag(s)", target, lookup.tags.tags().len());
                Ok(lookup)
            }
            Err(BackendFault::Unexpected(detail)) => Err(AppError::backend_unexpected(detail)),
            Err(fault) => Err(AppError::backend_api(target, fault)),
        }
    }
}
