//! Transforms - "To Details", "To Cluster", "To Tags"
//!
//! Each run: classify the request, then look up and project every currency
//! candidate in order. Request-level errors stop the run with one
//! informational notice; per-currency failures become partial notices and
//! the loop moves on to the next candidate.

use serde::Serialize;
use tracing::info;

use crate::core::classifier::{classify, ClassifiedRequest};
use crate::core::projector::EntityProjector;
use crate::core::reporter::report_error;
use crate::models::entity::{Severity, TransformSink};
use crate::models::types::{AddressQuery, CurrencyCode, LookupResult, Properties, QueryKind};
use crate::providers::gateway::Gateway;
use crate::providers::graphsense::Connector;
use crate::utils::constants::INPUT_ENTITY_TYPE;

/// Operator-facing transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transform {
    ToDetails,
    ToCluster,
    ToTags,
}

/// Registry entry for a transform
#[derive(Debug, Clone, Serialize)]
pub struct TransformInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub input_entity: &'static str,
    pub description: &'static str,
    pub output_entities: Vec<&'static str>,
}

/// Counters of a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Currencies whose lookup and projection both succeeded
    pub succeeded: usize,
    /// Currencies that produced a partial notice
    pub failed: usize,
}

impl Transform {
    pub fn all() -> [Transform; 3] {
        [Self::ToDetails, Self::ToCluster, Self::ToTags]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ToDetails => "ToDetails",
            Self::ToCluster => "ToCluster",
            Self::ToTags => "ToTags",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ToDetails => "To Details",
            Self::ToCluster => "To Cluster",
            Self::ToTags => "To Tags",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ToDetails => "Returns details of a cryptocurrency address.",
            Self::ToCluster => "Returns the cluster details to which the address belongs.",
            Self::ToTags => "Returns known attribution tags",
        }
    }

    pub fn info(&self) -> TransformInfo {
        TransformInfo {
            name: self.name(),
            display_name: self.display_name(),
            input_entity: INPUT_ENTITY_TYPE,
            description: self.description(),
            output_entities: vec![INPUT_ENTITY_TYPE],
        }
    }

    /// Projection branch for a classified query
    pub fn query_kind(&self, query: &AddressQuery) -> QueryKind {
        match self {
            Self::ToDetails => QueryKind::Details,
            Self::ToCluster => QueryKind::Cluster,
            Self::ToTags if query.is_cluster => QueryKind::EntityTags,
            Self::ToTags => QueryKind::Tags,
        }
    }

    /// Run against a request, emitting entities and notices into `sink`
    pub fn run<C, S>(
        &self,
        properties: &Properties,
        gateway: &Gateway<C>,
        projector: &EntityProjector,
        sink: &mut S,
    ) -> RunSummary
    where
        C: Connector,
        S: TransformSink + ?Sized,
    {
        let request = match classify(properties) {
            Ok(request) => request,
            Err(err) => {
                info!("🛑 {} stopped [{}]: {}", self.display_name(), err.code_str(), err);
                sink.add_message(err.to_string(), Severity::Inform);
                return RunSummary::default();
            }
        };

        let kind = self.query_kind(&request.query);
        info!(
            "🚀 {} on {} ({} candidate currencies)",
            self.display_name(),
            request.identifier(),
            request.currencies.len()
        );

        let mut summary = RunSummary::default();
        for &currency in &request.currencies {
            let result = self.lookup(&request, currency, gateway);
            match projector.project(result, currency, kind, sink) {
                Ok(_) => summary.succeeded += 1,
                Err(err) => {
                    report_error(sink, currency, kind, request.identifier(), &err);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "✅ {} done: {} ok, {} failed",
            self.display_name(),
            summary.succeeded,
            summary.failed
        );
        summary
    }

    fn lookup<C: Connector>(
        &self,
        request: &ClassifiedRequest,
        currency: CurrencyCode,
        gateway: &Gateway<C>,
    ) -> LookupResult {
        if let Some(cluster_id) = request.query.cluster_id() {
            return gateway.lookup_entity(currency, cluster_id);
        }
        match self {
            Self::ToCluster => gateway.lookup_address_cluster(currency, request.identifier()),
            Self::ToDetails | Self::ToTags => {
                gateway.lookup_address(currency, request.identifier())
            }
        }
    }
}
