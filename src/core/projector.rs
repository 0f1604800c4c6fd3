//! Entity Projector
//!
//! Turns a GraphSense lookup into graph entities:
//! - `details`: one address entity or one wallet entity, depending on the record
//! - `cluster`: one wallet entity with address count and currency icon overlays
//! - `tags` / `entity_tags`: one owner entity per attribution tag
//!
//! Entities are handed to the sink as soon as they are complete.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::config::GraphSenseConfig;
use crate::models::entity::{
    EntityId, MatchingRule, OutputEntity, OverlayKind, OverlayPosition, TransformSink,
};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    Activity, BackendRecord, CurrencyCode, Lookup, LookupResult, QueryKind, Tag, TagCollection,
};
use crate::utils::constants::{
    get_currency_icon, OWNER_ENTITY_TYPE, TAGGED_OVERLAY_ICON, UNKNOWN_ICON, WALLET_ENTITY_TYPE,
};

/// Convert a smallest-unit amount to display units
pub fn to_display_units(value: i128, factor: f64) -> f64 {
    value as f64 / factor
}

fn timestamp_to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0).single()
}

/// Projects lookups into entities, using per-currency unit factors
#[derive(Debug, Clone, Default)]
pub struct EntityProjector {
    factor_overrides: HashMap<CurrencyCode, f64>,
}

impl EntityProjector {
    /// Projector using the static currency profiles
    pub fn new() -> Self {
        Self::default()
    }

    /// Projector honouring `unit_factors` from the config
    pub fn from_config(config: &GraphSenseConfig) -> Self {
        Self {
            factor_overrides: config.factor_overrides(),
        }
    }

    /// Smallest units per display unit for `currency`
    pub fn factor(&self, currency: CurrencyCode) -> f64 {
        self.factor_overrides
            .get(&currency)
            .copied()
            .unwrap_or(currency.profile().factor)
    }

    /// Project a lookup result; errors pass through untouched.
    ///
    /// Returns the emitted entity for `details` and `cluster`, `None` for the
    /// tag kinds (one entity per tag is emitted instead).
    pub fn project<S: TransformSink + ?Sized>(
        &self,
        result: LookupResult,
        currency: CurrencyCode,
        kind: QueryKind,
        sink: &mut S,
    ) -> AppResult<Option<EntityId>> {
        let lookup = result?;

        match kind {
            QueryKind::Details => Ok(Some(self.project_details(&lookup, currency, sink))),
            QueryKind::Cluster => self.project_cluster(&lookup, currency, sink).map(Some),
            QueryKind::Tags | QueryKind::EntityTags => {
                self.project_tags(&lookup.tags, currency, sink)?;
                Ok(None)
            }
        }
    }

    fn project_details<S: TransformSink + ?Sized>(
        &self,
        lookup: &Lookup,
        currency: CurrencyCode,
        sink: &mut S,
    ) -> EntityId {
        let mut entity = match &lookup.primary {
            BackendRecord::Cluster(cluster) => {
                let mut entity = OutputEntity::new(WALLET_ENTITY_TYPE, cluster.entity.to_string());
                entity.add_property(
                    "num_addresses",
                    "Number of addresses",
                    MatchingRule::Loose,
                    cluster.no_addresses,
                );
                entity
            }
            BackendRecord::Address(address) => {
                let mut entity =
                    OutputEntity::new(currency.profile().entity_type, address.address.as_str());
                entity.add_property("currency", "Currency", MatchingRule::Loose, currency.as_str());
                if let Some(cluster_id) = address.entity {
                    entity.add_property(
                        "cluster_ID",
                        "Cluster ID",
                        MatchingRule::Loose,
                        cluster_id,
                    );
                }
                entity
            }
        };

        self.add_common_properties(&mut entity, lookup.primary.activity(), currency);
        add_tagged_overlay(&mut entity, &lookup.tags);

        debug!("Details entity {} ({})", entity.value, entity.entity_type);
        sink.add_entity(entity)
    }

    fn project_cluster<S: TransformSink + ?Sized>(
        &self,
        lookup: &Lookup,
        currency: CurrencyCode,
        sink: &mut S,
    ) -> AppResult<EntityId> {
        let (cluster_id, no_addresses) = match &lookup.primary {
            BackendRecord::Cluster(cluster) => (cluster.entity, Some(cluster.no_addresses)),
            BackendRecord::Address(address) => {
                let cluster_id = address
                    .entity
                    .ok_or_else(|| AppError::no_cluster(currency, &address.address))?;
                (cluster_id, None)
            }
        };
        let cluster_id = cluster_id.to_string();

        let mut entity = OutputEntity::new(WALLET_ENTITY_TYPE, cluster_id.as_str());
        entity
            .set_link_label(format!("To Cluster [GraphSense] ({})", currency))
            .add_property(
                "cryptocurrency.wallet.name",
                "Wallet Name",
                MatchingRule::Loose,
                cluster_id.as_str(),
            )
            .add_property("cluster_ID", "Cluster ID", MatchingRule::Loose, cluster_id.as_str())
            .add_property("currency", "Currency", MatchingRule::Strict, currency.as_str());
        if let Some(count) = no_addresses {
            entity.add_property(
                "Number_addresses",
                "Number of Addresses",
                MatchingRule::Loose,
                count,
            );
        }

        self.add_common_properties(&mut entity, lookup.primary.activity(), currency);

        if let Some(count) = no_addresses {
            entity.add_overlay(count.to_string(), OverlayPosition::SouthWest, OverlayKind::Text);
        }
        entity.add_overlay(get_currency_icon(currency), OverlayPosition::West, OverlayKind::Image);
        add_tagged_overlay(&mut entity, &lookup.tags);

        debug!("Cluster entity {} in {}", cluster_id, currency);
        Ok(sink.add_entity(entity))
    }

    fn project_tags<S: TransformSink + ?Sized>(
        &self,
        tags: &TagCollection,
        currency: CurrencyCode,
        sink: &mut S,
    ) -> AppResult<()> {
        let tags = tags.tags();
        if tags.is_empty() {
            return Err(AppError::no_tags(currency));
        }

        for tag in tags {
            sink.add_entity(tag_entity(tag, currency));
        }
        info!("🏷️ {} attribution tag(s) in {}", tags.len(), currency);
        Ok(())
    }

    /// Balance, flows, tx counts and first/last tx dates
    fn add_common_properties(
        &self,
        entity: &mut OutputEntity,
        activity: Activity<'_>,
        currency: CurrencyCode,
    ) {
        let factor = self.factor(currency);
        let received = activity.total_received.value;
        let spent = activity.total_spent.value;

        entity.add_property(
            "final_balance",
            format!("Final balance ({})", currency),
            MatchingRule::Loose,
            to_display_units(activity.balance.value, factor),
        );
        if let Some(fiat) = activity.balance.fiat_values.first() {
            entity.add_property(
                "final_balance_fiat",
                format!("Final balance ({})", fiat.code),
                MatchingRule::Loose,
                fiat.value,
            );
        }
        entity
            .add_property(
                "total_received",
                "Total received",
                MatchingRule::Loose,
                to_display_units(received, factor),
            )
            .add_property(
                "total_sent",
                "Total sent",
                MatchingRule::Loose,
                to_display_units(spent, factor),
            )
            .add_property(
                "total_throughput",
                "Total throughput",
                MatchingRule::Loose,
                to_display_units(received.saturating_add(spent), factor),
            );

        entity
            .add_property(
                "num_transactions",
                "Number of transactions",
                MatchingRule::Loose,
                activity.no_incoming_txs.saturating_add(activity.no_outgoing_txs),
            )
            .add_property(
                "num_in_transactions",
                "Number of incoming transactions",
                MatchingRule::Loose,
                activity.no_incoming_txs,
            )
            .add_property(
                "num_out_transactions",
                "Number of outgoing transactions",
                MatchingRule::Loose,
                activity.no_outgoing_txs,
            );

        if let Some(first) = activity.first_tx.and_then(|tx| timestamp_to_datetime(tx.timestamp)) {
            entity.add_property("First_tx", "First transaction (UTC)", MatchingRule::Loose, first);
        }
        if let Some(last) = activity.last_tx.and_then(|tx| timestamp_to_datetime(tx.timestamp)) {
            entity.add_property("Last_tx", "Last transaction (UTC)", MatchingRule::Loose, last);
        }
    }
}

fn add_tagged_overlay(entity: &mut OutputEntity, tags: &TagCollection) {
    if tags.has_tags() {
        entity.add_overlay(TAGGED_OVERLAY_ICON, OverlayPosition::NorthWest, OverlayKind::Image);
    }
}

/// Display name is the property name with underscores as spaces
fn add_optional(
    entity: &mut OutputEntity,
    name: &str,
    value: Option<&str>,
    matching: MatchingRule,
) {
    if let Some(value) = value {
        entity.add_property(name, name.replace('_', " "), matching, value);
    }
}

fn tag_entity(tag: &Tag, currency: CurrencyCode) -> OutputEntity {
    let mut entity = match tag.label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => OutputEntity::new(OWNER_ENTITY_TYPE, label),
        None => {
            let creator = tag.tagpack_creator.as_deref().unwrap_or("Unknown");
            let mut entity =
                OutputEntity::new(OWNER_ENTITY_TYPE, format!("Undisclosed, contact: {}", creator));
            entity.set_icon_url(UNKNOWN_ICON);
            entity
        }
    };

    entity.set_link_label(format!("To tags [GraphSense] ({})", currency));

    add_optional(&mut entity, "OwnerType", tag.category.as_deref(), MatchingRule::Loose);
    add_optional(&mut entity, "Source_URI", tag.source.as_deref(), MatchingRule::Loose);
    if let Some(source) = tag.source.as_deref().filter(|s| !s.is_empty()) {
        entity.add_display_information(format!(r#"<a href="{0}">{0}</a>"#, source), "Source URI");
    }
    add_optional(
        &mut entity,
        "tagpack_creator",
        tag.tagpack_creator.as_deref(),
        MatchingRule::Strict,
    );
    add_optional(&mut entity, "tagpack_title", tag.tagpack_title.as_deref(), MatchingRule::Loose);
    add_optional(&mut entity, "Abuse_type", tag.abuse.as_deref(), MatchingRule::Loose);
    add_optional(&mut entity, "Category", tag.category.as_deref(), MatchingRule::Loose);

    if let Some(confidence) = tag.confidence_level.as_ref().filter(|c| !c.is_null()) {
        entity.add_property(
            "Confidence_level",
            "Confidence Level",
            MatchingRule::Loose,
            confidence,
        );
        if let Some(weight) = tag.confidence_weight() {
            entity.set_weight(weight);
        }
    }

    entity
}
