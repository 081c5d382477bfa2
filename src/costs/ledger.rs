use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::RateTable;
use crate::cascades::Tier;

/// One completed request. The cost is computed from the tokens at creation
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEntry {
    timestamp: DateTime<Utc>,
    tier: Tier,
    model: String,
    prompt_tokens: u64,
    completion_tokens: u64,
    cost_usd: f64,
    duration_ms: u64,
}

impl CostEntry {
    pub fn new(
        rates: &RateTable,
        tier: Tier,
        model: impl Into<String>,
        prompt_tokens: u64,
        completion_tokens: u64,
        duration_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            tier,
            model: model.into(),
            prompt_tokens,
            completion_tokens,
            cost_usd: rates.cost(tier, prompt_tokens, completion_tokens),
            duration_ms,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens
    }

    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens
    }

    pub fn cost_usd(&self) -> f64 {
        self.cost_usd
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierTotals {
    pub requests: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_requests: usize,
    pub total_cost_usd: f64,
    pub by_tier: BTreeMap<Tier, TierTotals>,
}

/// Append-only, in-memory record of completed requests. Safe to share
/// between concurrent callers.
#[derive(Debug, Default)]
pub struct CostLedger {
    rates: RateTable,
    entries: Mutex<Vec<CostEntry>>,
}

impl CostLedger {
    pub fn new(rates: RateTable) -> Self {
        Self {
            rates,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    fn entries_guard(&self) -> MutexGuard<'_, Vec<CostEntry>> {
        // Entries are only ever pushed whole, so a poisoned lock still holds
        // a consistent list.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn track(
        &self,
        tier: Tier,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        duration_ms: u64,
    ) -> CostEntry {
        let entry = CostEntry::new(
            &self.rates,
            tier,
            model,
            prompt_tokens,
            completion_tokens,
            duration_ms,
        );
        self.entries_guard().push(entry.clone());
        entry
    }

    pub fn entries(&self) -> Vec<CostEntry> {
        self.entries_guard().clone()
    }

    pub fn len(&self) -> usize {
        self.entries_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries_guard().is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.entries_guard().iter().map(CostEntry::cost_usd).sum()
    }

    pub fn cost_by_tier(&self) -> BTreeMap<Tier, f64> {
        let mut costs = BTreeMap::new();
        for entry in self.entries_guard().iter() {
            *costs.entry(entry.tier).or_insert(0.0) += entry.cost_usd;
        }
        costs
    }

    pub fn requests_by_tier(&self) -> BTreeMap<Tier, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries_guard().iter() {
            *counts.entry(entry.tier).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> LedgerSummary {
        let entries = self.entries_guard();
        let mut summary = LedgerSummary::default();
        for entry in entries.iter() {
            let totals = summary.by_tier.entry(entry.tier).or_default();
            totals.requests += 1;
            totals.prompt_tokens += entry.prompt_tokens;
            totals.completion_tokens += entry.completion_tokens;
            totals.cost_usd += entry.cost_usd;
            summary.total_requests += 1;
            summary.total_cost_usd += entry.cost_usd;
        }
        summary
    }

    pub fn clear(&self) {
        self.entries_guard().clear();
    }
}
