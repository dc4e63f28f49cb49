use crate::decision::{decide, Decision};
use crate::models::{MarketSnapshot, Signal};
use crate::risk::RiskAssessment;
use crate::signals::{ModuleReport, SignalSource};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const RISK_KEY: &str = "risk";

/// Per-evaluation state: the shared snapshot plus one write-once slot per
/// module.
///
/// Slots are only ever added. Writing a slot twice is a `ContextConflict`,
/// so a module can never overwrite another module's result.
#[derive(Debug)]
pub struct EvaluationContext {
    snapshot: Arc<MarketSnapshot>,
    signals: BTreeMap<SignalSource, ModuleReport<Signal>>,
    risk: Option<RiskAssessment>,
}

impl EvaluationContext {
    pub fn new(snapshot: Arc<MarketSnapshot>) -> Self {
        Self {
            snapshot,
            signals: BTreeMap::new(),
            risk: None,
        }
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    pub fn insert_signal(&mut self, source: SignalSource, report: ModuleReport<Signal>) -> Result<()> {
        if self.signals.contains_key(&source) {
            return Err(Error::ContextConflict { key: source.key() });
        }
        self.signals.insert(source, report);
        Ok(())
    }

    pub fn insert_risk(&mut self, risk: RiskAssessment) -> Result<()> {
        if self.risk.is_some() {
            return Err(Error::ContextConflict { key: RISK_KEY });
        }
        self.risk = Some(risk);
        Ok(())
    }

    /// Published verdicts, keyed the way the decision weights are
    pub fn signals(&self) -> BTreeMap<SignalSource, Signal> {
        self.signals
            .iter()
            .map(|(source, report)| (*source, report.signal))
            .collect()
    }

    pub fn report(&self, source: SignalSource) -> Option<&ModuleReport<Signal>> {
        self.signals.get(&source)
    }

    pub fn risk(&self) -> Option<&RiskAssessment> {
        self.risk.as_ref()
    }

    /// Run the decision over every published slot. The risk slot must be set.
    pub fn decide(&self) -> Result<Decision> {
        let risk = self.risk.as_ref().ok_or_else(|| Error::ModuleFailed {
            module: RISK_KEY,
            reason: "no assessment recorded".to_string(),
        })?;
        Ok(decide(&self.signals(), risk, self.snapshot.price_usd))
    }

    pub(crate) fn into_parts(
        self,
    ) -> (BTreeMap<SignalSource, ModuleReport<Signal>>, Option<RiskAssessment>) {
        (self.signals, self.risk)
    }
}
