// Orchestrator
// Fans one snapshot out to the four signal modules and the risk module,
// joins all five, then runs the decision. Feed I/O happens before the
// pipeline and the sink write after it.
pub mod context;
pub mod summary;

pub use context::EvaluationContext;
pub use summary::MarketSummary;

use crate::api::{liquidity_by_dex, select_pair, MarketFeed};
use crate::decision::Decision;
use crate::metrics::{evaluation_points, MetricsSink};
use crate::models::{MarketSnapshot, Signal};
use crate::risk::{self, RiskAssessment};
use crate::signals::{ModuleReport, SignalSource};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Everything one pipeline pass produced from a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub reports: BTreeMap<SignalSource, ModuleReport<Signal>>,
    pub risk: RiskAssessment,
    pub decision: Decision,
}

/// Run one module off the async executor. A panic inside the module fails
/// the whole cycle.
async fn run_module<T, F>(module: &'static str, snapshot: Arc<MarketSnapshot>, analyze: F) -> Result<T>
where
    F: FnOnce(&MarketSnapshot) -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || analyze(&snapshot))
        .await
        .map_err(|e| Error::ModuleFailed {
            module,
            reason: e.to_string(),
        })
}

fn signal_task(
    source: SignalSource,
    snapshot: &Arc<MarketSnapshot>,
) -> impl std::future::Future<Output = Result<(SignalSource, ModuleReport<Signal>)>> {
    run_module(source.key(), Arc::clone(snapshot), move |s| {
        (source, source.analyze(s))
    })
}

/// Evaluate a snapshot: four signal modules and risk concurrently, then the
/// decision once all five have reported.
pub async fn run_pipeline(snapshot: MarketSnapshot) -> Result<PipelineOutput> {
    let snapshot = Arc::new(snapshot);

    let (technical, fundamental, sentiment, valuation, risk) = tokio::try_join!(
        signal_task(SignalSource::Technical, &snapshot),
        signal_task(SignalSource::Fundamental, &snapshot),
        signal_task(SignalSource::Sentiment, &snapshot),
        signal_task(SignalSource::Valuation, &snapshot),
        run_module(context::RISK_KEY, Arc::clone(&snapshot), risk::assess),
    )?;

    let mut ctx = EvaluationContext::new(snapshot);
    for (source, report) in [technical, fundamental, sentiment, valuation] {
        ctx.insert_signal(source, report)?;
    }
    ctx.insert_risk(risk)?;

    let decision = ctx.decide()?;
    let (reports, risk) = ctx.into_parts();
    let risk = risk.ok_or_else(|| Error::ModuleFailed {
        module: context::RISK_KEY,
        reason: "assessment lost after decision".to_string(),
    })?;

    Ok(PipelineOutput {
        reports,
        risk,
        decision,
    })
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    pub token_address: String,
    /// Restrict pair selection to one chain
    pub chain_id: Option<String>,
    /// Print every reasoning record to stdout
    pub show_reasoning: bool,
}

impl EvaluationRequest {
    pub fn new(token_address: impl Into<String>) -> Self {
        Self {
            token_address: token_address.into(),
            ..Default::default()
        }
    }

    pub fn on_chain(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    pub fn with_reasoning(mut self, show: bool) -> Self {
        self.show_reasoning = show;
        self
    }
}

/// One completed evaluation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub token_address: String,
    pub chain_id: Option<String>,
    pub evaluated_at: DateTime<Utc>,
    pub snapshot: MarketSnapshot,
    pub summary: MarketSummary,
    pub reports: BTreeMap<SignalSource, ModuleReport<Signal>>,
    pub risk: RiskAssessment,
    pub decision: Decision,
}

impl Evaluation {
    pub fn new(
        id: Uuid,
        request: &EvaluationRequest,
        snapshot: MarketSnapshot,
        output: PipelineOutput,
    ) -> Self {
        let chain_id = snapshot.chain_id.clone().or_else(|| request.chain_id.clone());
        Self {
            id,
            token_address: request.token_address.clone(),
            chain_id,
            evaluated_at: Utc::now(),
            summary: MarketSummary::from(&snapshot),
            snapshot,
            reports: output.reports,
            risk: output.risk,
            decision: output.decision,
        }
    }

    /// Reasoning records in display order: market summary, the four signal
    /// modules, risk, decision.
    pub fn reasoning_sections(&self) -> Result<Vec<(&'static str, Value)>> {
        let encode = |value: serde_json::Result<Value>| {
            value.map_err(|e| Error::ModuleFailed {
                module: "reasoning",
                reason: e.to_string(),
            })
        };

        let mut sections = vec![("market_data", encode(serde_json::to_value(&self.summary))?)];
        for source in SignalSource::ALL {
            if let Some(report) = self.reports.get(&source) {
                sections.push((source.key(), encode(serde_json::to_value(report))?));
            }
        }
        sections.push(("risk", self.risk.reasoning_json()));
        sections.push((
            "decision",
            encode(serde_json::to_value(&self.decision.reasoning))?,
        ));
        Ok(sections)
    }
}

fn display_reasoning(evaluation: &Evaluation) -> Result<()> {
    for (title, record) in evaluation.reasoning_sections()? {
        let body = serde_json::to_string_pretty(&record).map_err(|e| Error::ModuleFailed {
            module: "reasoning",
            reason: e.to_string(),
        })?;
        println!("==== {} ====\n{}\n", title, body);
    }
    Ok(())
}

/// Drives full cycles: feed, pair selection, pipeline, sink.
pub struct Orchestrator<F, S> {
    feed: F,
    sink: Option<S>,
}

impl<F: MarketFeed, S: MetricsSink> Orchestrator<F, S> {
    pub fn new(feed: F, sink: Option<S>) -> Self {
        Self { feed, sink }
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<Evaluation> {
        let id = Uuid::new_v4();
        let chain = request.chain_id.as_deref();
        tracing::info!(
            "[{}] Evaluating {} on {}",
            id,
            request.token_address,
            chain.unwrap_or("any chain")
        );

        let pairs = self.feed.fetch_pairs(&request.token_address).await?;
        let pair = select_pair(&pairs, &request.token_address, chain)?;
        let snapshot = MarketSnapshot::try_from(pair)?;
        for (dex, liquidity) in liquidity_by_dex(&pairs, chain) {
            tracing::debug!("[{}] {} liquidity: {:.2}", id, dex, liquidity);
        }

        let output = run_pipeline(snapshot.clone()).await?;
        let evaluation = Evaluation::new(id, request, snapshot, output);

        if request.show_reasoning {
            display_reasoning(&evaluation)?;
        }

        if let Some(sink) = &self.sink {
            if let Err(e) = self.persist(sink, &evaluation).await {
                tracing::warn!("[{}] Metrics not recorded: {}", id, e);
            }
        }

        tracing::info!(
            "[{}] {} {}: {}",
            id,
            evaluation.summary.symbol,
            evaluation.decision.action,
            evaluation.decision.reasoning.final_decision.explanation
        );
        Ok(evaluation)
    }

    async fn persist(&self, sink: &S, evaluation: &Evaluation) -> Result<()> {
        let points = evaluation_points(evaluation)?;
        sink.write(&points).await?;
        tracing::debug!("[{}] Wrote {} points", evaluation.id, points.len());
        Ok(())
    }
}
