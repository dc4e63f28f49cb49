//! The four evaluation records: `market_data`, `valuation_metrics`,
//! `risk_metrics` and `trading_decisions`.
//!
//! Numeric fields are read back out of the display strings, so the stored
//! value is exactly what the console showed.

use super::format::{
    format_usd, parse_labeled, parse_number, parse_pct, parse_trades, parse_usd, ParseError,
};
use super::line::LinePoint;
use crate::decision::Decision;
use crate::models::Signal;
use crate::pipeline::{Evaluation, MarketSummary};
use crate::risk::RiskAssessment;
use crate::signals::{ModuleReport, SignalSource};
use chrono::{DateTime, Utc};

const RISK_SUB_SIGNALS: [&str; 4] = [
    "liquidity_risk",
    "volatility_risk",
    "transaction_risk",
    "market_impact_risk",
];

/// Tags shared by every record of one evaluation
#[derive(Debug, Clone)]
pub struct RecordTags {
    pub token: String,
    pub chain: String,
    pub symbol: String,
    pub name: String,
    pub at: DateTime<Utc>,
}

impl RecordTags {
    pub fn of(evaluation: &Evaluation) -> Self {
        Self {
            token: evaluation.token_address.clone(),
            chain: evaluation.chain_id.clone().unwrap_or_default(),
            symbol: evaluation.summary.symbol.clone(),
            name: evaluation.summary.name.clone(),
            at: evaluation.evaluated_at,
        }
    }

    fn point(&self, measurement: &str) -> LinePoint {
        LinePoint::new(measurement)
            .tag("token", self.token.as_str())
            .tag("chain", self.chain.as_str())
            .tag("symbol", self.symbol.as_str())
            .tag("name", self.name.as_str())
            .timestamp(self.at)
    }
}

pub fn market_data_point(tags: &RecordTags, summary: &MarketSummary) -> Result<LinePoint, ParseError> {
    let (buys, sells) = parse_trades(&summary.trades_24h)?;
    let point = tags
        .point("market_data")
        .field("price", parse_usd(&summary.price)?)
        .field("market_cap", parse_usd(&summary.market_cap)?)
        .field("volume_24h", parse_usd(&summary.volume_24h)?)
        .field("liquidity", parse_usd(&summary.liquidity)?)
        .field("change_24h", parse_pct(&summary.change_24h)?)
        .field("buy_count", buys)
        .field("sell_count", sells);
    Ok(match summary.creation_date {
        Some(created) => point.field("creation_date", created),
        None => point,
    })
}

pub fn valuation_point(
    tags: &RecordTags,
    report: &ModuleReport<Signal>,
) -> Result<LinePoint, ParseError> {
    let ratio = |sub_signal: &str| -> Result<f64, ParseError> {
        let entry = report.reasoning.get(sub_signal).ok_or_else(|| ParseError {
            what: "valuation sub-signal",
            input: sub_signal.to_string(),
        })?;
        parse_labeled(&entry.details, "Ratio: ")
    };

    Ok(tags
        .point("valuation_metrics")
        .field("mcap_tvl_ratio", ratio("mcap_tvl_analysis")?)
        .field("volume_mcap_ratio", ratio("volume_mcap_analysis")?))
}

pub fn risk_point(tags: &RecordTags, risk: &RiskAssessment) -> Result<LinePoint, ParseError> {
    let mut point = tags.point("risk_metrics");
    for name in RISK_SUB_SIGNALS {
        if let Some(entry) = risk.reasoning.get(name) {
            point = point.field(name, entry.signal.as_str());
        }
    }
    Ok(point.field("max_position", parse_usd(&format_usd(risk.max_position))?))
}

pub fn decision_point(tags: &RecordTags, decision: &Decision) -> Result<LinePoint, ParseError> {
    let reasoning = &decision.reasoning;
    Ok(tags
        .point("trading_decisions")
        .field("action", reasoning.final_decision.action.as_str())
        .field("position_size", parse_usd(&reasoning.final_decision.size)?)
        .field("entry_price", parse_usd(&reasoning.final_decision.price)?)
        .field(
            "weighted_score",
            parse_number(&reasoning.signal_analysis.weighted_score)?,
        )
        .field("risk_level", reasoning.risk_assessment.risk_level.as_str()))
}

/// All records of one evaluation, in write order.
pub fn evaluation_points(evaluation: &Evaluation) -> Result<Vec<LinePoint>, ParseError> {
    let tags = RecordTags::of(evaluation);
    let mut points = vec![market_data_point(&tags, &evaluation.summary)?];
    if let Some(valuation) = evaluation.reports.get(&SignalSource::Valuation) {
        points.push(valuation_point(&tags, valuation)?);
    }
    points.push(risk_point(&tags, &evaluation.risk)?);
    points.push(decision_point(&tags, &evaluation.decision)?);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::line::FieldValue;
    use crate::models::TxnCounts;
    use crate::pipeline::{run_pipeline, EvaluationRequest};
    use crate::signals::test_support::snapshot;
    use uuid::Uuid;

    async fn evaluation() -> Evaluation {
        let mut s = snapshot();
        s.price_usd = 0.00001234;
        s.liquidity_usd = 6_000_000.0;
        s.fdv = 12_000_000.0;
        s.volume.h24 = 1_200_000.0;
        s.price_change_pct.h24 = 3.0;
        s.price_change_pct.h6 = 1.0;
        s.txns.h24 = TxnCounts { buys: 1200, sells: 700 };

        let request = EvaluationRequest::new("0xtoken").on_chain("base");
        let output = run_pipeline(s.clone()).await.unwrap();
        Evaluation::new(Uuid::new_v4(), &request, s, output)
    }

    #[tokio::test]
    async fn test_market_data_reads_back_display_strings() {
        let evaluation = evaluation().await;
        let tags = RecordTags::of(&evaluation);
        let point = market_data_point(&tags, &evaluation.summary).unwrap();

        assert_eq!(point.field_value("price"), Some(&FieldValue::Float(0.00001234)));
        assert_eq!(
            point.field_value("liquidity"),
            Some(&FieldValue::Float(6_000_000.0))
        );
        assert_eq!(point.field_value("change_24h"), Some(&FieldValue::Float(3.0)));
        assert_eq!(point.field_value("buy_count"), Some(&FieldValue::Integer(1200)));
        assert_eq!(point.field_value("sell_count"), Some(&FieldValue::Integer(700)));
        assert_eq!(point.field_value("creation_date"), None);

        let line = point.to_line().unwrap();
        assert!(line.starts_with("market_data,token=0xtoken,chain=base,symbol=TEST,name=Test\\ Token "));
    }

    #[tokio::test]
    async fn test_market_data_includes_creation_date() {
        let mut evaluation = evaluation().await;
        evaluation.summary.creation_date = Some(1_700_000_000_000);
        let tags = RecordTags::of(&evaluation);
        let point = market_data_point(&tags, &evaluation.summary).unwrap();

        assert_eq!(
            point.field_value("creation_date"),
            Some(&FieldValue::Integer(1_700_000_000_000))
        );
        assert!(point.to_line().unwrap().contains("creation_date=1700000000000i"));
    }

    #[tokio::test]
    async fn test_valuation_ratios() {
        let evaluation = evaluation().await;
        let tags = RecordTags::of(&evaluation);
        let report = &evaluation.reports[&SignalSource::Valuation];
        let point = valuation_point(&tags, report).unwrap();

        assert_eq!(point.field_value("mcap_tvl_ratio"), Some(&FieldValue::Float(2.0)));
        assert_eq!(
            point.field_value("volume_mcap_ratio"),
            Some(&FieldValue::Float(0.1))
        );
    }

    #[tokio::test]
    async fn test_all_four_records() {
        let evaluation = evaluation().await;
        let points = evaluation_points(&evaluation).unwrap();

        let names: Vec<&str> = points.iter().map(|p| p.measurement.as_str()).collect();
        assert_eq!(
            names,
            vec!["market_data", "valuation_metrics", "risk_metrics", "trading_decisions"]
        );

        let risk = &points[2];
        assert_eq!(
            risk.field_value("max_position"),
            Some(&FieldValue::Float(evaluation.risk.max_position))
        );
        assert!(matches!(
            risk.field_value("liquidity_risk"),
            Some(FieldValue::Text(_))
        ));

        let decision = &points[3];
        assert_eq!(
            decision.field_value("action"),
            Some(&FieldValue::Text(evaluation.decision.action.as_str().to_string()))
        );
        assert!(points.iter().all(|p| p.to_line().is_some()));
    }
}
