use dexsignal::series::{MarketScenario, SyntheticSeries};
use dexsignal::strategy::{StrategyKind, StrategyReport, StrategySuite};
use dexsignal::Result;

const CANDLES: usize = 500;
const INTERVAL_MINUTES: i64 = 60;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("dexsignal=info")
        .init();

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║          STRATEGY TOOLKIT SCENARIO REPORT             ║");
    println!("╚═══════════════════════════════════════════════════════╝");

    let suite = StrategySuite::default();
    let mut reports = Vec::new();

    for scenario in MarketScenario::ALL {
        let candles = SyntheticSeries::new(42).generate(scenario, CANDLES, INTERVAL_MINUTES);
        match suite.run(&candles) {
            Ok(report) => reports.push((scenario.name(), report)),
            Err(e) => eprintln!("❌ {} failed: {}", scenario.name(), e),
        }
    }

    print_comparison(&reports);
    Ok(())
}

fn cell(report: &StrategyReport, kind: StrategyKind) -> String {
    match report.signals.get(&kind) {
        Some(s) => format!("{} {:.2}", s.signal, s.confidence),
        None => "-".to_string(),
    }
}

fn print_comparison(reports: &[(&str, StrategyReport)]) {
    let kinds = [
        StrategyKind::Trend,
        StrategyKind::MeanReversion,
        StrategyKind::Momentum,
        StrategyKind::Volatility,
        StrategyKind::StatArb,
    ];

    print!("\n{:<12}", "Scenario");
    for kind in kinds {
        print!(" {:>16}", kind.as_str());
    }
    println!(" {:>16}", "combined");
    println!("{}", "─".repeat(12 + 17 * 6));

    for (name, report) in reports {
        print!("{:<12}", name);
        for kind in kinds {
            print!(" {:>16}", cell(report, kind));
        }
        println!(
            " {:>16}",
            format!("{} {:.2}", report.combined.signal, report.combined.confidence)
        );
    }

    println!("\n═══════════════════════════════════════════════════════\n");
}
