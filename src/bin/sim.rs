use gnw::sim::{self, SimConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed> <turns>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let turns: u32 = args[2].parse()?;

    let config = SimConfig {
        seed,
        turns,
        ..SimConfig::default()
    };
    let outcome = sim::run(&config).await?;
    let summary = &outcome.summary;

    let result = json!({
        "battle": summary.battle,
        "turn": summary.turn,
        "awaiting": summary.awaiting,
        "wind": summary.wind,
        "side1": summary.sides.first(),
        "side2": summary.sides.get(1),
        "winner": summary.winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
