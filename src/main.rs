#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use gnw::{
    init_logging,
    sim::{self, SimConfig},
    Catalogue, LatLng, Wind,
};

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Fight an AI-versus-AI battle on an in-memory store and print a summary.
    Simulate {
        #[arg(long, help = "Fix RNG seed for reproducible battles (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 10)]
        turns: u32,
        #[arg(long, default_value = "Trireme")]
        ship_type: String,
        #[arg(long, default_value_t = 3, help = "Ships per side")]
        ships: usize,
        #[arg(long, default_value_t = sim::DEFAULT_SITE.lat, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, default_value_t = sim::DEFAULT_SITE.lng, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long, help = "Write the final store contents to this JSON file")]
        save: Option<std::path::PathBuf>,
    },
    /// Print the ship catalogue.
    Catalogue,
    /// Roll weather for a new battle.
    Weather {
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            seed,
            turns,
            ship_type,
            ships,
            lat,
            lng,
            save,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            log::info!("simulating with seed {}", seed);
            let config = SimConfig {
                seed,
                turns,
                ship_type,
                ships,
                site: LatLng::new(lat, lng),
                ..SimConfig::default()
            };
            let outcome = sim::run(&config).await?;
            if let Some(path) = save {
                let file = std::fs::File::create(&path)?;
                serde_json::to_writer_pretty(file, &outcome.store.snapshot()?)?;
                log::info!("store saved to {}", path.display());
            }
            println!("{}", serde_json::to_string(&outcome.summary)?);
        }
        Commands::Catalogue => {
            let rows: Vec<_> = Catalogue::standard()
                .iter()
                .map(|t| {
                    json!({
                        "type": t.name(),
                        "era": t.era,
                        "decks": t.decks,
                        "hull": t.hull,
                        "oars": t.oars,
                        "crew": {"sailors": t.crew.sailors, "archers": t.crew.archers, "marines": t.crew.marines},
                        "speed": {"slow": t.speed.slow, "cruise": t.speed.cruise, "full": t.speed.full},
                        "turnDelay": {"slow": t.turn_delay.slow, "cruise": t.turn_delay.cruise, "full": t.turn_delay.full},
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Weather { seed } => {
            let mut rng = match seed {
                Some(s) => SmallRng::seed_from_u64(s),
                None => SmallRng::from_rng(&mut rand::rng()),
            };
            let wind = Wind::random(&mut rng);
            println!("{}", json!({"wind": wind, "description": wind.describe()}));
        }
    }
    Ok(())
}
