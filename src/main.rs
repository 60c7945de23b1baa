//! Vector Racer
//!
//! Terminal front end: sets up a race from flags (or a JSON race file), seats
//! human players at the keyboard in hot-seat order and lets the autopilot
//! drive the bots.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vector_racer::{
    VERSION,
    config::{DriverKind, MapChoice, PlayerSetup, RaceConfig, DEFAULT_OPEN_SIZE},
    game::{
        input::{Driver, LineDriver},
        planner::PlannerDriver,
        snapshot::RaceSnapshot,
        state::{PlayerId, RaceOutcome, RacePhase, RaceState},
        turn::{replay_race, run_race, DriverMap},
    },
};

#[derive(Parser, Debug)]
#[command(name = "vector-racer", version)]
#[command(about = "Turn-based vector racing on a grid")]
struct Cli {
    /// Human players sharing this terminal
    #[arg(long, default_value_t = 1)]
    humans: usize,
    /// Autopilot players, seated after the humans
    #[arg(long, default_value_t = 0)]
    bots: usize,
    /// Player name, in seating order (repeat the flag)
    #[arg(long = "name")]
    names: Vec<String>,
    /// Track: "canonical" or "open"
    #[arg(long, default_value = "canonical")]
    map: String,
    /// Width of an open map
    #[arg(long, default_value_t = DEFAULT_OPEN_SIZE.0)]
    width: u16,
    /// Height of an open map
    #[arg(long, default_value_t = DEFAULT_OPEN_SIZE.1)]
    height: u16,
    /// JSON start table: { "<map>": [[x, y], ...] }
    #[arg(long)]
    starts: Option<PathBuf>,
    /// JSON race file; replaces the roster and map flags
    #[arg(long)]
    config: Option<PathBuf>,
    /// End the race after this many rounds
    #[arg(long)]
    round_limit: Option<u32>,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
    /// Replay the recorded inputs and check the final state hash
    #[arg(long)]
    verify_replay: bool,
}

impl Cli {
    fn race_config(&self) -> Result<RaceConfig> {
        let mut config = match &self.config {
            Some(path) => RaceConfig::load(path)
                .with_context(|| format!("loading race file {}", path.display()))?,
            None => {
                let map = MapChoice::from_name(&self.map, self.width, self.height)?;
                let players = (0..self.humans + self.bots)
                    .map(|i| {
                        let human = i < self.humans;
                        let name = self.names.get(i).cloned().unwrap_or_else(|| {
                            if human {
                                format!("Player {}", i + 1)
                            } else {
                                format!("Bot {}", i + 1)
                            }
                        });
                        if human {
                            PlayerSetup::human(name)
                        } else {
                            PlayerSetup::bot(name)
                        }
                    })
                    .collect();
                RaceConfig { map, players, ..Default::default() }
            }
        };

        if self.starts.is_some() {
            config.start_table = self.starts.clone();
        }
        if self.round_limit.is_some() {
            config.rules.round_limit = self.round_limit;
        }
        Ok(config)
    }
}

/// Seat every player: one shared terminal for the humans, an autopilot each
/// for the bots.
fn build_drivers(config: &RaceConfig) -> Result<DriverMap<'static>> {
    let terminal = Rc::new(RefCell::new(LineDriver::new(io::stdin().lock(), io::stdout())));
    let mut drivers: DriverMap<'static> = BTreeMap::new();

    for (slot, setup) in config.players.iter().enumerate() {
        let id = PlayerId::from_slot(slot as u8)
            .with_context(|| format!("no player number for seat {}", slot + 1))?;
        let driver: Box<dyn Driver> = match setup.driver {
            DriverKind::Human => Box::new(Rc::clone(&terminal)),
            DriverKind::Bot => Box::new(PlannerDriver),
        };
        drivers.insert(id, driver);
    }

    Ok(drivers)
}

fn report(state: &RaceState) {
    println!("{}", RaceSnapshot::capture(state));
    match &state.phase {
        RacePhase::Ended(RaceOutcome::Winners(winners)) => {
            for id in winners {
                if let Some(player) = state.get_player(id) {
                    println!("Congratulations {}, you won in round {}!", player.name, state.round);
                }
            }
        }
        RacePhase::Ended(RaceOutcome::AllOut) => println!("Everybody is out. No winner."),
        RacePhase::Ended(RaceOutcome::RoundLimit) => {
            println!("Round limit reached after {} rounds. No winner.", state.round)
        }
        RacePhase::Aborted => println!("Race aborted."),
        RacePhase::Running => {}
    }
}

fn main() -> Result<()> {
    // Initialize logging; stdout belongs to the race itself
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let cli = Cli::parse();
    info!("Vector Racer v{}", VERSION);

    let config = cli.race_config()?;
    let mut state = config.build().context("invalid race setup")?;
    let initial = state.clone();

    let mut drivers = build_drivers(&config)?;
    let record = run_race(&mut state, &mut drivers, &config.rules);
    info!("Race finished after {} turns, {} events", record.turns, record.events.len());

    report(&state);
    let hash = state.compute_hash();
    println!("State hash: {}", hex::encode(hash));

    if cli.verify_replay {
        let (replayed, _) = replay_race(initial, &record.inputs, &config.rules);
        let replay_hash = replayed.compute_hash();
        if replay_hash != hash {
            bail!(
                "replay diverged: live {} vs replay {}",
                hex::encode(hash),
                hex::encode(replay_hash)
            );
        }
        println!("Replay verified.");
    }

    if cli.json {
        let snapshot = RaceSnapshot::capture(&state);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}
