use std::{path::PathBuf, sync::Arc};

use broadside::{
    init_logging, render, Announcer, Catalogs, CooldownPolicy, FileStore, FireOutcome, Format, LogNotifier,
    MatchConfig, Pairings, Referee, SideId,
};
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Match file naming the sides and their opponents.
    #[arg(long, default_value = "data/match.json")]
    config: PathBuf,
    #[arg(long, help = "Fix RNG seed for reproducible boards and events (e.g., --seed 12345)")]
    seed: Option<u64>,
    /// Run with referee privileges.
    #[arg(long)]
    referee: bool,
    #[arg(long, value_enum, default_value_t = StoreFormat::Json)]
    format: StoreFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StoreFormat {
    Json,
    Bincode,
}

impl From<StoreFormat> for Format {
    fn from(format: StoreFormat) -> Self {
        match format {
            StoreFormat::Json => Format::Json,
            StoreFormat::Bincode => Format::Bincode,
        }
    }
}

#[derive(Parser)]
enum Commands {
    /// Show your own board, or the placement preview while unlocked.
    Show { side: String },
    /// Show the opponent's board with ships hidden.
    Enemy { side: String },
    /// List ship types and their markers.
    Ships,
    /// Place a ship: `place <side> carrier h A1`.
    Place {
        side: String,
        ship: String,
        orientation: String,
        start: String,
    },
    /// Place every missing ship at random.
    AutoPlace { side: String },
    Remove { side: String, ship: String },
    Lock { side: String },
    Unlock { side: String },
    /// Check that every board is locked before battle.
    Ready,
    /// Fire at a coordinate on the opponent's board.
    Fire { side: String, coord: String },
    /// Start an event on every board, or only on `--side`.
    EventStart {
        kind: String,
        #[arg(long)]
        side: Option<String>,
    },
    /// Resolve an event: `complete` or `fail`.
    EventEnd {
        side: String,
        kind: String,
        outcome: String,
    },
    /// List events past their deadline.
    Overdue,
    /// Arm a skip token for the next shot.
    UseSkip { side: String },
    Skips { side: String },
    /// Details of the tile your last shot landed on.
    Task { side: String },
    History { side: String },
    Status { side: String },
    Progress,
    Summary,
}

impl Commands {
    fn privileged(&self) -> bool {
        matches!(
            self,
            Commands::Lock { .. }
                | Commands::Unlock { .. }
                | Commands::Ready
                | Commands::EventStart { .. }
                | Commands::EventEnd { .. }
                | Commands::Overdue
                | Commands::Status { .. }
                | Commands::Progress
                | Commands::Summary
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    if cli.command.privileged() && !cli.referee {
        return Err(anyhow::anyhow!("this command needs --referee"));
    }

    let config = MatchConfig::load(&cli.config)?;
    let pairings = Pairings::from_config(&config)?;
    let catalogs = Catalogs::load(&config.data_dir)?;
    let store = FileStore::new(&config.data_dir, cli.format.into());
    let mut referee = Referee::new(store, pairings, CooldownPolicy::from_config(&config), catalogs)?
        .with_announcer(Announcer::new(Arc::new(LogNotifier)));
    if let Some(s) = cli.seed {
        println!("Using fixed seed: {} (boards and events will be reproducible)", s);
        referee = referee.with_seed(s);
    }

    let result = run(&mut referee, cli.command);
    referee.announcer().flush().await;
    result
}

fn run(referee: &mut Referee<FileStore>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Show { side } => {
            let side = SideId::new(side);
            let board = referee.board(&side)?;
            let view = if board.is_locked() {
                referee.own_view(&side)
            } else {
                referee.setup_preview(&side)
            }?;
            println!("{view}");
        }
        Commands::Enemy { side } => {
            let view = referee.enemy_view(&SideId::new(side))?;
            println!("{view}");
        }
        Commands::Ships => println!("{}", render::ship_legend()),
        Commands::Place {
            side,
            ship,
            orientation,
            start,
        } => {
            let side = SideId::new(side);
            let run = referee.place_ship(&side, &ship, &orientation, &start)?;
            let run: Vec<String> = run.iter().map(ToString::to_string).collect();
            println!("✅ Placed {} at {}", ship.to_lowercase(), run.join(", "));
            println!("{}", referee.setup_preview(&side)?);
        }
        Commands::AutoPlace { side } => {
            let side = SideId::new(side);
            referee.place_remaining(&side)?;
            println!("{}", referee.setup_preview(&side)?);
        }
        Commands::Remove { side, ship } => {
            let side = SideId::new(side);
            referee.remove_ship(&side, &ship)?;
            println!("✅ Removed {}", ship.to_lowercase());
            println!("{}", referee.setup_preview(&side)?);
        }
        Commands::Lock { side } => {
            referee.lock(&SideId::new(side.as_str()))?;
            println!("✅ Board for {side} is now locked");
        }
        Commands::Unlock { side } => {
            referee.unlock(&SideId::new(side.as_str()))?;
            println!("✅ Board for {side} is now unlocked");
        }
        Commands::Ready => {
            let unlocked = referee.unlocked_sides()?;
            if unlocked.is_empty() {
                println!("🧭 Every board is locked. Let battle commence!");
            } else {
                let names: Vec<&str> = unlocked.iter().map(|s| referee.pairings().display(s)).collect();
                println!("⚠️ Still unlocked: {}", names.join(", "));
            }
        }
        Commands::Fire { side, coord } => {
            let side = SideId::new(side);
            let report = referee.fire(&side, &coord)?;
            match &report.outcome {
                FireOutcome::Hit {
                    ship,
                    sunk,
                    all_sunk,
                    task_name,
                    task_count,
                } => {
                    println!("🎯 HIT! You struck the enemy's {ship} at {}!", report.coordinate);
                    println!("> Task: {task_name} x{task_count}");
                    if *sunk {
                        println!("🔥 The {ship} is sunk!");
                    }
                    if *all_sunk {
                        println!("🏆 Every enemy ship is sunk!");
                    }
                }
                FireOutcome::Miss {
                    tile_name,
                    difficulty,
                    description,
                    task_count,
                } => {
                    println!(
                        "💨 Miss! {} is just a {tile_name} (Difficulty: {difficulty}, x{task_count}).",
                        report.coordinate
                    );
                    if !description.is_empty() {
                        println!("> {description}");
                    }
                }
            }
            if report.skip_consumed {
                println!("🪙 Skip spent, cooldown ignored for this shot.");
            }
            println!("{}", report.attacker_view);
        }
        Commands::EventStart { kind, side } => match side {
            Some(side) => {
                let coord = referee.start_event_for(&SideId::new(side.as_str()), &kind)?;
                println!("📣 {kind} struck {side} at {coord}");
            }
            None => {
                let results = referee.start_event(&kind)?;
                for (side, result) in results {
                    match result {
                        Ok(coord) => println!("📣 {kind} struck {side} at {coord}"),
                        Err(e) => println!("⚠️ {kind} could not strike {side}: {e}"),
                    }
                }
            }
        },
        Commands::EventEnd { side, kind, outcome } => {
            let resolution = referee.resolve_event(&SideId::new(side.as_str()), &kind, &outcome)?;
            println!("✅ {kind} on {side} resolved as {outcome} at {}", resolution.coordinate());
        }
        Commands::Overdue => {
            for event in referee.overdue_events()? {
                println!(
                    "⏳ {} on {} at {} expired {}",
                    event.kind, event.side, event.coordinate, event.expires_at
                );
            }
        }
        Commands::UseSkip { side } => {
            let balance = referee.use_skip(&SideId::new(side.as_str()))?;
            println!("✅ {side} armed a skip. Your next shot ignores the cooldown ({balance} token(s) held).");
        }
        Commands::Skips { side } => {
            let side = SideId::new(side);
            println!(
                "🪙 {} has {} skip token(s) remaining.",
                referee.pairings().display(&side),
                referee.skip_balance(&side)
            );
        }
        Commands::Task { side } => match referee.current_task(&SideId::new(side))? {
            Some(details) => println!("{details}"),
            None => println!("You have not made any shots yet."),
        },
        Commands::History { side } => {
            for record in referee.move_history(&SideId::new(side))? {
                let verdict = if record.hit { "hit" } else { "miss" };
                println!("{} {} {}: {verdict}", record.fired_at, record.target, record.coordinate);
            }
        }
        Commands::Status { side } => {
            let status = referee.board_status(&SideId::new(side.as_str()))?;
            println!("📊 {side} board status");
            println!("> 🔫 Total shots: {}", status.total);
            println!("> 🎯 Hits: {}", status.hits);
            println!("> 💨 Misses: {}", status.misses);
        }
        Commands::Progress => {
            let summary = referee.summary()?;
            println!("{}", summary.progress_report());
        }
        Commands::Summary => {
            let summary = referee.summary()?;
            println!("{summary}");
        }
    }
    Ok(())
}
