use std::sync::Arc;

use broadside::{
    Announcer, BoardStore, Catalogs, ChannelNotifier, Coordinate, CooldownPolicy, EventOutcome, FireOutcome,
    ManualClock, MatchConfig, MemoryStore, Pairings, Referee, SideId,
};
use chrono::{TimeDelta, Utc};
use rand::{rngs::SmallRng, seq::IndexedRandom, Rng, SeedableRng};
use serde_json::json;

const MAX_SHOTS: usize = 400;
const EVENT_EVERY: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <seed> [data_dir]", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let data_dir = args.get(2).map(String::as_str).unwrap_or("data");

    let config = MatchConfig::pair(("east", "East Fleet"), ("west", "West Fleet"));
    let pairings = Pairings::from_config(&config)?;
    let catalogs = Catalogs::load(data_dir)?;
    let event_kind = catalogs.events.kinds().next().cloned();
    let clock = ManualClock::new(Utc::now());
    let (notifier, mut announcements) = ChannelNotifier::channel();

    let mut referee = Referee::new(MemoryStore::new(), pairings, CooldownPolicy::from_config(&config), catalogs)?
        .with_clock(clock.clone())
        .with_seed(seed)
        .with_announcer(Announcer::new(Arc::new(notifier)));
    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(1));

    let sides = [SideId::new("east"), SideId::new("west")];
    for side in &sides {
        referee.place_remaining(side)?;
        referee.lock(side)?;
    }

    let mut winner = None;
    let mut shots = 0;
    let mut events = 0;
    'battle: while shots < MAX_SHOTS {
        for side in &sides {
            let opponent = referee
                .pairings()
                .opponent(side)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{side} has no opponent"))?;
            let board = referee
                .store()
                .get(&opponent)?
                .ok_or_else(|| anyhow::anyhow!("no board for {opponent}"))?;
            let open: Vec<Coordinate> = Coordinate::all()
                .filter(|c| board.shot(*c).is_none() && board.tile(*c).is_some_and(|t| !t.is_wrecked()))
                .collect();
            let Some(target) = open.choose(&mut rng) else {
                break 'battle;
            };
            let report = referee.fire(side, &target.to_string())?;
            shots += 1;
            if let FireOutcome::Hit { all_sunk: true, .. } = report.outcome {
                winner = Some(side.clone());
                break 'battle;
            }
            clock.advance(referee.limiter().policy().cooldown);
        }

        if let Some(kind) = &event_kind {
            if shots % EVENT_EVERY == 0 {
                let started = referee.start_event(kind.as_str())?;
                for (side, result) in started {
                    if result.is_ok() {
                        let outcome = if rng.random() {
                            EventOutcome::Complete
                        } else {
                            EventOutcome::Fail
                        };
                        referee.resolve_event(&side, kind.as_str(), &outcome.to_string())?;
                        events += 1;
                    }
                }
                clock.advance(TimeDelta::hours(1));

                // a failed event can finish off a fleet
                let boards = referee.boards()?;
                for side in &sides {
                    let beaten = referee
                        .pairings()
                        .opponent(side)
                        .and_then(|opponent| boards.get(opponent))
                        .is_some_and(|board| board.all_sunk());
                    if beaten {
                        winner = Some(side.clone());
                        break 'battle;
                    }
                }
            }
        }
    }

    referee.announcer().flush().await;
    let mut announced = 0;
    while announcements.try_recv().is_ok() {
        announced += 1;
    }

    let summary = referee.summary()?;
    let result = json!({
        "seed": seed,
        "shots": shots,
        "events": events,
        "announcements": announced,
        "winner": winner,
        "summary": summary,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
