//! Emoji board renderings.

use crate::{
    board::Board,
    combat::Actor,
    config::ROW_LABELS,
    coord::Coordinate,
    ship::ShipKind,
    tile::Overlay,
};

const COLUMN_LABELS: [&str; 10] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];
const ROW_EMOJI: [&str; 10] = ["🇦", "🇧", "🇨", "🇩", "🇪", "🇫", "🇬", "🇭", "🇮", "🇯"];
const WATER: &str = "🟦";
const HIT: &str = "💥";
const MISS: &str = "⚫";
const CLEARED: &str = "✅";
const WRECK: &str = "☠️";

pub fn ship_emoji(kind: ShipKind) -> &'static str {
    match kind {
        ShipKind::Carrier => "🟪",
        ShipKind::Battleship => "🟥",
        ShipKind::Cruiser => "⬜",
        ShipKind::Submarine => "🟧",
        ShipKind::Destroyer => "⬛",
    }
}

fn grid(board: &Board, cell: impl Fn(Coordinate) -> String) -> String {
    let mut out = String::from("```\n🧭 ");
    out.push_str(&COLUMN_LABELS.join(" "));
    out.push('\n');
    for (row, label) in ROW_EMOJI.iter().enumerate().take(ROW_LABELS.len()) {
        out.push_str(label);
        for col in 0..COLUMN_LABELS.len() {
            out.push(' ');
            match Coordinate::new(row, col).filter(|c| board.tile(*c).is_some()) {
                Some(coord) => out.push_str(&cell(coord)),
                None => out.push_str(WATER),
            }
        }
        out.push('\n');
    }
    out.push_str("```");
    out
}

fn combat_cell(board: &Board, coord: Coordinate, reveal_ships: bool) -> String {
    let Some(tile) = board.tile(coord) else {
        return WATER.to_string();
    };
    if tile.is_wrecked() {
        return WRECK.to_string();
    }
    if let Some(shot) = board.shot(coord) {
        return match (shot.hit, &shot.fired_by) {
            (true, _) => HIT,
            (false, Actor::EventComplete) => CLEARED,
            (false, _) => MISS,
        }
        .to_string();
    }
    if let Overlay::Event(event) = &tile.overlay {
        return event.emoji.clone();
    }
    match tile.ship {
        Some(kind) if reveal_ships => ship_emoji(kind).to_string(),
        _ => WATER.to_string(),
    }
}

/// Opponent's view: shots and events, ships hidden.
pub fn attacker_view(board: &Board) -> String {
    grid(board, |coord| combat_cell(board, coord, false))
}

/// Owner's view: shots and events over revealed ships.
pub fn defender_view(board: &Board) -> String {
    grid(board, |coord| combat_cell(board, coord, true))
}

/// Placement view with the ships still to place listed underneath.
pub fn setup_preview(board: &Board, required: &[ShipKind]) -> String {
    let mut out = grid(board, |coord| match board.tile(coord).and_then(|t| t.ship) {
        Some(kind) => ship_emoji(kind).to_string(),
        None => WATER.to_string(),
    });
    let missing = board.missing_ships(required);
    if !board.is_locked() && !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|k| k.name()).collect();
        out.push_str(&format!("\nRemaining ships to place: **{}**", names.join(", ")));
    }
    out
}

/// Each ship kind drawn as a row of its emoji, with its length.
pub fn ship_legend() -> String {
    ShipKind::ALL
        .iter()
        .map(|kind| {
            format!(
                "{:<10} {} ({})",
                kind.name(),
                ship_emoji(*kind).repeat(kind.length()),
                kind.length()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
