//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `goalboard_core` linkage without a rendering host.
//! - Drive a short scripted board session and print the render output as
//!   JSON, standing in for the measurement and drag hosts.

use goalboard_core::{
    default_log_level, init_logging, BoardConfig, BoardSession, CardEdit, CardId, DropTarget,
    Measurements, Rect,
};
use std::process::ExitCode;

const CARD_WIDTH: f64 = 288.0;
const CARD_HEIGHT: f64 = 120.0;
const COLUMN_GAP: f64 = 32.0;
const ROW_GAP: f64 = 16.0;
const LOG_DIR_ENV: &str = "GOALBOARD_LOG_DIR";

fn main() -> ExitCode {
    println!("goalboard_core ping={}", goalboard_core::ping());
    println!("goalboard_core version={}", goalboard_core::core_version());

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("goalboard: logging disabled: {err}");
        }
    }

    let config = match std::env::args().nth(1) {
        Some(path) => match BoardConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("goalboard: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => BoardConfig::default(),
    };

    let mut session = BoardSession::with_sample_card(config);
    let sample = CardId::new("1");
    let second = session.add_card();
    session.edit_card(&second, &CardEdit::title("Second Goal"));
    let child = session.add_sub_card(&sample);
    if let Some(child) = &child {
        session.add_sub_card(child);
    }
    session.add_sub_card(&second);

    let outcome = if session.drag_start(1, 0) {
        session.drag_end(Some(DropTarget::new(1, 1)))
    } else {
        session.drag_end(None)
    };
    println!("drag outcome: {outcome:?}");

    let ticket = session.mark_dirty();
    let measurements = grid_measurements(&session);
    session.recompute_geometry(ticket, &measurements);

    match serde_json::to_string_pretty(&session.render()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("goalboard: failed to serialize board: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Fakes a layout pass: every column is a vertical stack of fixed-size cards.
fn grid_measurements(session: &BoardSession) -> Measurements {
    let mut measurements = Measurements::new(Rect::new(0.0, 0.0, 1600.0, 900.0));
    for column in session.columns() {
        let x = COLUMN_GAP + column.index as f64 * (CARD_WIDTH + COLUMN_GAP);
        for (row, card) in column.cards.into_iter().enumerate() {
            let y = ROW_GAP + row as f64 * (CARD_HEIGHT + ROW_GAP);
            measurements
                .cards
                .insert(card.id, Rect::new(x, y, CARD_WIDTH, CARD_HEIGHT));
        }
    }
    measurements
}
