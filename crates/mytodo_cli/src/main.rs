//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mytodo_core` linkage.
//! - Replay a scripted in-memory session and print the rendered rows.
//!
//! Usage: `mytodo_cli [add:<text>|toggle:<pos>|delete:<pos>]...`

use mytodo_core::{TodoRow, TodoScreen, TodoService};

fn main() {
    println!("mytodo_core ping={}", mytodo_core::ping());
    println!("mytodo_core version={}", mytodo_core::core_version());

    let mut screen = TodoScreen::open(TodoService::in_memory());
    for step in std::env::args().skip(1) {
        if let Err(message) = apply_step(&mut screen, &step) {
            eprintln!("skip `{step}`: {message}");
        }
    }
    for row in screen.rows() {
        println!("{}", format_row(&row));
    }
}

fn apply_step(screen: &mut TodoScreen, step: &str) -> Result<(), String> {
    let (command, argument) = step.split_once(':').unwrap_or((step, ""));
    match command {
        "add" => {
            screen.set_input(argument);
            screen.click_add().map(|_| ()).map_err(|err| err.to_string())
        }
        "toggle" => click(argument, |position| screen.click_row(position)),
        "delete" => click(argument, |position| screen.click_delete(position)),
        other => Err(format!("unknown command `{other}`")),
    }
}

fn click(argument: &str, mut tap: impl FnMut(usize) -> bool) -> Result<(), String> {
    let position = argument
        .parse::<usize>()
        .map_err(|err| format!("invalid position: {err}"))?;
    if tap(position) {
        Ok(())
    } else {
        Err(format!("no row at position {position}"))
    }
}

fn format_row(row: &TodoRow) -> String {
    let mark = if row.is_done { 'x' } else { ' ' };
    format!("{:>3} [{mark}] {}", row.position, row.text)
}
