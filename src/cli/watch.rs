// Live display loop for the `watch` command

use anyhow::Result;
use rusqlite::Connection;
use std::thread;
use std::time::Duration;

use crate::cli::output::render_display;
use crate::models::ViewMode;
use crate::repo::SnapshotRepo;
use crate::utils::date::now_ms;

/// Clear the screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Redraw the display every `interval_secs` seconds until interrupted.
///
/// The snapshot is reloaded on every tick, so edits made from another
/// terminal show up on the next refresh.
pub fn run_watch(conn: &Connection, interval_secs: u64, view: Option<ViewMode>) -> Result<()> {
    let interval = interval_secs.max(1);
    loop {
        let rotation = SnapshotRepo::load(conn)?;
        let chosen = view.unwrap_or(rotation.view);
        print!("{}", CLEAR_SCREEN);
        print!("{}", render_display(&rotation, now_ms(), chosen));
        println!("Refreshing every {}s (Ctrl-C to stop).", interval);
        thread::sleep(Duration::from_secs(interval));
    }
}
