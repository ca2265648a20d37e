// Drives the compiled binary through a PTY so the real event loop and
// crossterm input handling run end to end.
//
// Requires a TTY; expectrl allocates a pseudo terminal. Unix-only and
// ignored by default. Run with:
// `cargo test --test pty_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};
use tempfile::TempDir;

#[test]
#[ignore]
fn starts_pauses_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let bin = assert_cmd::cargo::cargo_bin("tarix-wpm");
    let cmd = format!("{} --data-dir {} -s 15", bin.display(), dir.path().display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(300));

    // start, type a little, pause
    p.send(" ")?;
    p.send("abc")?;
    std::thread::sleep(Duration::from_millis(200));
    p.send("\x1b")?; // ESC pauses
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x03")?; // Ctrl+C
    p.expect(Eof)?;

    // the -s override was persisted
    let saved = std::fs::read_to_string(dir.path().join("wpmSettings.json"))?;
    assert!(saved.contains("\"testTime\":15"));
    Ok(())
}
