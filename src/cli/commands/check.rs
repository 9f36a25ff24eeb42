//! Collaborator availability check.

use console::style;

use crate::config::Settings;
use crate::server::AppState;

/// Report which recognition collaborators can be used.
pub fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;

    let checks = [
        (
            "vision",
            state.text_detector.is_available(),
            state.text_detector.availability_hint(),
        ),
        (
            "language",
            state.entity_analyzer.is_available(),
            state.entity_analyzer.availability_hint(),
        ),
        (
            "speech",
            state.speech.is_available(),
            state.speech.availability_hint(),
        ),
        (
            "ffmpeg",
            state.transcoder.is_available(),
            state.transcoder.availability_hint(),
        ),
    ];

    let mut missing = 0;
    for (name, available, hint) in checks {
        if available {
            println!("  {} {:<9} {}", style("✓").green(), name, hint);
        } else {
            missing += 1;
            println!("  {} {:<9} {}", style("✗").red(), name, hint);
        }
    }

    if missing == 0 {
        println!("{} All services available", style("✓").green());
    } else {
        println!("{} {} service(s) unavailable", style("!").yellow(), missing);
    }
    Ok(())
}
