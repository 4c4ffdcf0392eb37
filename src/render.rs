//! Text rendering of engine snapshots.

use nback_core::{GuessFeedback, Modality, SessionPhase, stimulus_letter};
use nback_engine::{GameSnapshot, SessionSummary};

/// Grid with the stimulus cell marked. Cells count row-major from 1.
pub fn grid(value: Option<u32>, size: u32) -> String {
    let size = size.max(1);
    let cell = value.map(|v| v.saturating_sub(1));
    let mut out = String::with_capacity((size * (size * 2 + 1)) as usize);
    for row in 0..size {
        for col in 0..size {
            let here = cell == Some(row * size + col);
            out.push(if here { '#' } else { '.' });
            if col + 1 < size {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out
}

fn feedback_word(feedback: GuessFeedback) -> Option<&'static str> {
    match feedback {
        GuessFeedback::None => None,
        GuessFeedback::Correct => Some("correct"),
        GuessFeedback::Incorrect => Some("wrong"),
    }
}

/// What changed between two snapshots worth printing, if anything.
pub fn describe_change(prev: Option<&GameSnapshot>, next: &GameSnapshot) -> Option<String> {
    let mut lines = Vec::new();

    if prev.map(|p| p.phase) != Some(next.phase) {
        lines.push(match next.phase {
            SessionPhase::Running => format!(
                "-- {:?} {}-back, {} events --",
                next.game_type, next.config.n_back, next.config.number_of_events
            ),
            SessionPhase::Finished => format!(
                "-- finished: score {} (best {}) --",
                next.score, next.high_score
            ),
            SessionPhase::Idle => "-- idle --".to_string(),
        });
    }

    for &modality in next.game_type.modalities() {
        let round = next.round(modality);
        let advanced = prev.map(|p| p.round(modality).index) != Some(round.index);
        if advanced && next.phase.is_running() {
            if let Some(value) = round.current_value {
                lines.push(match modality {
                    Modality::Visual => format!(
                        "[{}] visual\n{}",
                        round.index,
                        grid(Some(value), next.config.grid_size).trim_end()
                    ),
                    Modality::Audio => match stimulus_letter(value) {
                        Ok(letter) => format!("[{}] audio {letter}", round.index),
                        Err(_) => format!("[{}] audio ?", round.index),
                    },
                });
            }
        }

        let feedback = next.feedback(modality);
        if prev.map(|p| p.feedback(modality)) != Some(feedback) {
            if let Some(word) = feedback_word(feedback) {
                lines.push(format!(
                    "{} {word}  score {}",
                    modality.label(),
                    next.score
                ));
            }
        }
    }

    (!lines.is_empty()).then(|| lines.join("\n"))
}

pub fn describe_status(snap: &GameSnapshot) -> String {
    format!(
        "{:?} {:?} | n={} grid={} events={} interval={}ms | score {} best {} | event {}",
        snap.phase,
        snap.game_type,
        snap.config.n_back,
        snap.config.grid_size,
        snap.config.number_of_events,
        snap.config.event_interval_ms,
        snap.score,
        snap.high_score,
        snap.current_event_index,
    )
}

pub fn describe_summary(summary: &SessionSummary) -> String {
    let accuracy = summary
        .accuracy()
        .map(|a| format!("{:.0}%", a * 100.0))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "session: score {} | {} correct, {} wrong ({accuracy}) | tick {:.1}ms ±{:.1}",
        summary.score,
        summary.correct,
        summary.incorrect,
        summary.average_interval_ms,
        summary.jitter_ms,
    );
    if summary.new_high_score {
        line.push_str(" | new high score!");
    }
    line
}
