//! The interactive terminal loop shared by `lucy chat` and `lucy assist`.

use lucy_agent::CompanionAgent;
use lucy_core::face::{FaceNotifier, FaceState};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Words that end the conversation.
pub const EXIT_WORDS: [&str; 4] = ["exit", "quit", "bye", "goodbye"];

pub struct SessionOptions {
    /// Stop after this many processed turns.
    pub max_turns: Option<usize>,
    /// Speak up unprompted after long silences.
    pub idle_checks: bool,
    /// How often silence is checked.
    pub idle_poll: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_turns: None,
            idle_checks: true,
            idle_poll: Duration::from_secs(5),
        }
    }
}

/// How the conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// An exit word; a farewell is due.
    Goodbye,
    /// Turn budget reached or input closed.
    Finished,
    /// Ctrl+C.
    Interrupted,
}

/// Print what Lucy says; the face talks for the duration.
pub async fn speak(face: &dyn FaceNotifier, text: &str) {
    face.set(FaceState::TALKING).await;
    println!("Lucy: {text}\n");
    face.set(FaceState::IDLE).await;
}

fn prompt() -> std::io::Result<()> {
    print!("You: ");
    std::io::stdout().flush()
}

async fn maybe_speak_up(lucy: &mut CompanionAgent, face: &dyn FaceNotifier) -> bool {
    if !lucy.should_speak_up() {
        return false;
    }
    let thought = lucy.idle_thought();
    println!();
    speak(face, thought).await;
    lucy.touch();
    true
}

/// Read lines from `input` and answer them until an exit word, the turn
/// budget, end of input, or Ctrl+C.
pub async fn converse<R>(
    lucy: &mut CompanionAgent,
    face: &dyn FaceNotifier,
    input: R,
    options: &SessionOptions,
) -> std::io::Result<SessionEnd>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut idle_tick = tokio::time::interval_at(
        tokio::time::Instant::now() + options.idle_poll,
        options.idle_poll,
    );
    let mut turns = 0;
    let mut needs_prompt = true;

    loop {
        if options.max_turns.is_some_and(|max| turns >= max) {
            return Ok(SessionEnd::Finished);
        }

        if needs_prompt {
            face.set(FaceState::LISTENING).await;
            prompt()?;
            needs_prompt = false;
        }

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(SessionEnd::Finished);
                };
                needs_prompt = true;

                let utterance = line.trim();
                if utterance.is_empty() {
                    continue;
                }
                face.set(FaceState::IDLE).await;

                let lowered = utterance.to_lowercase();
                if EXIT_WORDS.contains(&lowered.as_str()) {
                    return Ok(SessionEnd::Goodbye);
                }
                match lowered.as_str() {
                    "memory" => {
                        println!("\n[Lucy's Memory]");
                        println!("  Facts: {}", lucy.facts().summary());
                        println!("  Conversation: {} messages\n", lucy.window().log().len());
                        continue;
                    }
                    "idle" => {
                        let thought = lucy.idle_thought();
                        speak(face, thought).await;
                        continue;
                    }
                    _ => {}
                }

                let reply = lucy.process_message(utterance).await;
                speak(face, &reply).await;
                turns += 1;

                if options.idle_checks {
                    maybe_speak_up(lucy, face).await;
                }
            }

            _ = idle_tick.tick(), if options.idle_checks => {
                if maybe_speak_up(lucy, face).await {
                    needs_prompt = true;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                println!("\n\nEnding conversation...");
                return Ok(SessionEnd::Interrupted);
            }
        }
    }
}
