use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use tokio::{select, time};

use crate::color::{self, MaybePaint};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Drives `task` to completion while animating `message` on standard error.
/// The spinner line is erased before the output is returned. When `enabled`
/// is false, `task` is simply awaited.
pub(crate) async fn with_spinner<F: Future>(message: &str, enabled: bool, task: F) -> F::Output {
    if !enabled {
        return task.await;
    }

    tokio::pin!(task);

    let mut ticker = time::interval(FRAME_INTERVAL);
    let mut stderr = io::stderr();
    let mut frame = 0;

    let output = loop {
        select! {
            output = &mut task => break output,
            _ = ticker.tick() => {
                let spinner = color::PERSONA_PROMPT.maybe_paint(FRAMES[frame % FRAMES.len()]);

                // Write errors are ignored, the spinner is cosmetic
                let _ = write!(stderr, "\r{} {}", spinner, message);
                let _ = stderr.flush();

                frame += 1;
            }
        }
    };

    let _ = write!(stderr, "\r\x1b[2K");
    let _ = stderr.flush();

    output
}
