//! Line-oriented stdin front end that feeds the overlay loop

use kagami_types::{AppEvent, Command, Point};
use kanal::AsyncSender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

const HELP: &str = "commands: translate|t cancel|x select|c select-speaker|s clear-speaker polygon \
append|a clear|d edit-main|f10 edit-speaker|f11 capture-mode|f5 hide-on-capture|f6 \
main-frame|f8 speaker-frame|f9 font-|font+ area-|area+ quit; \
pointer: move X Y, press X Y, release X Y, drag X1 Y1 X2 Y2; persona SPEAKER|TONE";

fn point(args: &[&str]) -> Result<Point, String> {
    match args {
        [x, y] => {
            let x = x.parse().map_err(|_| format!("bad x: {x}"))?;
            let y = y.parse().map_err(|_| format!("bad y: {y}"))?;
            Ok(Point::new(x, y))
        }
        _ => Err("expected X Y".to_string()),
    }
}

/// Translate one console line into overlay events
pub fn parse_line(line: &str) -> Result<Vec<AppEvent>, String> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Vec::new());
    };
    let args: Vec<&str> = words.collect();

    let events = match head.to_ascii_lowercase().as_str() {
        "move" => vec![AppEvent::PointerMoved(point(&args)?)],
        "press" => vec![AppEvent::PointerPressed(point(&args)?)],
        "release" => vec![AppEvent::PointerReleased(point(&args)?)],
        "drag" => {
            if args.len() != 4 {
                return Err("expected X1 Y1 X2 Y2".to_string());
            }
            let from = point(&args[..2])?;
            let to = point(&args[2..])?;
            vec![
                AppEvent::PointerMoved(from),
                AppEvent::PointerPressed(from),
                AppEvent::PointerMoved(to),
                AppEvent::PointerReleased(to),
            ]
        }
        "persona" => {
            let rest = line[head.len()..].trim();
            let (speaker, tone) = rest.split_once('|').unwrap_or((rest, ""));
            vec![AppEvent::SetPersona {
                tone: tone.trim().to_string(),
                speaker: speaker.trim().to_string(),
            }]
        }
        "help" | "?" => return Err(HELP.to_string()),
        name => {
            let command = Command::from_name(name).ok_or_else(|| format!("unknown command `{name}`"))?;
            // A console command is a full key press
            vec![
                AppEvent::CommandSample { command, down: true },
                AppEvent::CommandSample { command, down: false },
            ]
        }
    };
    Ok(events)
}

pub async fn console_io(event_tx: AsyncSender<AppEvent>, cancel: CancellationToken) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("[CONSOLE] Ready, type `help` for commands");

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::info!("[CONSOLE] stdin closed");
            break;
        };
        match parse_line(&line) {
            Ok(events) => {
                for event in events {
                    event_tx.send(event).await?;
                }
            }
            Err(msg) => tracing::warn!("[CONSOLE] {}", msg),
        }
    }

    tracing::info!("[CONSOLE] stopping");
    Ok(())
}
