use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use stealth_tracker::{
    config::TrackerConfig,
    engine::Engine,
    projection::ProjectionUpdate,
    protocol::{parse_incoming_message, IncomingMessage},
};
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let (config, config_path) = TrackerConfig::load_or_create()?;
    info!(path = %config_path.display(), "loaded tracker config");
    let engine = Engine::from_config(&config)?;
    let updates = engine.subscribe();

    let source = std::env::args_os().nth(1).map(PathBuf::from);
    let (tx, rx) = crossbeam_channel::unbounded::<IncomingMessage>();
    let reader = spawn_reader(source, tx);

    let mut stdout = io::stdout().lock();
    let mut handled = 0u64;
    let mut malformed = 0u64;
    for message in rx {
        match engine.handle_message(&message) {
            Ok(true) => handled += 1,
            Ok(false) => {}
            Err(_) => malformed += 1,
        }
        emit_updates(&updates, &mut stdout)?;
    }

    reader
        .join()
        .map_err(|_| anyhow!("telemetry reader thread panicked"))??;

    let (kills, ended) = engine.with_state(|state| (state.stats.kills.total, state.ended));
    info!(handled, malformed, kills, ended, "telemetry stream finished");
    Ok(())
}

fn emit_updates(updates: &Receiver<ProjectionUpdate>, out: &mut impl Write) -> Result<()> {
    for update in updates.try_iter() {
        let line = serde_json::to_string(&update).context("failed serializing projection update")?;
        writeln!(out, "{line}").context("failed writing projection update")?;
    }
    out.flush().context("failed flushing stdout")
}

fn spawn_reader(source: Option<PathBuf>, tx: Sender<IncomingMessage>) -> JoinHandle<Result<()>> {
    thread::spawn(move || {
        let input: Box<dyn BufRead> = match &source {
            Some(path) if path.as_os_str() != "-" => {
                let file = File::open(path)
                    .with_context(|| format!("failed opening {}", path.display()))?;
                Box::new(BufReader::new(file))
            }
            _ => Box::new(BufReader::new(io::stdin())),
        };

        for (index, line) in input.lines().enumerate() {
            let line = line.context("failed reading telemetry input")?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            match parse_incoming_message(text) {
                Ok(message) => {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(?err, line = index + 1, "skipping unrecognized input line"),
            }
        }
        Ok(())
    })
}
