use anyhow::{Result, bail};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::cli::Config;
use crate::sink::{self, Destination};
use crate::source;

/// Lines allowed in flight between reader and writer; tokio's minimum, so the
/// reader never gets more than one line ahead.
const QUEUE_CAPACITY: usize = 1;

/// Pipeline runtime: wires the line source to exactly one sink and waits for
/// the sink to finish.
pub async fn run(config: Config) -> Result<()> {
    let destination = Destination::select(config.output.as_deref());
    debug!(
        input = %config.input.display(),
        format = %config.format,
        destination = %destination,
        "starting"
    );

    // Channel for log lines; closed when the source task drops its sender
    let (tx, rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
    let (done_tx, done_rx) = oneshot::channel();

    // Spawn log reader and the selected sink
    tokio::spawn(source::run(config.input.clone(), tx));
    tokio::spawn(sink::run(destination, config.format, rx, done_tx));
    debug!("running");

    let completion = match done_rx.await {
        Ok(completion) => completion,
        Err(_) => bail!("output task ended without signalling completion"),
    };
    debug!(lines = completion.lines, ok = completion.ok, "done");

    if !completion.ok {
        bail!("output incomplete after {} lines", completion.lines);
    }
    info!(lines = completion.lines, "log streamed");
    Ok(())
}
