use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};

use evtpack::container::JsonRowSink;
use evtpack::restore::Restorer;
use evtpack::row::RowSink;
use evtpack::store::{discover_shards, read_shard};

pub fn run(input: PathBuf, output: Option<PathBuf>, container: &str) -> Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension("json"));
    let shards = discover_shards(&input)
        .with_context(|| format!("discovering shards under {}", input.display()))?;

    let mut restorer = Restorer::new();
    for shard in &shards {
        let table =
            read_shard(shard).with_context(|| format!("reading {}", shard.display()))?;
        restorer.add_shard(shard.display().to_string(), table)?;
    }
    info!(
        "merging {} shard(s), {} rows -> {}",
        restorer.shard_count(),
        restorer.total_rows(),
        output.display()
    );

    let slots = restorer.plan_layout()?.to_vec();
    for conflict in restorer.conflicts() {
        warn!(
            "field {} of shard {} dropped: kind {} conflicts with {}",
            conflict.field, conflict.shard, conflict.found, conflict.expected
        );
    }

    let mut sink = JsonRowSink::new(&output, container);
    sink.begin(&slots)?;
    for row in restorer.emit_rows()? {
        sink.write_row(&row?)?;
    }
    let rows = sink.rows_written();
    sink.finish()
        .with_context(|| format!("writing {}", output.display()))?;
    println!("{}: {} rows, {} fields", output.display(), rows, slots.len());
    Ok(())
}
