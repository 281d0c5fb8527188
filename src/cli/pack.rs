use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;

use evtpack::builder::TableBuilder;
use evtpack::container::JsonRowSource;
use evtpack::row::RowSource;
use evtpack::store::{write_table, StoreConfig};

pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    container: &str,
    fields: Option<Vec<String>>,
    compression_level: i32,
    row_group_size: usize,
) -> Result<()> {
    let output = output.unwrap_or_else(|| input.with_extension("parquet"));
    info!("packing {} -> {}", input.display(), output.display());

    let mut source = JsonRowSource::open(&input, container)
        .with_context(|| format!("opening {}", input.display()))?;
    if let Some(fields) = fields {
        source.select_fields(&fields);
    }
    if source.schema().is_empty() {
        bail!("no convertible fields in container {container:?}");
    }

    let mut builder = TableBuilder::new(source.schema());
    while let Some(row) = source.next_row()? {
        builder.observe(&row)?;
    }
    info!(
        "converted {} rows across {} fields",
        builder.rows(),
        builder.fields().len()
    );
    let table = builder.finalize()?;

    let config = StoreConfig {
        compression_level,
        row_group_size,
    };
    write_table(&output, &table, &config)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{}: {} rows, {} columns",
        output.display(),
        table.num_rows(),
        table.fields().len()
    );
    Ok(())
}
