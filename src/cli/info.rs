use std::path::PathBuf;

use anyhow::{Context, Result};

use evtpack::schema::FieldShape;
use evtpack::store::read_shard;

pub fn run(file: PathBuf) -> Result<()> {
    let table =
        read_shard(&file).with_context(|| format!("reading {}", file.display()))?;

    println!("{}", file.display());
    println!("  rows:    {}", table.num_rows());
    println!("  columns: {}", table.fields().len());
    for field in table.fields() {
        let shape = match &field.shape {
            FieldShape::Scalar => String::new(),
            FieldShape::FixedArray { width } => format!("  [{width}]"),
            FieldShape::VariableArray {
                size_field: Some(size_field),
            } => format!("  [{size_field}]"),
            FieldShape::VariableArray { size_field: None } => "  [list]".to_string(),
        };
        println!("    {:24} {}{}", field.name, field.kind, shape);
    }
    Ok(())
}
