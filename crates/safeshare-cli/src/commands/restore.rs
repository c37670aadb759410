use anyhow::{Context, Result};

use safeshare_core::anonymize::restore_table;
use safeshare_core::crypto::read_encrypted_mapping;

use crate::args::RestoreArgs;
use crate::commands::{
    load_config, load_table, require_password, selections_from_specs, spinner, write_table,
};

pub fn run(args: &RestoreArgs) -> Result<()> {
    let config = load_config()?;
    let password = require_password(args.password.as_deref())?;

    let pb = spinner("1/2", "Decrypting mapping...")?;
    let mapping = read_encrypted_mapping(&args.mapping, password)
        .with_context(|| format!("Failed to open mapping {}", args.mapping.display()))?;
    let table = load_table(&args.input, &config)?;
    let selections = selections_from_specs(&args.columns, &table)?;
    pb.finish_with_message(format!(
        "Decrypting mapping... ✓ {} values",
        mapping.len()
    ));

    let pb2 = spinner("2/2", "Restoring...")?;
    let restored = restore_table(&table, &selections, &mapping);
    write_table(&args.output, &restored)?;
    pb2.finish_with_message(format!("Restoring... ✓ {}", args.output.display()));

    eprintln!(
        "Warning: {} contains original personal data.",
        args.output.display()
    );
    Ok(())
}
