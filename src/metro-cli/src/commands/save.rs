//! Save file command handlers

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use metro::container::{self, SaveContainer};
use metro::{parse_money_input, SaveDocument};

/// Read a save file and decode the document out of it.
///
/// Returns the parsed container, the decoded document, and the raw file
/// bytes (kept around for the backup).
fn load_save(input: &Path) -> Result<(SaveContainer, SaveDocument, Vec<u8>)> {
    let raw = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let container =
        SaveContainer::parse(&raw).context("Failed to parse save container")?;
    let json = container
        .decompress_blob()
        .context("Failed to decompress save data")?;
    let doc = SaveDocument::from_json(&json).context("Failed to parse save JSON")?;
    Ok((container, doc, raw))
}

fn fmt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "not present".to_string(), |v| v.to_string())
}

/// Handle `metro show`
pub fn show(input: &Path) -> Result<()> {
    let (_, doc, _) = load_save(input)?;

    println!("metadata.money: {}", fmt_money(doc.metadata_money()));
    println!("data.money:     {}", fmt_money(doc.data_money()));
    println!("last balance:   {}", fmt_money(doc.last_balance()));

    Ok(())
}

/// Handle `metro set`
///
/// Full edit pipeline: parse and decode the save, back up the original
/// bytes once, apply the new value, then recompress and patch the header.
/// Nothing is written to `output` unless every step succeeds.
pub fn set(
    value: Option<&str>,
    input: &Path,
    output: &Path,
    backup: Option<&Path>,
) -> Result<()> {
    let (mut container, mut doc, raw) = load_save(input)?;

    if let Some(backup_path) = backup {
        if metro::write_backup_once(backup_path, &raw).context("Failed to write backup")? {
            eprintln!("Backup created: {}", backup_path.display());
        } else {
            eprintln!(
                "Backup already exists: {} (leaving as-is)",
                backup_path.display()
            );
        }
    }

    let new_money = match value {
        Some(s) => {
            parse_money_input(s).with_context(|| format!("Invalid money value '{}'", s))?
        }
        None => prompt_money(&doc)?,
    };

    doc.set_money(new_money)
        .context("Failed to update money fields")?;

    let json = doc.to_json().context("Failed to serialize save JSON")?;
    let blob = container::compress(&json, container::DEFAULT_LEVEL)
        .context("Failed to compress save data")?;
    container.replace_blob(blob);

    fs::write(output, container.to_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote: {}", output.display());
    Ok(())
}

/// Show the detected values, then read replacement values from stdin until
/// one parses.
fn prompt_money(doc: &SaveDocument) -> Result<f64> {
    println!("Detected values:");
    println!("  metadata.money: {}", fmt_money(doc.metadata_money()));
    println!("  data.money:     {}", fmt_money(doc.data_money()));
    println!("  last balance:   {}", fmt_money(doc.last_balance()));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("\nEnter new money value: ");
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read stdin")?;
        if read == 0 {
            bail!("stdin closed before a value was entered");
        }

        match parse_money_input(&line) {
            Ok(v) => return Ok(v),
            Err(e) => eprintln!("{} (e.g. 12345 or 12345.67)", e),
        }
    }
}

/// Handle `metro unpack`
pub fn unpack(input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    let raw = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let container =
        SaveContainer::parse(&raw).context("Failed to parse save container")?;
    let json = container
        .decompress_blob()
        .context("Failed to decompress save data")?;

    if pretty {
        let value: serde_json::Value =
            serde_json::from_slice(&json).context("Failed to parse save JSON")?;
        let mut text =
            serde_json::to_vec_pretty(&value).context("Failed to format save JSON")?;
        text.push(b'\n');
        crate::file_io::write_output(output, &text)
    } else {
        crate::file_io::write_output(output, &json)
    }
}

/// Handle `metro pack`
pub fn pack(container_path: &Path, json_input: Option<&Path>, output: &Path) -> Result<()> {
    let raw = fs::read(container_path)
        .with_context(|| format!("Failed to read {}", container_path.display()))?;
    let mut container =
        SaveContainer::parse(&raw).context("Failed to parse save container")?;

    let json = crate::file_io::read_input(json_input)?;
    // run the input through the document layer so malformed JSON is caught
    // here and the stored blob is in canonical compact form
    let doc = SaveDocument::from_json(&json).context("Failed to parse JSON input")?;
    let encoded = doc.to_json().context("Failed to serialize JSON input")?;

    let blob = container::compress(&encoded, container::DEFAULT_LEVEL)
        .context("Failed to compress save data")?;
    container.replace_blob(blob);

    fs::write(output, container.to_bytes())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote: {}", output.display());
    Ok(())
}
