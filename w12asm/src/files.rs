use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{assemble, Severity};

pub const SOURCE_EXTENSION: &str = "as";
pub const EXPANDED_EXTENSION: &str = "am";
pub const OBJECT_EXTENSION: &str = "ob";
pub const ENTRIES_EXTENSION: &str = "ent";
pub const EXTERNALS_EXTENSION: &str = "ext";
pub const DEBUG_EXTENSION: &str = "sdb";

#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Also write source level debug info.
    pub debug: bool,
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            Err(e).with_context(|| format!("Couldn't remove {}", path.display()))
        }
        _ => Ok(()),
    }
}

fn write_or_remove(base: &Path, extension: &str, contents: Option<String>) -> Result<()> {
    let path = with_extension(base, extension);
    match contents {
        Some(contents) => fs::write(&path, contents)
            .with_context(|| format!("Couldn't write {}", path.display())),
        None => remove_if_exists(&path),
    }
}

/// Assembles `<base>.as` and writes the output files next to it.
///
/// Returns whether the source assembled cleanly. On failure every output file
/// for `base` is removed.
///
/// # Errors
///
/// If the source can't be read or an output file can't be written
pub fn assemble_file(base: &Path, config: &Config) -> Result<bool> {
    let source_path = with_extension(base, SOURCE_EXTENSION);
    let source = fs::read_to_string(&source_path)
        .with_context(|| format!("Couldn't read {}", source_path.display()))?;

    let outcome = assemble(&source);

    for diagnostic in outcome.diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => log::error!("{}: {}", source_path.display(), diagnostic),
            Severity::Warning => log::warn!("{}: {}", source_path.display(), diagnostic),
        }
    }

    let mut output = match outcome.output {
        Some(output) => output,
        None => {
            for extension in [
                EXPANDED_EXTENSION,
                OBJECT_EXTENSION,
                ENTRIES_EXTENSION,
                EXTERNALS_EXTENSION,
                DEBUG_EXTENSION,
            ] {
                remove_if_exists(&with_extension(base, extension))?;
            }
            return Ok(false);
        }
    };

    output.debug.name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    write_or_remove(base, EXPANDED_EXTENSION, Some(output.expanded.clone()))?;
    write_or_remove(base, OBJECT_EXTENSION, Some(output.object_file()))?;
    write_or_remove(base, ENTRIES_EXTENSION, output.entries_file())?;
    write_or_remove(base, EXTERNALS_EXTENSION, output.externals_file())?;
    let debug = if config.debug {
        Some(output.debug.to_string()?)
    } else {
        None
    };
    write_or_remove(base, DEBUG_EXTENSION, debug)?;

    Ok(true)
}
