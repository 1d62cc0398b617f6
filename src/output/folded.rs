//! Folded stack report writer.
//!
//! One record per line: `<path> <elapsed>\n`. Names are written verbatim;
//! a name containing ';' or a newline would corrupt the line.

use super::validate_path;
use crate::aggregator::FlatStack;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write folded stacks to a file, truncating any previous content
///
/// **Public** - main entry point for report output
///
/// # Errors
/// * `OutputError::InvalidPath` - Path is empty or a directory
/// * `OutputError::WriteFailed` - File cannot be opened or written
pub fn write_folded(stacks: &[FlatStack], output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing folded stacks to: {}", output_path.display());
    validate_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    write_folded_to(stacks, &mut writer)?;
    writer.flush()?;

    debug!("Wrote {} folded records", stacks.len());
    Ok(())
}

/// Write folded stacks to any writer
///
/// **Public** - useful for tests and piping to stdout
pub fn write_folded_to<W: Write>(stacks: &[FlatStack], writer: &mut W) -> Result<(), OutputError> {
    for stack in stacks {
        writeln!(writer, "{} {}", stack.path, stack.elapsed)?;
    }
    Ok(())
}

/// Render folded stacks as a string
pub fn folded_to_string(stacks: &[FlatStack]) -> String {
    stacks.iter().map(|s| s.to_line() + "\n").collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample() -> Vec<FlatStack> {
        vec![
            FlatStack::new("root;LUA:main", 10),
            FlatStack::new("root;LUA:main;C:luaB_print", 250),
        ]
    }

    #[test]
    fn test_write_folded_to_buffer() {
        let mut buffer = Vec::new();
        write_folded_to(&sample(), &mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "root;LUA:main 10\nroot;LUA:main;C:luaB_print 250\n"
        );
    }

    #[test]
    fn test_write_folded_truncates() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "stale content that is much longer than the report\n")
            .unwrap();

        write_folded(&sample()[..1], temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "root;LUA:main 10\n");
    }

    #[test]
    fn test_write_folded_to_directory_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = write_folded(&sample(), temp_dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }

    #[test]
    fn test_folded_to_string_matches_writer() {
        let mut buffer = Vec::new();
        write_folded_to(&sample(), &mut buffer).unwrap();
        assert_eq!(folded_to_string(&sample()).into_bytes(), buffer);
    }
}
