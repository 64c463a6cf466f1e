use log::warn;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const TAIL_CHUNK: u64 = 8192;

/// Reads the last `max_lines` lines of a file without loading the whole
/// file, by scanning fixed-size chunks backwards from the end.
///
/// Blank lines are preserved (they terminate status blocks); a trailing
/// newline at end of file does not produce an empty final line.
pub fn read_tail(path: &Path, max_lines: usize) -> io::Result<Vec<String>> {
    if max_lines == 0 {
        return Ok(Vec::new());
    }

    let mut file = File::open(path)?;
    let mut pos = file.metadata()?.len();
    let mut buf: Vec<u8> = Vec::new();
    let mut newlines = 0usize;

    while pos > 0 && newlines <= max_lines {
        let read_len = TAIL_CHUNK.min(pos);
        pos -= read_len;
        file.seek(SeekFrom::Start(pos))?;
        let mut chunk = vec![0u8; read_len as usize];
        file.read_exact(&mut chunk)?;
        newlines += chunk.iter().filter(|&&b| b == b'\n').count();
        chunk.extend_from_slice(&buf);
        buf = chunk;
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    if lines.len() > max_lines {
        lines.drain(..lines.len() - max_lines);
    }
    Ok(lines)
}

/// Last line of a file, empty string for an empty file.
pub fn last_line(path: &Path) -> io::Result<String> {
    Ok(read_tail(path, 1)?.pop().unwrap_or_default())
}

/// Reads a whole file into a list of lines.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// Finds the file in `dir` whose name contains `needle`, requiring exactly
/// one match. Zero matches and ambiguous matches both yield `None`.
pub fn find_single_in_dir(dir: &Path, needle: &str) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory {}: {}", dir.display(), e);
            return None;
        }
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().contains(needle))
                .unwrap_or(false)
        })
        .collect();

    match matches.len() {
        1 => matches.pop(),
        0 => None,
        n => {
            warn!(
                "{} files in {} match {:?}, expected exactly one",
                n,
                dir.display(),
                needle
            );
            None
        }
    }
}

/// Deletes a file if it exists. Returns whether a file was removed; failures
/// are logged, not raised, since cleanup is best-effort.
pub fn delete_if_exists(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to delete {}: {}", path.display(), e);
            false
        }
    }
}

/// Whether the file exists and has non-zero length.
pub fn is_non_empty_file(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.len() > 0)
        .unwrap_or(false)
}
