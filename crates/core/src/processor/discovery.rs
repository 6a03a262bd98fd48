//! Input tree discovery and output path mapping.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::profile::Codec;

/// Whether the path's extension is one of `extensions`, ignoring case.
pub fn is_audio_file(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Recursively collects audio files under `root`, sorted by path.
///
/// Symlinked files are included; symlinked directories are not descended.
/// The `exclude` subtree, when given, is pruned from the walk.
pub fn discover_audio_files(
    root: &Path,
    exclude: Option<&Path>,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| exclude.map_or(true, |skip| !entry.path().starts_with(skip)));

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().is_file() && is_audio_file(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// The output root as seen from a walk of `input_root`, when it lives
/// strictly inside it.
///
/// Previous outputs under such a root must not be picked up as inputs.
pub fn nested_output_root(input_root: &Path, output_root: &Path) -> Option<PathBuf> {
    let relative = match output_root.strip_prefix(input_root) {
        Ok(relative) if is_plain(relative) => relative.to_path_buf(),
        _ => {
            let input = input_root.canonicalize().ok()?;
            let output = output_root.canonicalize().ok()?;
            output.strip_prefix(&input).ok()?.to_path_buf()
        }
    };

    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(input_root.join(relative))
}

fn is_plain(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Maps an input file to its place in the output tree.
///
/// `output_root / (input relative to input_root)`, with the extension swapped
/// for the codec's. Returns `None` when `input` is not under `input_root`.
pub fn output_path(
    input_root: &Path,
    output_root: &Path,
    input: &Path,
    codec: Codec,
) -> Option<PathBuf> {
    let relative = input.strip_prefix(input_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(output_root.join(relative).with_extension(codec.extension()))
}
