use crate::errors::AppError;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Expand the positional inputs: files are kept as given, directories
/// contribute their `*.txt` files sorted by name. Missing paths are skipped.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_file() {
            out.push(input.clone());
        } else if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
                let e = entry.map_err(|e| AppError::IO(format!("walkdir: {}", e)))?;
                if e.file_type().is_file() && is_txt(e.path()) {
                    found.push(e.path().to_path_buf());
                }
            }
            found.sort();
            out.extend(found);
        } else {
            warn!("input {} does not exist; skipped", input.display());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn directories_expand_to_sorted_txt_files() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["14.txt", "13.TXT", "notes.md", "nested/15.txt"] {
            std::fs::write(dir.join(name), "").unwrap();
        }

        let missing = dir.join("absent.txt");
        let got = collect_inputs(&[dir.to_path_buf(), missing]).unwrap();
        assert_eq!(got, vec![dir.join("13.TXT"), dir.join("14.txt")]);
    }

    #[test]
    fn plain_files_keep_their_given_order() {
        let tmp = TempDir::new().unwrap();
        let (a, b) = (tmp.path().join("b.txt"), tmp.path().join("a.log"));
        std::fs::write(&a, "").unwrap();
        std::fs::write(&b, "").unwrap();
        let got = collect_inputs(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(got, vec![a, b]);
    }
}
