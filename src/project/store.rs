use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde_json::error::Category;

use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::project::model::Project;

/// Extension of project files.
pub const CKG_EXT: &str = "ckg";

impl Project {
    /// Load a project file. The project is named after the file stem.
    #[tracing::instrument]
    pub fn load(path: &Path) -> CheckergenResult<Project> {
        let name = ckg_stem(path)?;
        let f = File::open(path).with_context(|| format!("open project '{}'", path.display()))?;
        let mut proj: Project =
            serde_json::from_reader(BufReader::new(f)).map_err(|e| match e.classify() {
                // Well-formed JSON whose values fail the board/fps/resolution constructors.
                Category::Data => {
                    CheckergenError::invalid_config(format!("{}: {e}", path.display()))
                }
                _ => CheckergenError::serde(format!("{}: {e}", path.display())),
            })?;
        proj.name = name;
        proj.dirty = false;
        tracing::info!(boards = proj.boards.len(), "project loaded");
        Ok(proj)
    }

    /// Save to `path`, appending the `.ckg` extension when missing.
    ///
    /// The project takes the file stem as its new name. Returns the path written.
    #[tracing::instrument(skip(self), fields(project = %self.name))]
    pub fn save(&mut self, path: &Path) -> CheckergenResult<PathBuf> {
        let path = if path.extension().and_then(|e| e.to_str()) == Some(CKG_EXT) {
            path.to_path_buf()
        } else {
            let mut p = path.as_os_str().to_owned();
            p.push(format!(".{CKG_EXT}"));
            PathBuf::from(p)
        };
        let name = ckg_stem(&path)?;

        let f =
            File::create(&path).with_context(|| format!("create project '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &*self)
            .map_err(|e| CheckergenError::serde(e.to_string()))?;
        w.write_all(b"\n")
            .and_then(|()| w.flush())
            .with_context(|| format!("write project '{}'", path.display()))?;

        self.name = name;
        self.dirty = false;
        tracing::info!(path = %path.display(), "project saved");
        Ok(path)
    }
}

fn ckg_stem(path: &Path) -> CheckergenResult<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(CKG_EXT) {
        return Err(CheckergenError::format(format!(
            "path lacks '.{CKG_EXT}' extension"
        )));
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| CheckergenError::format(format!("'{}' has no file name", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/project/store.rs"]
mod tests;
