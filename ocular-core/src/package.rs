//! Package data model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A module discovered in the monorepo.
///
/// `id` is the module directory relative to the invocation root
/// (e.g. `modules/core`) and is what build orders are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    /// npm name from `package.json`, if declared.
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub path: PathBuf,
    pub deps: SmallVec<[String; 4]>,
}

impl Package {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, deps: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            version: None,
            private: false,
            path: path.into(),
            deps: SmallVec::from_vec(deps),
        }
    }

    /// Name shown to humans: the npm name when known, the id otherwise.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    #[inline]
    pub fn depends_on(&self, id: &str) -> bool {
        self.deps.iter().any(|d| d == id)
    }
}
