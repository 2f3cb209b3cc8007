use crate::pattern::{builtin_patterns, BreathingPattern};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of user-defined patterns.
pub trait PatternStore {
    fn load(&self) -> Vec<BreathingPattern>;
    fn save(&self, patterns: &[BreathingPattern]) -> std::io::Result<()>;
}

/// JSON file of custom patterns in the config directory. Entries that fail
/// validation are skipped on load rather than poisoning the whole library.
#[derive(Debug, Clone)]
pub struct FilePatternStore {
    path: PathBuf,
}

impl FilePatternStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "respire") {
            pd.config_dir().join("patterns.json")
        } else {
            PathBuf::from("respire_patterns.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl PatternStore for FilePatternStore {
    fn load(&self) -> Vec<BreathingPattern> {
        let Ok(bytes) = fs::read(&self.path) else {
            return Vec::new();
        };
        let Ok(patterns) = serde_json::from_slice::<Vec<BreathingPattern>>(&bytes) else {
            return Vec::new();
        };
        patterns
            .into_iter()
            .filter(|p| p.validate().is_ok())
            .collect()
    }

    fn save(&self, patterns: &[BreathingPattern]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(patterns).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// The selectable pattern catalog: built-ins first, then any custom
/// patterns whose names do not collide with a built-in. Always holds at
/// least one pattern, so `selected` never fails.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<BreathingPattern>,
    selected: usize,
}

impl PatternLibrary {
    pub fn with_builtins() -> Self {
        Self {
            patterns: builtin_patterns(),
            selected: 0,
        }
    }

    pub fn from_store(store: &impl PatternStore) -> Self {
        let mut library = Self::with_builtins();
        for custom in store.load() {
            if !library.patterns.iter().any(|p| p.name == custom.name) {
                library.patterns.push(custom);
            }
        }
        library
    }

    /// Add a pattern (replacing any same-named entry) and select it.
    pub fn insert_and_select(&mut self, pattern: BreathingPattern) {
        if let Some(idx) = self.patterns.iter().position(|p| p.name == pattern.name) {
            self.patterns[idx] = pattern;
            self.selected = idx;
        } else {
            self.patterns.push(pattern);
            self.selected = self.patterns.len() - 1;
        }
    }

    pub fn selected(&self) -> &BreathingPattern {
        &self.patterns[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_by_name(&mut self, name: &str) -> bool {
        match self.patterns.iter().position(|p| p.name == name) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.patterns.len();
    }

    pub fn select_prev(&mut self) {
        self.selected = (self.selected + self.patterns.len() - 1) % self.patterns.len();
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreathingPattern> {
        self.patterns.iter()
    }
}
