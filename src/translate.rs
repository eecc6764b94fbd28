// Translation lookup for help content
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Maps translation ids to localized strings
pub trait Translator {
    fn translate(&self, id: &str) -> String;
}

/// TOML-backed catalog: one `<locale>.toml` file of `id = "text"` pairs per
/// locale. Lookups fall back to the fallback locale, then to the id itself.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    primary: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Catalog {
    pub fn new(primary: HashMap<String, String>, fallback: HashMap<String, String>) -> Self {
        Catalog { primary, fallback }
    }

    /// Load `<dir>/<locale>.toml` and `<dir>/<fallback>.toml`; missing or
    /// malformed files leave that table empty.
    pub fn load(dir: &Path, locale: &str, fallback_locale: &str) -> Self {
        let primary = load_table(&dir.join(format!("{locale}.toml")));
        let fallback = if fallback_locale == locale {
            HashMap::new()
        } else {
            load_table(&dir.join(format!("{fallback_locale}.toml")))
        };
        Catalog { primary, fallback }
    }
}

fn load_table(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = fs::read_to_string(path) else {
        log::debug!("no translation table at {}", path.display());
        return HashMap::new();
    };
    match toml::from_str::<HashMap<String, String>>(&contents) {
        Ok(table) => table,
        Err(err) => {
            log::warn!("Failed to parse translations {}: {err}", path.display());
            HashMap::new()
        }
    }
}

impl Translator for Catalog {
    fn translate(&self, id: &str) -> String {
        self.primary
            .get(id)
            .or_else(|| self.fallback.get(id))
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

impl Translator for HashMap<String, String> {
    fn translate(&self, id: &str) -> String {
        self.get(id).cloned().unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_chain() {
        let primary = HashMap::from([("hello".to_string(), "Hallo".to_string())]);
        let fallback = HashMap::from([
            ("hello".to_string(), "Hello".to_string()),
            ("bye".to_string(), "Goodbye".to_string()),
        ]);
        let catalog = Catalog::new(primary, fallback);
        assert_eq!(catalog.translate("hello"), "Hallo");
        assert_eq!(catalog.translate("bye"), "Goodbye");
        assert_eq!(catalog.translate("missing"), "missing");
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let catalog = Catalog::load(Path::new("/nonexistent/helpscreen"), "de", "en");
        assert_eq!(catalog.translate("x"), "x");
    }
}
