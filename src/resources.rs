// Resource resolution and image fetching
use crate::error::FetchError;
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Resolves (category, locale, filename) triples to resource paths
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLocator {
    pub root: PathBuf,
    pub locale: String,
    pub fallback_locale: String,
}

impl ResourceLocator {
    pub fn new(root: impl Into<PathBuf>, locale: &str, fallback_locale: &str) -> Self {
        ResourceLocator {
            root: root.into(),
            locale: locale.to_string(),
            fallback_locale: fallback_locale.to_string(),
        }
    }

    pub fn locate(&self, category: &str, locale: &str, file: &str) -> PathBuf {
        self.root.join(category).join(locale).join(file)
    }

    /// Locations to try in order: the active locale, then the fallback
    /// locale when it differs
    pub fn candidates(&self, category: &str, file: &str) -> Vec<PathBuf> {
        let mut paths = vec![self.locate(category, &self.locale, file)];
        if self.fallback_locale != self.locale {
            paths.push(self.locate(category, &self.fallback_locale, file));
        }
        paths
    }
}

/// A fetched image, kept as raw encoded bytes
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub location: PathBuf,
    pub data: Vec<u8>,
}

/// Non-blocking image source
pub trait ImageFetcher {
    fn fetch(&self, location: PathBuf) -> impl Future<Output = Result<LoadedImage, FetchError>>;
}

/// Reads images from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageFetcher;

impl ImageFetcher for FsImageFetcher {
    fn fetch(&self, location: PathBuf) -> impl Future<Output = Result<LoadedImage, FetchError>> {
        let result = match std::fs::read(&location) {
            Ok(data) => Ok(LoadedImage { location, data }),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(FetchError::NotFound(location)),
            Err(source) => Err(FetchError::Io {
                path: location,
                source,
            }),
        };
        futures::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_include_fallback_once() {
        let locator = ResourceLocator::new("/res", "de", "en");
        assert_eq!(
            locator.candidates("help", "cat.png"),
            vec![
                PathBuf::from("/res/help/de/cat.png"),
                PathBuf::from("/res/help/en/cat.png"),
            ]
        );
        let english = ResourceLocator::new("/res", "en", "en");
        assert_eq!(english.candidates("help", "cat.png").len(), 1);
    }

    #[test]
    fn test_fs_fetcher_reports_missing_file() {
        let result = futures::executor::block_on(
            FsImageFetcher.fetch(PathBuf::from("/nonexistent/helpscreen/cat.png")),
        );
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }
}
