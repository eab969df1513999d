//! Path classification.
//!
//! Every request is either API traffic (CORS only) or non-API traffic
//! (auth gate). The check is a plain string prefix test on the path and
//! runs before anything else.

/// Traffic class of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traffic {
    Api,
    NonApi,
}

/// Splits API traffic from everything else.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    api_prefix: String,
}

impl PathClassifier {
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
        }
    }

    pub fn classify(&self, path: &str) -> Traffic {
        if path.starts_with(&self.api_prefix) {
            Traffic::Api
        } else {
            Traffic::NonApi
        }
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new("/api/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_prefix() {
        let c = PathClassifier::default();
        assert_eq!(c.classify("/api/words"), Traffic::Api);
        assert_eq!(c.classify("/api/"), Traffic::Api);
        assert_eq!(c.classify("/api"), Traffic::NonApi);
        assert_eq!(c.classify("/apis/x"), Traffic::NonApi);
        assert_eq!(c.classify("/API/words"), Traffic::NonApi);
        assert_eq!(c.classify("/admin/api/x"), Traffic::NonApi);
    }

    #[test]
    fn test_custom_prefix() {
        let c = PathClassifier::new("/v2/");
        assert_eq!(c.classify("/v2/items"), Traffic::Api);
        assert_eq!(c.classify("/api/items"), Traffic::NonApi);
    }
}
