use serde::de::DeserializeOwned;

/// Outcome of parsing JSON that a model was asked to emit.
///
/// Models do not always comply, so a parse failure is an expected outcome
/// rather than an error. Callers branch on `Fallback` and continue with an
/// empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelJson<T> {
    Parsed(T),
    Fallback,
}

impl<T> ModelJson<T> {
    /// Parse `raw` (surrounding whitespace allowed) as JSON of type `T`.
    pub fn parse(raw: &str) -> Self
    where
        T: DeserializeOwned,
    {
        match serde_json::from_str(raw.trim()) {
            Ok(value) => ModelJson::Parsed(value),
            Err(_) => ModelJson::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ModelJson::Fallback)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            ModelJson::Parsed(value) => Some(value),
            ModelJson::Fallback => None,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.into_option().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array() {
        let parsed = ModelJson::<Vec<String>>::parse(" [\"a\", \"b\"]\n");
        assert_eq!(parsed, ModelJson::Parsed(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_parse_failure_falls_back() {
        let parsed = ModelJson::<Vec<String>>::parse("Sure! Here are your queries: 1. apple");
        assert!(parsed.is_fallback());
        assert!(parsed.unwrap_or_default().is_empty());

        // Wrong shape is a fallback too
        assert!(ModelJson::<Vec<String>>::parse(r#"{"queries": []}"#).is_fallback());
    }
}
