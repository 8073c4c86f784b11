//! Form lookup.
//!
//! The submit operation resolves the submitted `_id` through a
//! [`FormRepository`]. Ids are laundered first; an id that is not a plain
//! token never reaches the repository.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use formpipe_core::{FormError, FormResult};
use formpipe_forms::FormDefinition;

/// Returns the id if it is a plain token (letters, digits, `_`, `-`, `:`).
///
/// # Examples
///
/// ```
/// use formpipe_views::repository::launder_id;
/// use serde_json::json;
///
/// assert_eq!(launder_id(&json!(" ck1:en:published ")).as_deref(), Some("ck1:en:published"));
/// assert_eq!(launder_id(&json!("{\"$ne\": 1}")), None);
/// assert_eq!(launder_id(&json!(7)), None);
/// ```
pub fn launder_id(value: &Value) -> Option<String> {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    let id_re = ID_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_:\-]+$").expect("valid regex"));
    let id = value.as_str()?.trim();
    id_re.is_match(id).then(|| id.to_string())
}

/// A source of form definitions.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Returns the form with the given id, if any.
    async fn find(&self, id: &str) -> FormResult<Option<Arc<FormDefinition>>>;
}

/// A repository holding forms in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFormRepository {
    forms: Arc<RwLock<HashMap<String, Arc<FormDefinition>>>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormsFile {
    List(Vec<FormDefinition>),
    Wrapped { forms: Vec<FormDefinition> },
}

impl InMemoryFormRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `forms`.
    pub fn with_forms(forms: impl IntoIterator<Item = FormDefinition>) -> Self {
        let forms = forms
            .into_iter()
            .map(|form| (form.id.clone(), Arc::new(form)))
            .collect();
        Self {
            forms: Arc::new(RwLock::new(forms)),
        }
    }

    /// Parses forms from JSON: either a list of definitions or
    /// `{"forms": [...]}`.
    pub fn from_json_str(json: &str) -> FormResult<Self> {
        let forms = match serde_json::from_str::<FormsFile>(json)? {
            FormsFile::List(forms) | FormsFile::Wrapped { forms } => forms,
        };
        Ok(Self::with_forms(forms))
    }

    /// Loads forms from a JSON file.
    pub async fn from_json_file(path: &Path) -> FormResult<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            FormError::ConfigurationError(format!("cannot read forms from {}: {e}", path.display()))
        })?;
        let repository = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            forms = repository.len().await,
            "loaded form definitions"
        );
        Ok(repository)
    }

    /// Adds or replaces a form.
    pub async fn insert(&self, form: FormDefinition) {
        self.forms.write().await.insert(form.id.clone(), Arc::new(form));
    }

    /// Returns the number of forms.
    pub async fn len(&self) -> usize {
        self.forms.read().await.len()
    }

    /// Returns `true` if there are no forms.
    pub async fn is_empty(&self) -> bool {
        self.forms.read().await.is_empty()
    }

    /// Returns the form ids, sorted.
    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.forms.read().await.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl FormRepository for InMemoryFormRepository {
    async fn find(&self, id: &str) -> FormResult<Option<Arc<FormDefinition>>> {
        Ok(self.forms.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formpipe_forms::Area;
    use serde_json::json;

    #[test]
    fn test_launder_id() {
        assert_eq!(launder_id(&json!("contact-1")).as_deref(), Some("contact-1"));
        assert_eq!(launder_id(&json!("")), None);
        assert_eq!(launder_id(&json!("a b")), None);
        assert_eq!(launder_id(&json!(null)), None);
    }

    #[tokio::test]
    async fn test_find() {
        let repo = InMemoryFormRepository::with_forms([FormDefinition::new("a", Area::default())]);
        assert!(repo.find("a").await.unwrap().is_some());
        assert!(repo.find("b").await.unwrap().is_none());

        repo.insert(FormDefinition::new("b", Area::default())).await;
        assert_eq!(repo.ids().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_from_json_shapes() {
        let repo = InMemoryFormRepository::from_json_str(r#"[{"_id": "a"}, {"_id": "b"}]"#).unwrap();
        assert_eq!(repo.len().await, 2);

        let repo = InMemoryFormRepository::from_json_str(r#"{"forms": [{"_id": "c"}]}"#).unwrap();
        assert_eq!(repo.ids().await, vec!["c"]);

        assert!(InMemoryFormRepository::from_json_str(r#"{"nope": true}"#).is_err());
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forms.json");
        std::fs::write(&path, r#"[{"_id": "contact", "title": "Contact"}]"#).unwrap();
        let repo = InMemoryFormRepository::from_json_file(&path).await.unwrap();
        assert_eq!(repo.find("contact").await.unwrap().unwrap().title, "Contact");

        let missing = InMemoryFormRepository::from_json_file(&dir.path().join("none.json")).await;
        assert!(matches!(missing, Err(FormError::ConfigurationError(_))));
    }
}
