//! Category catalog
//!
//! A category is a game platform: an identifier, a label, the file
//! extensions that count as a match, and the root listing URL crawled
//! for it. The catalog starts from a built-in platform table and applies
//! operator configuration on top.

mod builtin;

pub use builtin::builtin_categories;

use crate::config::Config;
use crate::url::normalize_root_url;
use crate::ScoutError;
use url::Url;

/// A searchable category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Stable identifier (e.g., "gba")
    pub id: String,

    /// Human-readable name
    pub label: String,

    extensions: Vec<String>,
    root_url: Option<Url>,
}

impl Category {
    /// Creates a category without a root URL
    ///
    /// Extensions are lowercased and stripped of a leading dot; blanks and
    /// duplicates are dropped while preserving order.
    pub fn new<I, S>(id: impl Into<String>, label: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        Self {
            id: id.into(),
            label: label.into(),
            extensions: normalized,
            root_url: None,
        }
    }

    /// Returns the category with the given root URL
    pub fn with_root_url(mut self, root_url: Url) -> Self {
        self.root_url = Some(root_url);
        self
    }

    /// Accepted extensions, lowercase and without a leading dot
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Case-insensitive extension membership test
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// The root listing URL, if the operator configured one
    pub fn root_url(&self) -> Option<&Url> {
        self.root_url.as_ref()
    }

    /// Replaces the root listing URL
    pub fn set_root_url(&mut self, root_url: Option<Url>) {
        self.root_url = root_url;
    }
}

/// Ordered set of categories
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Creates a catalog from categories in declaration order
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The built-in platform catalog with no root URLs configured
    pub fn builtin() -> Self {
        Self::new(builtin_categories())
    }

    /// Builds the catalog described by a configuration
    ///
    /// Configured categories replace built-in ones with the same id (in
    /// place) or are appended. Root URLs from `[roots]` are applied last
    /// and win over a category's own `root-url`.
    pub fn from_config(config: &Config) -> Result<Self, ScoutError> {
        let mut catalog = Self::builtin();

        for entry in &config.categories {
            let category = Category::new(&entry.id, &entry.label, &entry.extensions);
            match catalog.categories.iter_mut().find(|c| c.id == entry.id) {
                Some(existing) => *existing = category,
                None => catalog.categories.push(category),
            }

            if let Some(root) = &entry.root_url {
                catalog.set_root_url(&entry.id, root)?;
            }
        }

        for (id, root) in &config.roots {
            catalog.set_root_url(id, root)?;
        }

        Ok(catalog)
    }

    /// Looks up a category by id
    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Sets or clears (blank string) a category's root URL
    ///
    /// Must not be called while a search against the same category is in
    /// flight; searches work on their own clone of the category.
    pub fn set_root_url(&mut self, id: &str, root: &str) -> Result<(), ScoutError> {
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ScoutError::UnknownCategory(id.to_string()))?;

        let root_url = if root.trim().is_empty() {
            None
        } else {
            Some(normalize_root_url(root)?)
        };
        category.set_root_url(root_url);

        Ok(())
    }

    /// Iterates categories in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether the catalog has no categories
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
