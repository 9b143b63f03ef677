//! Item data model.
//!
//! Items are owned by the host application; the engine only reads them. The three
//! item kinds share a common header and differ in where their tags live and which
//! extra fields are searchable, which is captured by [`ItemDetail`].

mod fields;

pub use fields::{FieldRole, SearchField};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A template, workflow or snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub detail: ItemDetail,
}

/// Kind-specific part of an item, discriminated by `kind` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemDetail {
    Template {
        #[serde(default, rename = "snippetTags")]
        snippet_tags: Vec<String>,
        #[serde(default)]
        variables: Vec<String>,
    },
    Workflow {
        #[serde(default, rename = "snippetTags")]
        snippet_tags: Vec<String>,
        #[serde(default)]
        steps: Vec<WorkflowStep>,
    },
    Snippet {
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkflowStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The kind of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Template,
    Workflow,
    Snippet,
}

impl ItemKind {
    pub const ALL: [Self; 3] = [Self::Template, Self::Workflow, Self::Snippet];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Workflow => "workflow",
            Self::Snippet => "snippet",
        }
    }

    /// Plural collection name as used by type filters (`templates`, ...).
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Template => "templates",
            Self::Workflow => "workflows",
            Self::Snippet => "snippets",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized item kind names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown item kind '{0}'")]
pub struct UnknownItemKind(pub String);

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" | "templates" => Ok(Self::Template),
            "workflow" | "workflows" => Ok(Self::Workflow),
            "snippet" | "snippets" => Ok(Self::Snippet),
            _ => Err(UnknownItemKind(s.to_string())),
        }
    }
}

impl Item {
    fn with_detail(id: impl Into<String>, name: impl Into<String>, detail: ItemDetail) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            content: None,
            category: None,
            favorite: false,
            created_at: None,
            updated_at: None,
            detail,
        }
    }

    pub fn template(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_detail(
            id,
            name,
            ItemDetail::Template {
                snippet_tags: Vec::new(),
                variables: Vec::new(),
            },
        )
    }

    pub fn workflow(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_detail(
            id,
            name,
            ItemDetail::Workflow {
                snippet_tags: Vec::new(),
                steps: Vec::new(),
            },
        )
    }

    pub fn snippet(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_detail(
            id,
            name,
            ItemDetail::Snippet {
                tags: Vec::new(),
                language: None,
            },
        )
    }

    pub const fn kind(&self) -> ItemKind {
        match self.detail {
            ItemDetail::Template { .. } => ItemKind::Template,
            ItemDetail::Workflow { .. } => ItemKind::Workflow,
            ItemDetail::Snippet { .. } => ItemKind::Snippet,
        }
    }

    /// Raw tags as entered: `snippetTags` for templates and workflows, `tags` for
    /// snippets.
    pub fn tags(&self) -> &[String] {
        match &self.detail {
            ItemDetail::Template { snippet_tags, .. } | ItemDetail::Workflow { snippet_tags, .. } => {
                snippet_tags
            }
            ItemDetail::Snippet { tags, .. } => tags,
        }
    }

    fn tags_mut(&mut self) -> &mut Vec<String> {
        match &mut self.detail {
            ItemDetail::Template { snippet_tags, .. } | ItemDetail::Workflow { snippet_tags, .. } => {
                snippet_tags
            }
            ItemDetail::Snippet { tags, .. } => tags,
        }
    }

    /// Whether the item has non-blank content.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Most recent timestamp, preferring `updatedAt`.
    pub fn last_modified(&self) -> Option<i64> {
        self.updated_at.or(self.created_at)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.tags_mut() = tags.into_iter().map(Into::into).collect();
        self
    }

    pub const fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub const fn with_created_at(mut self, millis: i64) -> Self {
        self.created_at = Some(millis);
        self
    }

    pub const fn with_updated_at(mut self, millis: i64) -> Self {
        self.updated_at = Some(millis);
        self
    }

    /// Set template variables. No effect on other kinds.
    pub fn with_variables<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let ItemDetail::Template { variables, .. } = &mut self.detail {
            *variables = names.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Set workflow steps. No effect on other kinds.
    pub fn with_steps(mut self, new_steps: Vec<WorkflowStep>) -> Self {
        if let ItemDetail::Workflow { steps, .. } = &mut self.detail {
            *steps = new_steps;
        }
        self
    }

    /// Set the snippet language. No effect on other kinds.
    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        if let ItemDetail::Snippet { language, .. } = &mut self.detail {
            *language = Some(lang.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[rstest]
    #[case("template", ItemKind::Template)]
    #[case("Templates", ItemKind::Template)]
    #[case("workflows", ItemKind::Workflow)]
    #[case(" SNIPPET ", ItemKind::Snippet)]
    fn test_kind_parsing(#[case] input: &str, #[case] expected: ItemKind) {
        let_assert!(Ok(kind) = input.parse::<ItemKind>());
        check!(kind == expected);
    }

    #[test]
    fn test_unknown_kind() {
        let_assert!(Err(UnknownItemKind(name)) = "folder".parse::<ItemKind>());
        check!(name == "folder");
    }

    #[test]
    fn test_tags_follow_kind() {
        let template = Item::template("t", "T").with_tags(["a"]);
        let snippet = Item::snippet("s", "S").with_tags(["b"]);
        check!(template.tags() == ["a".to_string()]);
        check!(snippet.tags() == ["b".to_string()]);
    }

    #[test]
    fn test_json_shape() {
        let template = Item::template("1", "Readme")
            .with_tags(["docs"])
            .with_variables(["project"]);
        let json = serde_json::to_value(&template).unwrap();
        check!(json["kind"] == "template");
        check!(json["snippetTags"][0] == "docs");
        check!(json["variables"][0] == "project");
        check!(json.get("tags").is_none());

        let snippet: Item = serde_json::from_str(
            r#"{"id":"s1","name":"Fetch","kind":"snippet","tags":["http"],"language":"rust","favorite":true}"#,
        )
        .unwrap();
        check!(snippet.kind() == ItemKind::Snippet);
        check!(snippet.tags() == ["http".to_string()]);
        check!(snippet.favorite);
    }

    #[test]
    fn test_has_content_ignores_whitespace() {
        check!(!Item::snippet("1", "x").has_content());
        check!(!Item::snippet("1", "x").with_content("  \n").has_content());
        check!(Item::snippet("1", "x").with_content(" y ").has_content());
    }

    #[test]
    fn test_kind_specific_builders_ignore_other_kinds() {
        let snippet = Item::snippet("1", "x").with_variables(["v"]).with_steps(vec![]);
        let_assert!(ItemDetail::Snippet { language: None, .. } = snippet.detail);
    }
}
