//! Searchable field extraction.

use super::{Item, ItemDetail};
use std::borrow::Cow;

/// The role a field plays in relevance scoring.
///
/// Weights are attached to the role rather than to the field's position, so the
/// extraction order below can change freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Name,
    Description,
    Content,
    Tags,
    Category,
    Variables,
    Language,
    Steps,
}

impl FieldRole {
    /// Largest weight of any role; used to normalize scores into `[0, 1]`.
    pub const MAX_WEIGHT: f64 = 3.0;

    pub const fn weight(self) -> f64 {
        match self {
            Self::Name => 3.0,
            Self::Description | Self::Tags => 2.0,
            Self::Content => 1.5,
            Self::Category | Self::Variables | Self::Language | Self::Steps => 1.0,
        }
    }
}

/// A piece of item text tagged with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField<'a> {
    pub role: FieldRole,
    pub text: Cow<'a, str>,
}

impl<'a> SearchField<'a> {
    fn borrowed(role: FieldRole, text: &'a str) -> Self {
        Self {
            role,
            text: Cow::Borrowed(text),
        }
    }
}

fn push_opt<'a>(fields: &mut Vec<SearchField<'a>>, role: FieldRole, text: Option<&'a str>) {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        fields.push(SearchField::borrowed(role, text));
    }
}

fn push_joined<'a, I>(fields: &mut Vec<SearchField<'a>>, role: FieldRole, parts: I)
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.is_empty() {
        fields.push(SearchField {
            role,
            text: Cow::Owned(joined),
        });
    }
}

impl Item {
    /// Text fields searched for this item's kind.
    ///
    /// Every kind contributes name, description, category and tags. Templates add
    /// content and variable names, workflows add step names and descriptions, and
    /// snippets add content and language. Blank fields are skipped.
    pub fn searchable_fields(&self) -> Vec<SearchField<'_>> {
        let mut fields = Vec::with_capacity(6);

        push_opt(&mut fields, FieldRole::Name, Some(self.name.as_str()));
        push_opt(&mut fields, FieldRole::Description, self.description.as_deref());
        push_opt(&mut fields, FieldRole::Category, self.category.as_deref());
        push_joined(&mut fields, FieldRole::Tags, self.tags().iter().map(String::as_str));

        match &self.detail {
            ItemDetail::Template { variables, .. } => {
                push_opt(&mut fields, FieldRole::Content, self.content.as_deref());
                push_joined(
                    &mut fields,
                    FieldRole::Variables,
                    variables.iter().map(String::as_str),
                );
            }
            ItemDetail::Workflow { steps, .. } => {
                push_joined(
                    &mut fields,
                    FieldRole::Steps,
                    steps.iter().flat_map(|step| {
                        std::iter::once(step.name.as_str()).chain(step.description.as_deref())
                    }),
                );
            }
            ItemDetail::Snippet { language, .. } => {
                push_opt(&mut fields, FieldRole::Content, self.content.as_deref());
                push_opt(&mut fields, FieldRole::Language, language.as_deref());
            }
        }

        fields
    }
}
