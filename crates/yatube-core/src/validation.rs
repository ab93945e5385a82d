//! Post form validation.
//!
//! Raw submitted fields are cleaned into a [`PostDraft`] or a set of
//! field-level errors that the caller shows back to the submitter.

use std::collections::BTreeMap;
use std::fmt;

use uuid::Uuid;

use crate::domain::{Group, PostDraft};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field name to messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn into_fields(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", names.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Reject only the exact empty string. Whitespace-only text is accepted.
pub fn validate_text(text: &str) -> Result<(), &'static str> {
    if text.is_empty() {
        return Err(REQUIRED_MESSAGE);
    }
    Ok(())
}

/// Raw post form fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    /// Group id; empty or absent means "no group".
    pub group: Option<String>,
    pub image: Option<String>,
}

impl PostInput {
    /// Clean the input against the groups offered as choices.
    pub fn clean(self, choices: &[Group]) -> Result<PostDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(message) = validate_text(&self.text) {
            errors.add("text", message);
        }

        let group_id = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) if choices.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    errors.add("group", INVALID_CHOICE_MESSAGE);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(PostDraft {
            text: self.text,
            group_id,
            image: self.image.filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &str, group: Option<String>) -> PostInput {
        PostInput {
            text: text.to_string(),
            group,
            image: None,
        }
    }

    #[test]
    fn test_empty_text_rejected() {
        let errors = input("", None).clean(&[]).unwrap_err();
        assert_eq!(errors.get("text"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_whitespace_text_accepted() {
        let draft = input("   ", None).clean(&[]).unwrap();
        assert_eq!(draft.text, "   ");
        assert_eq!(draft.group_id, None);
    }

    #[test]
    fn test_known_group_accepted() {
        let group = Group::new("Cats", "cats", "About cats");
        let draft = input("text", Some(group.id.to_string()))
            .clean(std::slice::from_ref(&group))
            .unwrap();
        assert_eq!(draft.group_id, Some(group.id));
    }

    #[test]
    fn test_blank_group_means_none() {
        let draft = input("text", Some(String::new())).clean(&[]).unwrap();
        assert_eq!(draft.group_id, None);
    }

    #[test]
    fn test_unknown_group_rejected() {
        let errors = input("text", Some(uuid::Uuid::new_v4().to_string()))
            .clean(&[])
            .unwrap_err();
        assert!(errors.get("group").is_some());
        assert!(errors.get("text").is_none());
    }

    #[test]
    fn test_garbage_group_and_empty_text_both_reported() {
        let errors = input("", Some("not-a-uuid".to_string()))
            .clean(&[])
            .unwrap_err();
        let fields = errors.into_fields();
        assert_eq!(
            fields.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["group", "text"]
        );
    }

    #[test]
    fn test_empty_image_dropped() {
        let draft = PostInput {
            text: "t".to_string(),
            group: None,
            image: Some(String::new()),
        }
        .clean(&[])
        .unwrap();
        assert_eq!(draft.image, None);
    }
}
