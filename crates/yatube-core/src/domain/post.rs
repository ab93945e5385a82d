use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters of text shown when a post is displayed inline.
pub const PREVIEW_CHARS: usize = 15;

/// Post entity - a single authored text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    /// Reference to an uploaded image, e.g. `posts/cat.png`.
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
}

/// The author-editable part of a post, already validated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

impl Post {
    /// Create a new post stamped with the current time.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            group_id: draft.group_id,
            text: draft.text,
            image: draft.image,
            pub_date: Utc::now(),
        }
    }

    /// Replace the editable fields. `id`, `author_id` and `pub_date` are kept,
    /// and so is the current image unless the draft brings a new one.
    pub fn apply(&mut self, draft: PostDraft) {
        self.text = draft.text;
        self.group_id = draft.group_id;
        if draft.image.is_some() {
            self.image = draft.image;
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Leading characters of the text, used wherever a short label is needed.
    pub fn preview(&self) -> String {
        self.text.chars().take(PREVIEW_CHARS).collect()
    }

    /// Snapshot of the editable fields, used to prefill the edit form.
    pub fn draft(&self) -> PostDraft {
        PostDraft {
            text: self.text.clone(),
            group_id: self.group_id,
            image: self.image.clone(),
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}
