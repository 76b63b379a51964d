use thiserror::Error;

use crate::model::CommunityPost;
use crate::store::TableStore;

/// Raw form input for a new post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    /// Multi-line body; preferred when it has any non-blank text.
    pub long_content: String,
    /// Single-line body used when the long one is blank.
    pub short_content: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            long_content: content.into(),
            short_content: String::new(),
        }
    }
}

/// Validation rejection shown to the user. The store is left untouched.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PostRejected {
    #[error("a post needs a title")]
    MissingTitle,
    #[error("a post needs some content")]
    MissingContent,
}

impl TableStore {
    pub fn add_post(&mut self, draft: PostDraft) -> Result<CommunityPost, PostRejected> {
        let title = draft.title.trim();
        let long = draft.long_content.trim();
        let content = if long.is_empty() {
            draft.short_content.trim()
        } else {
            long
        };

        if title.is_empty() {
            return Err(PostRejected::MissingTitle);
        }
        if content.is_empty() {
            return Err(PostRejected::MissingContent);
        }

        let post = CommunityPost {
            title: title.to_string(),
            content: content.to_string(),
        };
        self.posts.push(post.clone());
        Ok(post)
    }

    /// Posts newest first.
    pub fn posts_for_display(&self) -> impl Iterator<Item = &CommunityPost> {
        self.posts.iter().rev()
    }
}
