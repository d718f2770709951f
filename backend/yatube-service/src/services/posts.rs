/// Post service - creation, editing and the detail page
use crate::db::{CommentRepository, GroupRepository, PostRepository, Store};
use crate::error::Result;
use crate::forms::{self, Cleaned, FormErrors, PostForm};
use crate::metrics::activity::{POSTS_CREATED_TOTAL, POSTS_EDITED_TOTAL};
use crate::models::{CommentView, Group, NewPost, Post, PostFilter, PostUpdate, PostView, User};
use crate::services::media::MediaStorage;
use std::sync::Arc;
use tracing::info;

/// Cleaned create/edit form with the image already stored
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub text: String,
    pub group_id: Option<i64>,
    /// Relative media path of a newly uploaded image
    pub image: Option<String>,
}

/// Everything the post detail page shows
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub author_posts_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(Post),
    /// The editor is not the author; nothing changed
    NotAuthor,
    NotFound,
}

pub struct PostService {
    store: Arc<dyn Store>,
    media: MediaStorage,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, media: MediaStorage) -> Self {
        Self { store, media }
    }

    pub async fn find(&self, post_id: i64) -> Result<Option<PostView>> {
        self.store.find_post(post_id).await
    }

    /// Options for the group select
    pub async fn group_choices(&self) -> Result<Vec<Group>> {
        self.store.list_groups().await
    }

    pub async fn detail(&self, post_id: i64) -> Result<Option<PostDetail>> {
        let Some(post) = self.store.find_post(post_id).await? else {
            return Ok(None);
        };
        let comments = self.store.list_comments(post_id).await?;
        let author_posts_count = self
            .store
            .count_posts(PostFilter::Author(post.author_id))
            .await?;

        Ok(Some(PostDetail {
            post,
            comments,
            author_posts_count,
        }))
    }

    /// Validate the form. The image is written to storage only when every
    /// other field is valid, so a rejected form leaves nothing behind.
    pub async fn clean(&self, form: &PostForm) -> Result<Cleaned<PostDraft>> {
        let mut errors = FormErrors::new();
        if let Err(field_errors) = forms::check(form) {
            errors.merge(field_errors);
        }

        let group_id = match form.group_id() {
            Ok(Some(id)) => {
                if self.store.find_group_by_id(id).await?.is_none() {
                    errors.add("group", forms::invalid_choice_message());
                }
                Some(id)
            }
            Ok(None) => None,
            Err(message) => {
                errors.add("group", message);
                None
            }
        };

        let image_format = match &form.image {
            Some(upload) => match self.media.inspect(&upload.bytes) {
                Ok(format) => Some(format),
                Err(rejection) => {
                    errors.add("image", rejection.to_string());
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        let image = match (&form.image, image_format) {
            (Some(upload), Some(format)) => Some(self.media.save(&upload.bytes, format).await?),
            _ => None,
        };

        Ok(Ok(PostDraft {
            text: form.text.clone(),
            group_id,
            image,
        }))
    }

    pub async fn create(&self, author: &User, draft: PostDraft) -> Result<Post> {
        let post = self
            .store
            .create_post(NewPost {
                author_id: author.id,
                text: draft.text,
                group_id: draft.group_id,
                image: draft.image,
            })
            .await?;

        POSTS_CREATED_TOTAL.inc();
        info!(post_id = post.id, author_id = author.id, "post created");
        Ok(post)
    }

    /// Apply an edit. Only the author may change a post.
    pub async fn edit(&self, editor: &User, post_id: i64, draft: PostDraft) -> Result<EditOutcome> {
        let Some(existing) = self.store.find_post(post_id).await? else {
            return Ok(EditOutcome::NotFound);
        };
        if existing.author_id != editor.id {
            info!(post_id, editor_id = editor.id, "edit refused for non-author");
            return Ok(EditOutcome::NotAuthor);
        }

        let updated = self
            .store
            .update_post(
                post_id,
                PostUpdate {
                    text: draft.text,
                    group_id: draft.group_id,
                    image: draft.image,
                },
            )
            .await?;

        match updated {
            Some(post) => {
                POSTS_EDITED_TOTAL.inc();
                info!(post_id, "post updated");
                Ok(EditOutcome::Updated(post))
            }
            None => Ok(EditOutcome::NotFound),
        }
    }

    /// Remove a post and its comments
    pub async fn delete(&self, post_id: i64) -> Result<bool> {
        let deleted = self.store.delete_post(post_id).await?;
        if deleted {
            info!(post_id, "post deleted");
        }
        Ok(deleted)
    }
}
