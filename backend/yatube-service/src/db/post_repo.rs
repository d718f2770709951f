use super::{PgStore, PostRepository};
use crate::error::Result;
use crate::models::{NewPost, Post, PostFilter, PostUpdate, PostView};

/// Posts joined with author and (optional) group
const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.image, p.created_at,
           p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

const POST_COLUMNS: &str = "id, text, image, author_id, group_id, created_at";

/// WHERE clause for a filter; the filter value binds to `$1`
fn filter_clause(filter: PostFilter) -> (&'static str, Option<i64>) {
    match filter {
        PostFilter::All => ("", None),
        PostFilter::Group(group_id) => ("WHERE p.group_id = $1", Some(group_id)),
        PostFilter::Author(author_id) => ("WHERE p.author_id = $1", Some(author_id)),
        PostFilter::FollowedBy(user_id) => (
            "WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = $1)",
            Some(user_id),
        ),
    }
}

#[async_trait::async_trait]
impl PostRepository for PgStore {
    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let sql = format!(
            r#"
            INSERT INTO posts (text, image, author_id, group_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(&new_post.text)
            .bind(&new_post.image)
            .bind(new_post.author_id)
            .bind(new_post.group_id)
            .fetch_one(self.pool())
            .await?;
        Ok(post)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let sql = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);
        let post = sqlx::query_as::<_, PostView>(&sql)
            .bind(post_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(post)
    }

    async fn update_post(&self, post_id: i64, update: PostUpdate) -> Result<Option<Post>> {
        let sql = format!(
            r#"
            UPDATE posts
            SET text = $2, group_id = $3, image = COALESCE($4, image)
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .bind(&update.text)
            .bind(update.group_id)
            .bind(&update.image)
            .fetch_optional(self.pool())
            .await?;
        Ok(post)
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64> {
        let (clause, value) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM posts p {}", clause);
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }
        let count = query.fetch_one(self.pool()).await?;
        Ok(count)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostView>> {
        let (clause, value) = filter_clause(filter);
        // LIMIT/OFFSET placeholders follow the filter value when there is one
        let (limit_idx, offset_idx) = if value.is_some() { (2, 3) } else { (1, 2) };
        let sql = format!(
            "{} {} ORDER BY p.created_at DESC, p.id DESC LIMIT ${} OFFSET ${}",
            POST_VIEW_SELECT, clause, limit_idx, offset_idx
        );

        let mut query = sqlx::query_as::<_, PostView>(&sql);
        if let Some(value) = value {
            query = query.bind(value);
        }
        let posts = query
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool())
            .await?;
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_clause_binds() {
        assert_eq!(filter_clause(PostFilter::All), ("", None));
        let (clause, value) = filter_clause(PostFilter::Group(4));
        assert!(clause.contains("group_id = $1"));
        assert_eq!(value, Some(4));
        let (clause, _) = filter_clause(PostFilter::FollowedBy(2));
        assert!(clause.contains("FROM follows WHERE user_id = $1"));
    }
}
