use super::{is_unique_violation, GroupRepository, PgStore};
use crate::error::Result;
use crate::models::Group;

#[async_trait::async_trait]
impl GroupRepository for PgStore {
    async fn create_group(
        &self,
        slug: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<Group>> {
        let inserted = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO post_groups (slug, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, slug, title, description
            "#,
        )
        .bind(slug)
        .bind(title)
        .bind(description)
        .fetch_one(self.pool())
        .await;

        match inserted {
            Ok(group) => Ok(Some(group)),
            Err(err) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, slug, title, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;
        Ok(group)
    }

    async fn find_group_by_id(&self, group_id: i64) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, slug, title, description FROM post_groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, slug, title, description FROM post_groups ORDER BY title, id",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(groups)
    }
}
