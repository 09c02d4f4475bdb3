use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct VideoStore {
    pool: SqlitePool,
}

/// A video draft. The binary media itself is stored elsewhere; this record
/// carries metadata and the owning user.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "videoURL")]
    pub video_url: Option<String>,
    #[serde(rename = "userID")]
    pub user_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    id: String,
    title: String,
    description: String,
    thumbnail_url: Option<String>,
    video_url: Option<String>,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            video_url: row.video_url,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const VIDEO_COLUMNS: &str =
    "id, title, description, thumbnail_url, video_url, user_id, created_at, updated_at";

impl VideoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new video draft owned by a user.
    pub async fn create(
        &self,
        id: &str,
        title: &str,
        description: &str,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO videos (id, title, description, user_id) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(title)
            .bind(description)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get a video by ID.
    pub async fn get(&self, id: &str) -> Result<Option<Video>, sqlx::Error> {
        let row: Option<VideoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM videos WHERE id = ?",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Video::from))
    }

    /// List a user's videos, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Video>, sqlx::Error> {
        let rows: Vec<VideoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM videos WHERE user_id = ? ORDER BY created_at DESC, id",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Video::from).collect())
    }

    /// Set the thumbnail URL for a video.
    pub async fn update_thumbnail(&self, id: &str, thumbnail_url: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE videos SET thumbnail_url = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(thumbnail_url)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a video by ID.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
