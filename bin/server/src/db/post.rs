//! PostgreSQL implementation of the post record store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postloop_ai::{GenerationUsage, PostDraft};
use postloop_core::PostId;
use postloop_workflow::{PostRecord, PostState, PostStore, StoreError};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

const SELECT_COLUMNS: &str = "id, theme, state, hook, caption, hashtags, alt_text, \
     image_prompt, cta, input_tokens, output_tokens, cost_usd, cost_inr, model, \
     platform_post_id, error_detail, created_at, decided_at, published_at";

/// Row type for post queries.
#[derive(FromRow)]
struct PostRow {
    id: String,
    theme: String,
    state: String,
    hook: Option<String>,
    caption: Option<String>,
    hashtags: Option<String>,
    alt_text: Option<String>,
    image_prompt: Option<String>,
    cta: Option<String>,
    input_tokens: Option<i32>,
    output_tokens: Option<i32>,
    cost_usd: Option<f64>,
    cost_inr: Option<f64>,
    model: Option<String>,
    platform_post_id: Option<String>,
    error_detail: Option<String>,
    created_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
}

fn decode_err(message: String) -> StoreError {
    StoreError::Backend { reason: message }
}

impl PostRow {
    fn try_into_record(self) -> Result<PostRecord, StoreError> {
        let id = PostId::from_str(&self.id)
            .map_err(|e| decode_err(format!("invalid post id '{}': {e}", self.id)))?;
        let state = PostState::parse(&self.state)
            .ok_or_else(|| decode_err(format!("unknown post state '{}'", self.state)))?;

        // A draft exists exactly when generation succeeded; caption is the
        // marker column.
        let draft = self.caption.map(|caption| PostDraft {
            hook: self.hook.unwrap_or_default(),
            caption,
            hashtags: self.hashtags.unwrap_or_default(),
            alt_text: self.alt_text.unwrap_or_default(),
            image_prompt: self.image_prompt.unwrap_or_default(),
            cta: self.cta.unwrap_or_default(),
        });

        let usage = match (self.input_tokens, self.output_tokens, self.model) {
            (Some(input), Some(output), Some(model)) => Some(GenerationUsage {
                input_tokens: u32::try_from(input)
                    .map_err(|_| decode_err(format!("negative input_tokens {input}")))?,
                output_tokens: u32::try_from(output)
                    .map_err(|_| decode_err(format!("negative output_tokens {output}")))?,
                cost_usd: self.cost_usd.unwrap_or_default(),
                cost_inr: self.cost_inr.unwrap_or_default(),
                model,
            }),
            _ => None,
        };

        Ok(PostRecord {
            id,
            theme: self.theme,
            state,
            draft,
            usage,
            platform_post_id: self.platform_post_id,
            error_detail: self.error_detail,
            created_at: self.created_at,
            decided_at: self.decided_at,
            published_at: self.published_at,
        })
    }
}

/// Bindable column values for a record, shared by insert and update.
struct PostValues<'a> {
    hook: Option<&'a str>,
    caption: Option<&'a str>,
    hashtags: Option<&'a str>,
    alt_text: Option<&'a str>,
    image_prompt: Option<&'a str>,
    cta: Option<&'a str>,
    input_tokens: Option<i32>,
    output_tokens: Option<i32>,
    cost_usd: Option<f64>,
    cost_inr: Option<f64>,
    model: Option<&'a str>,
}

impl<'a> PostValues<'a> {
    fn from_record(record: &'a PostRecord) -> Self {
        let draft = record.draft.as_ref();
        let usage = record.usage.as_ref();
        Self {
            hook: draft.map(|d| d.hook.as_str()),
            caption: draft.map(|d| d.caption.as_str()),
            hashtags: draft.map(|d| d.hashtags.as_str()),
            alt_text: draft.map(|d| d.alt_text.as_str()),
            image_prompt: draft.map(|d| d.image_prompt.as_str()),
            cta: draft.map(|d| d.cta.as_str()),
            input_tokens: usage.map(|u| u.input_tokens as i32),
            output_tokens: usage.map(|u| u.output_tokens as i32),
            cost_usd: usage.map(|u| u.cost_usd),
            cost_inr: usage.map(|u| u.cost_inr),
            model: usage.map(|u| u.model.as_str()),
        }
    }
}

fn backend_err(err: sqlx::Error) -> StoreError {
    StoreError::Backend {
        reason: err.to_string(),
    }
}

/// Repository for post records, backed by PostgreSQL.
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    /// Creates a new store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, record: &PostRecord) -> Result<(), StoreError> {
        let values = PostValues::from_record(record);
        sqlx::query(
            r#"
            INSERT INTO posts
                (id, theme, state, hook, caption, hashtags, alt_text, image_prompt, cta,
                 input_tokens, output_tokens, cost_usd, cost_inr, model,
                 platform_post_id, error_detail, created_at, decided_at, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.theme)
        .bind(record.state.as_str())
        .bind(values.hook)
        .bind(values.caption)
        .bind(values.hashtags)
        .bind(values.alt_text)
        .bind(values.image_prompt)
        .bind(values.cta)
        .bind(values.input_tokens)
        .bind(values.output_tokens)
        .bind(values.cost_usd)
        .bind(values.cost_inr)
        .bind(values.model)
        .bind(&record.platform_post_id)
        .bind(&record.error_detail)
        .bind(record.created_at)
        .bind(record.decided_at)
        .bind(record.published_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;

        Ok(())
    }

    async fn get(&self, id: PostId) -> Result<Option<PostRecord>, StoreError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        row.map(PostRow::try_into_record).transpose()
    }

    async fn update(&self, record: &PostRecord, expected: PostState) -> Result<(), StoreError> {
        let values = PostValues::from_record(record);
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET state = $3, hook = $4, caption = $5, hashtags = $6, alt_text = $7,
                image_prompt = $8, cta = $9, input_tokens = $10, output_tokens = $11,
                cost_usd = $12, cost_inr = $13, model = $14, platform_post_id = $15,
                error_detail = $16, decided_at = $17, published_at = $18
            WHERE id = $1 AND state = $2
            "#,
        )
        .bind(record.id.to_string())
        .bind(expected.as_str())
        .bind(record.state.as_str())
        .bind(values.hook)
        .bind(values.caption)
        .bind(values.hashtags)
        .bind(values.alt_text)
        .bind(values.image_prompt)
        .bind(values.cta)
        .bind(values.input_tokens)
        .bind(values.output_tokens)
        .bind(values.cost_usd)
        .bind(values.cost_inr)
        .bind(values.model)
        .bind(&record.platform_post_id)
        .bind(&record.error_detail)
        .bind(record.decided_at)
        .bind(record.published_at)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // The guarded update matched nothing: either the record is gone or
        // its state moved. Re-read to report which.
        match self.get(record.id).await? {
            None => Err(StoreError::NotFound { id: record.id }),
            Some(current) => Err(StoreError::Conflict {
                id: record.id,
                expected,
                actual: current.state,
            }),
        }
    }

    async fn list(
        &self,
        filter: Option<PostState>,
        limit: i64,
    ) -> Result<Vec<PostRecord>, StoreError> {
        let rows: Vec<PostRow> = match filter {
            Some(state) => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM posts WHERE state = $1 \
                     ORDER BY created_at DESC, id DESC LIMIT $2"
                ))
                .bind(state.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {SELECT_COLUMNS} FROM posts \
                     ORDER BY created_at DESC, id DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend_err)?;

        rows.into_iter().map(PostRow::try_into_record).collect()
    }

    async fn latest(&self) -> Result<Option<PostRecord>, StoreError> {
        let row: Option<PostRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        row.map(PostRow::try_into_record).transpose()
    }

    async fn exists_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE created_at >= $1 AND created_at < $2)",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(backend_err)?;

        Ok(exists)
    }
}
