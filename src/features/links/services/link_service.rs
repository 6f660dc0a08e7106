use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::core::error::{constraint_violation, AppError, ArgumentErrors, Result};
use crate::features::categories::models::Category;
use crate::features::links::dtos::{LinkPayloadDto, LinkResponseDto};
use crate::features::links::models::Link;

/// Link row joined with its category, aliased so both fit one SELECT.
#[derive(Debug, FromRow)]
struct LinkWithCategoryRow {
    id: i64,
    name: String,
    link: String,
    category_id: i64,
    active: Option<DateTime<Utc>>,
    created: DateTime<Utc>,
    category_name: String,
    category_parent_id: Option<i64>,
    category_active: Option<DateTime<Utc>>,
    category_created: DateTime<Utc>,
}

impl From<LinkWithCategoryRow> for LinkResponseDto {
    fn from(row: LinkWithCategoryRow) -> Self {
        let category = Category {
            id: row.category_id,
            name: row.category_name,
            parent_id: row.category_parent_id,
            active: row.category_active,
            created: row.category_created,
        };
        let link = Link {
            id: row.id,
            name: row.name,
            link: row.link,
            category_id: row.category_id,
            active: row.active,
            created: row.created,
        };
        LinkResponseDto::new(link, category)
    }
}

/// Service for link operations
pub struct LinkService {
    pool: PgPool,
}

impl LinkService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List active links ordered by id with the given window applied,
    /// each with its category embedded.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<LinkResponseDto>> {
        let rows = sqlx::query_as::<_, LinkWithCategoryRow>(
            r#"
            SELECT l.id, l.name, l.link, l.category_id, l.active, l.created,
                   c.name AS category_name, c.parent_id AS category_parent_id,
                   c.active AS category_active, c.created AS category_created
            FROM links l
            JOIN categories c ON c.id = l.category_id
            WHERE l.active IS NULL
            ORDER BY l.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list links: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lookup regardless of active state; soft-deleted rows are found.
    pub async fn get(&self, id: i64) -> Result<LinkResponseDto> {
        let row = sqlx::query_as::<_, LinkWithCategoryRow>(
            r#"
            SELECT l.id, l.name, l.link, l.category_id, l.active, l.created,
                   c.name AS category_name, c.parent_id AS category_parent_id,
                   c.active AS category_active, c.created AS category_created
            FROM links l
            JOIN categories c ON c.id = l.category_id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get link by id: {:?}", e);
            AppError::Database(e)
        })?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Link with id: {} does not exist.", id)))
    }

    pub async fn create(&self, dto: LinkPayloadDto) -> Result<LinkResponseDto> {
        let (category, errors) = self.run_business_checks(&dto, None).await?;
        let (Some(category), true) = (category, errors.is_empty()) else {
            return Err(AppError::Validation(errors));
        };

        let link = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (name, link, category_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, link, category_id, active, created
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.link)
        .bind(dto.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &dto))?;

        tracing::info!("Link created: id={}, name={:?}", link.id, link.name);
        Ok(LinkResponseDto::new(link, category))
    }

    /// Replace name, URL and category in place; id, created and active
    /// state are preserved.
    pub async fn update(&self, id: i64, dto: LinkPayloadDto) -> Result<LinkResponseDto> {
        let (category, errors) = self.run_business_checks(&dto, Some(id)).await?;
        let (Some(category), true) = (category, errors.is_empty()) else {
            return Err(AppError::Validation(errors));
        };

        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET name = $1, link = $2, category_id = $3
            WHERE id = $4
            RETURNING id, name, link, category_id, active, created
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.link)
        .bind(dto.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &dto))?;

        link.map(|link| LinkResponseDto::new(link, category))
            .ok_or_else(|| AppError::NotFound(format!("Link with id: {} does not exist.", id)))
    }

    /// Soft-delete: stamp `active` and return the now-inactive row.
    pub async fn soft_delete(&self, id: i64) -> Result<LinkResponseDto> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET active = now()
            WHERE id = $1
            RETURNING id, name, link, category_id, active, created
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to soft-delete link: {:?}", e);
            AppError::Database(e)
        })?;

        let Some(link) = link else {
            return Err(AppError::NotFound(format!(
                "Link with id: {} does not exist.",
                id
            )));
        };
        let category = self.find_category(link.category_id).await?.ok_or_else(|| {
            AppError::Internal(format!(
                "Category {} referenced by link {} is missing",
                link.category_id, link.id
            ))
        })?;
        Ok(LinkResponseDto::new(link, category))
    }

    /// Uniqueness and existence checks shared by create and update;
    /// failures are collected so the client sees all of them at once.
    async fn run_business_checks(
        &self,
        dto: &LinkPayloadDto,
        except_id: Option<i64>,
    ) -> Result<(Option<Category>, ArgumentErrors)> {
        let mut errors = ArgumentErrors::new();
        if self.exists_by_name(&dto.name, except_id).await? {
            errors.push_field(
                "name",
                format!("Link with name: {} already exists.", dto.name),
            );
        }
        if self.exists_by_link(&dto.link, except_id).await? {
            errors.push_field(
                "link",
                format!("Link with link: {} already exists.", dto.link),
            );
        }
        let category = self.find_category(dto.category_id).await?;
        if category.is_none() {
            errors.push_field(
                "categoryId",
                format!("Category with id: {} does not exist.", dto.category_id),
            );
        }
        Ok((category, errors))
    }

    /// Name uniqueness spans all rows, active or not.
    async fn exists_by_name(&self, name: &str, except_id: Option<i64>) -> Result<bool> {
        let row: Option<(i64,)> = match except_id {
            Some(id) => {
                sqlx::query_as("SELECT id FROM links WHERE name = $1 AND id <> $2")
                    .bind(name)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as("SELECT id FROM links WHERE name = $1")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to check link name: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(row.is_some())
    }

    /// URL uniqueness spans all rows, active or not.
    async fn exists_by_link(&self, link: &str, except_id: Option<i64>) -> Result<bool> {
        let row: Option<(i64,)> = match except_id {
            Some(id) => {
                sqlx::query_as("SELECT id FROM links WHERE link = $1 AND id <> $2")
                    .bind(link)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as("SELECT id FROM links WHERE link = $1")
                    .bind(link)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to check link url: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(row.is_some())
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, parent_id, active, created FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by id: {:?}", e);
            AppError::Database(e)
        })
    }

    /// A concurrent write can slip past the pre-checks; the database
    /// then reports the constraint they were guarding. Map it back to
    /// the same 400 field error instead of a 500.
    fn write_error(error: sqlx::Error, dto: &LinkPayloadDto) -> AppError {
        match constraint_violation(&error) {
            Some("links_name_key") => AppError::Validation(ArgumentErrors::field(
                "name",
                format!("Link with name: {} already exists.", dto.name),
            )),
            Some("links_link_key") => AppError::Validation(ArgumentErrors::field(
                "link",
                format!("Link with link: {} already exists.", dto.link),
            )),
            Some("links_category_id_fkey") => AppError::Validation(ArgumentErrors::field(
                "categoryId",
                format!("Category with id: {} does not exist.", dto.category_id),
            )),
            _ => {
                tracing::error!("Failed to write link: {:?}", error);
                AppError::Database(error)
            }
        }
    }
}
