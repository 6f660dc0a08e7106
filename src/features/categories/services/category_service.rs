use std::collections::{HashMap, HashSet};

use sqlx::PgPool;

use crate::core::error::{constraint_violation, AppError, ArgumentErrors, Result};
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryPayloadDto, CategoryResponseDto,
};
use crate::features::categories::models::Category;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List active categories in detail mode (parent embedded),
    /// ordered by id with the given window applied.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<CategoryDetailDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, parent_id, active, created
            FROM categories
            WHERE active IS NULL
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        let parents = self.find_parents(&categories).await?;
        Ok(categories
            .into_iter()
            .map(|category| {
                let parent = category.parent_id.and_then(|id| parents.get(&id).cloned());
                CategoryDetailDto::new(category, parent)
            })
            .collect())
    }

    /// One lookup for all distinct parent ids of a result page.
    async fn find_parents(&self, categories: &[Category]) -> Result<HashMap<i64, Category>> {
        let ids: Vec<i64> = categories
            .iter()
            .filter_map(|category| category.parent_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, parent_id, active, created FROM categories WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load parent categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    /// Lookup regardless of active state; soft-deleted rows are found.
    pub async fn find(&self, id: i64) -> Result<Option<Category>> {
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

    pub async fn get(&self, id: i64) -> Result<CategoryResponseDto> {
        self.find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category with id: {} does not exist.", id)))
    }

    pub async fn create(&self, dto: CategoryPayloadDto) -> Result<CategoryResponseDto> {
        let mut errors = ArgumentErrors::new();
        if self.exists_by_name(&dto.name, None).await? {
            errors.push_field(
                "name",
                format!("Category with name: {} already exists.", dto.name),
            );
        }
        let parent_id = self.checked_parent(dto.parent_id, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, parent_id)
            VALUES ($1, $2)
            RETURNING id, name, parent_id, active, created
            "#,
        )
        .bind(&dto.name)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &dto))?;

        tracing::info!("Category created: id={}, name={:?}", category.id, category.name);
        Ok(category.into())
    }

    /// Replace name and parent in place; id, created and active state
    /// are preserved.
    pub async fn update(&self, id: i64, dto: CategoryPayloadDto) -> Result<CategoryResponseDto> {
        let mut errors = ArgumentErrors::new();
        if self.exists_by_name(&dto.name, Some(id)).await? {
            errors.push_field(
                "name",
                format!("Category with name: {} already exists.", dto.name),
            );
        }
        let parent_id = self.checked_parent(dto.parent_id, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, parent_id = $2
            WHERE id = $3
            RETURNING id, name, parent_id, active, created
            "#,
        )
        .bind(&dto.name)
        .bind(parent_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &dto))?;

        category
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category with id: {} does not exist.", id)))
    }

    /// Soft-delete: stamp `active` and return the now-inactive row.
    pub async fn soft_delete(&self, id: i64) -> Result<CategoryResponseDto> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET active = now()
            WHERE id = $1
            RETURNING id, name, parent_id, active, created
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to soft-delete category: {:?}", e);
            AppError::Database(e)
        })?;

        category
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category with id: {} does not exist.", id)))
    }

    /// Name uniqueness spans all rows, active or not.
    async fn exists_by_name(&self, name: &str, except_id: Option<i64>) -> Result<bool> {
        let row: Option<(i64,)> = match except_id {
            Some(id) => {
                sqlx::query_as("SELECT id FROM categories WHERE name = $1 AND id <> $2")
                    .bind(name)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as("SELECT id FROM categories WHERE name = $1")
                    .bind(name)
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to check category name: {:?}", e);
            AppError::Database(e)
        })?;
        Ok(row.is_some())
    }

    /// parentId 0 (or below) means "no parent"; anything positive must
    /// reference an existing category.
    async fn checked_parent(
        &self,
        parent_id: i64,
        errors: &mut ArgumentErrors,
    ) -> Result<Option<i64>> {
        if parent_id <= 0 {
            return Ok(None);
        }
        if self.find(parent_id).await?.is_none() {
            errors.push_field(
                "parentId",
                format!("Category with id: {} does not exist.", parent_id),
            );
        }
        Ok(Some(parent_id))
    }

    /// A concurrent write can slip past the pre-checks; the database
    /// then reports the constraint they were guarding. Map it back to
    /// the same 400 field error instead of a 500.
    fn write_error(error: sqlx::Error, dto: &CategoryPayloadDto) -> AppError {
        match constraint_violation(&error) {
            Some("categories_name_key") => AppError::Validation(ArgumentErrors::field(
                "name",
                format!("Category with name: {} already exists.", dto.name),
            )),
            Some("categories_parent_id_fkey") => AppError::Validation(ArgumentErrors::field(
                "parentId",
                format!("Category with id: {} does not exist.", dto.parent_id),
            )),
            _ => {
                tracing::error!("Failed to write category: {:?}", error);
                AppError::Database(error)
            }
        }
    }
}
