use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::models::Category;

/// Request DTO for creating or replacing a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayloadDto {
    #[validate(length(min = 1, max = 50, message = "Length must be between [1, 50]."))]
    pub name: String,

    /// Parent category id; 0 (the default) means no parent
    #[serde(default)]
    pub parent_id: i64,
}

/// Response DTO for a category
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: i64,
    pub name: String,
    /// false once soft-deleted
    pub active: bool,
    pub created: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            active: c.active.is_none(),
            created: c.created,
        }
    }
}

/// Detail-mode response DTO: the category with its parent embedded.
/// The parent is itself serialized without its own parent.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetailDto {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub parent: Option<CategoryResponseDto>,
}

impl CategoryDetailDto {
    pub fn new(category: Category, parent: Option<Category>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            active: category.active.is_none(),
            created: category.created,
            parent: parent.map(Into::into),
        }
    }
}

/// Envelope payload for the category list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryListDto {
    pub categories: Vec<CategoryDetailDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn category(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: name.to_string(),
            parent_id,
            active: None,
            created: chrono::Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn active_flag_is_derived_from_the_timestamp() {
        let mut row = category(1, "tools", None);
        let dto: CategoryResponseDto = row.clone().into();
        assert!(dto.active);

        row.active = Some(chrono::Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        let dto: CategoryResponseDto = row.into();
        assert!(!dto.active);
    }

    #[test]
    fn detail_dto_embeds_parent_without_grandparent() {
        let parent = category(1, "software", None);
        let child = category(2, "editors", Some(1));
        let value = serde_json::to_value(CategoryDetailDto::new(child, Some(parent))).unwrap();
        assert_eq!(value["parent"]["id"], 1);
        assert_eq!(value["parent"]["name"], "software");
        assert!(value["parent"].get("parent").is_none());
    }

    #[test]
    fn detail_dto_serializes_missing_parent_as_null() {
        let value = serde_json::to_value(CategoryDetailDto::new(category(1, "root", None), None))
            .unwrap();
        assert_eq!(value["parent"], json!(null));
    }

    #[test]
    fn payload_rejects_empty_and_over_long_names() {
        let empty: CategoryPayloadDto = serde_json::from_value(json!({"name": ""})).unwrap();
        assert!(empty.validate().is_err());

        let long: CategoryPayloadDto =
            serde_json::from_value(json!({"name": "x".repeat(51)})).unwrap();
        assert!(long.validate().is_err());

        let ok: CategoryPayloadDto =
            serde_json::from_value(json!({"name": "tools", "parentId": 3})).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.parent_id, 3);
    }

    #[test]
    fn payload_parent_id_defaults_to_zero() {
        let dto: CategoryPayloadDto = serde_json::from_value(json!({"name": "tools"})).unwrap();
        assert_eq!(dto.parent_id, 0);
    }
}
