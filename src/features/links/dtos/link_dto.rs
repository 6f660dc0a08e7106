use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::models::Category;
use crate::features::links::models::Link;
use crate::shared::validation::is_valid_url;

/// Request DTO for creating or replacing a link
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayloadDto {
    #[validate(length(min = 1, max = 50, message = "Length must be between [1, 50]."))]
    pub name: String,

    #[validate(
        length(max = 100, message = "Length must not be greater than 100."),
        custom(function = is_valid_url)
    )]
    pub link: String,

    pub category_id: i64,
}

/// Response DTO for a link, category embedded
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponseDto {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub category: CategoryResponseDto,
    /// false once soft-deleted
    pub active: bool,
    pub created: DateTime<Utc>,
}

impl LinkResponseDto {
    pub fn new(link: Link, category: Category) -> Self {
        Self {
            id: link.id,
            name: link.name,
            link: link.link,
            category: category.into(),
            active: link.active.is_none(),
            created: link.created,
        }
    }
}

/// Envelope payload for the link list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkListDto {
    pub links: Vec<LinkResponseDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> LinkPayloadDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn payload_accepts_well_formed_input() {
        let dto = payload(json!({
            "name": "Rust homepage",
            "link": "https://www.rust-lang.org",
            "categoryId": 1
        }));
        assert!(dto.validate().is_ok());
        assert_eq!(dto.category_id, 1);
    }

    #[test]
    fn payload_rejects_malformed_url() {
        let dto = payload(json!({
            "name": "nowhere",
            "link": "not a url",
            "categoryId": 1
        }));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn payload_rejects_over_long_url() {
        let url = format!("https://example.com/{}", "a".repeat(100));
        let dto = payload(json!({"name": "long", "link": url, "categoryId": 1}));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn response_embeds_the_category() {
        let created = chrono::Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let category = Category {
            id: 3,
            name: "tools".to_string(),
            parent_id: None,
            active: None,
            created,
        };
        let link = Link {
            id: 7,
            name: "ripgrep".to_string(),
            link: "https://github.com/BurntSushi/ripgrep".to_string(),
            category_id: 3,
            active: None,
            created,
        };
        let value = serde_json::to_value(LinkResponseDto::new(link, category)).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["category"]["id"], 3);
        assert_eq!(value["category"]["name"], "tools");
        assert_eq!(value["active"], true);
    }
}
