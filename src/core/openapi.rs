use utoipa::{Modify, OpenApi};

use crate::core::error::{ArgumentError, ErrorBody};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::links::{dtos as links_dtos, handlers as links_handlers};
use crate::shared::response::Envelope;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Links
        links_handlers::list_links,
        links_handlers::create_link,
        links_handlers::get_link,
        links_handlers::replace_link,
        links_handlers::delete_link,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::get_category,
        categories_handlers::replace_category,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            // Errors
            ErrorBody,
            ArgumentError,
            // Categories
            categories_dtos::CategoryPayloadDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryDetailDto,
            categories_dtos::CategoryListDto,
            Envelope<categories_dtos::CategoryResponseDto>,
            Envelope<categories_dtos::CategoryListDto>,
            // Links
            links_dtos::LinkPayloadDto,
            links_dtos::LinkResponseDto,
            links_dtos::LinkListDto,
            Envelope<links_dtos::LinkResponseDto>,
            Envelope<links_dtos::LinkListDto>,
        )
    ),
    tags(
        (name = "links", description = "Link management"),
        (name = "categories", description = "Category management")
    )
)]
pub struct ApiDoc;

/// Applies the configured title/version/description to the generated doc
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
