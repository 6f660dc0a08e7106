pub mod link_dto;

pub use link_dto::{LinkListDto, LinkPayloadDto, LinkResponseDto};
