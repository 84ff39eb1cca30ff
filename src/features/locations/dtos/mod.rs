pub mod location_dto;

pub use location_dto::{
    CreateLocationNodeDto, LocationNodeDto, LocationQuery, NodeDeletionDto, TranslationInputDto,
    TranslationResponseDto, UpdateLocationNodeDto, UpsertTranslationDto,
};
