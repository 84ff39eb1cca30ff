pub mod address_dto;

pub use address_dto::{AddressPreviewDto, AddressResponseDto, ResolvedNodeDto};
