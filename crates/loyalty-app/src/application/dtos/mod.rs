mod check_in_dto;
mod user_dto;

pub use check_in_dto::{CheckInDto, CheckInHistoryDto, CheckInResponseDto, NftUsageDto};
pub use user_dto::UserDto;
