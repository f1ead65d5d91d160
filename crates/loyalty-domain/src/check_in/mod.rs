mod engine;
mod record;
mod repository;
mod value_objects;


pub use engine::CheckInEngine;
pub use record::CheckInRecord;
pub use repository::CheckInRepository;
pub use value_objects::{
    CheckInDecision, Multiplier, PointsAward, StreakAdvance, StreakTransition,
};
