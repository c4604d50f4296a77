pub mod model;
pub mod repository;

pub use model::RewardDB;
pub use repository::RewardRepository;
