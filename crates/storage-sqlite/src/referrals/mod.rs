pub mod model;
pub mod repository;

pub use model::ReferralDB;
pub use repository::ReferralRepository;
