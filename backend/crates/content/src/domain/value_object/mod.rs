//! Value Objects

pub mod release_year;
pub mod score;
pub mod slug;

pub use release_year::ReleaseYear;
pub use score::Score;
pub use slug::Slug;
