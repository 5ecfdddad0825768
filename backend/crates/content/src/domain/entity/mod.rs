pub mod author;
pub mod comment;
pub mod review;
pub mod taxon;
pub mod title;

pub use author::Author;
pub use comment::{Comment, NewComment};
pub use review::{NewReview, Review, ReviewChanges};
pub use taxon::{Taxon, TaxonKind};
pub use title::{Title, TitleChanges, TitleDraft, TitleFilter, TitleInput};
