//! Catalog SDK
//!
//! Contract types shared by the catalog module and its consumers:
//!
//! - [`models`] - catalog, review and account models plus their create/patch forms
//! - [`query`] - title filters and page-number pagination

pub mod models;
pub mod query;

pub use models::{
    AccessToken, Authored, Category, Comment, CommentPatch, Genre, NewComment, NewReview,
    NewTitle, NewUser, ProfilePatch, Review, ReviewPatch, SignUp, Taxon, Title, TitlePatch,
    TokenRequest, User, UserPatch,
};
pub use query::{MAX_OFFSET, Page, PageRequest, TitleFilter};
pub use yamdb_security::Role;
