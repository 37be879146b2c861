pub mod category;
pub mod comment;
pub mod genre;
pub mod genre_title;
pub mod review;
pub mod title;
pub mod user;
