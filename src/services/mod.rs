pub mod comic_service;
pub mod image_fetcher;

pub use comic_service::{ComicService, FetchedComic};
pub use image_fetcher::{download_picture, TempImage};
