pub mod vk_client;
pub mod xkcd_client;

pub use vk_client::{SavedPhoto, UploadedPhoto, VkClient};
pub use xkcd_client::{Comic, XkcdClient};
