pub mod publish_flow;

pub use publish_flow::publish_picture;
