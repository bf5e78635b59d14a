mod api;

pub use api::BuilderApi;
