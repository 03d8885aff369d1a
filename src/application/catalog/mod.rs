mod catalog_service;
mod errors;

#[allow(unused_imports)]
pub use catalog_service::{
    create_item, get_item, get_user, list_items, update_item, update_item_image,
};
#[allow(unused_imports)]
pub use errors::{CatalogError, Result};
