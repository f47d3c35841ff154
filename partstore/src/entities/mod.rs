pub mod category;
pub mod product;
pub mod product_image;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use product::{Product, ProductCreate, ProductDetail, ProductUpdate};
pub use product_image::{ProductImage, ProductImageCreate};
