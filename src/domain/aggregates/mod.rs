//! Aggregates module
pub mod announcement;
pub mod cart;
pub mod collection;
pub mod discount;
pub mod order;
pub mod product;
pub mod user;
pub mod wishlist;

pub use announcement::Announcement;
pub use cart::{Cart, CartError, CartItem};
pub use collection::Collection;
pub use discount::{Discount, DiscountTerms, TargetType};
pub use order::{Order, OrderDetails};
pub use product::{PriceChange, Product, ProductDraft};
pub use user::{Profile, User};
pub use wishlist::{Wishlist, WishlistItem};
