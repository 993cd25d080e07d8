pub mod item;
pub mod roadmap;

pub use item::{Dependency, EdgeId, Item, ItemAttributes, ItemId};
pub use roadmap::Roadmap;
