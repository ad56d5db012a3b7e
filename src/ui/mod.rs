pub mod class_list;

#[cfg(feature = "gtk")]
pub use class_list::WidgetClassList;
pub use class_list::{ClassList, MemoryClassList};
