pub mod addr;
pub mod bitcursor;
pub mod inspector;
pub mod navigation;
pub mod selection;
pub mod space;
pub mod viewport;
