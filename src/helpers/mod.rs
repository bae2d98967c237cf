pub mod non_empty_map;

pub use non_empty_map::NonEmptyMap;
