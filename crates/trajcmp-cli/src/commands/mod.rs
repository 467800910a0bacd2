pub mod align;
pub mod compare;
pub mod duplicates;
pub mod measure;
pub mod trajectory;
