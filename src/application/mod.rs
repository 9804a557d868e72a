pub mod assay;
pub mod augment;
pub mod cache;
pub mod normalize;
