pub mod bitset;
pub mod commondir;
pub mod hash;
pub mod option_ext;
pub mod path_ext;
pub mod rayon;
