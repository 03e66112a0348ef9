pub mod compress;
pub mod decode;
pub mod source;
