pub mod asset;
pub mod error;
pub mod source;

#[cfg(test)]
pub mod stub;
