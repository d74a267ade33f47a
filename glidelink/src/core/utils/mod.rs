//! Common utils.

mod bounded;
pub mod nmea;
#[cfg(test)]
pub(crate) mod test;

#[doc(inline)]
pub use bounded::BoundedText;
