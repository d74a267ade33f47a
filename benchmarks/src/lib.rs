#[cfg(feature = "dispatch")]
pub mod dispatch;

#[cfg(feature = "async")]
pub mod asnc;
