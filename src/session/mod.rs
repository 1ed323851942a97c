pub(crate) mod display;
pub(crate) mod export;
pub(crate) mod sink;
#[cfg(feature = "window")]
pub(crate) mod window;
pub(crate) mod worker;
