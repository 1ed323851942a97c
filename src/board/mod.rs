pub(crate) mod anchor;
pub(crate) mod checkerboard;
pub(crate) mod gradient;
pub(crate) mod phase;
