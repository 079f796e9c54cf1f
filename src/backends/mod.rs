mod soft;

pub(crate) use soft::*;
