mod read;
pub(crate) use read::{Read, Source};

mod write;
pub(crate) use write::Write;
