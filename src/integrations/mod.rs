//! Provider sources and the text-completion delegate.

pub mod completion {
    pub use crate::completion::*;
}

pub mod source {
    pub use crate::source::*;
}

pub mod directory {
    pub use crate::directory::*;
}
