// Domain-layer modules and shared errors/models
pub mod advisor {
    pub use crate::advisor::*;
}

pub mod profile {
    pub use crate::profile::*;
}

pub mod ranker {
    pub use crate::ranker::*;
}

pub mod rules {
    pub use crate::rules::*;
}

pub mod responder {
    pub use crate::responder::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
