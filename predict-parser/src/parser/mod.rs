pub(crate) mod error;
pub(crate) mod ll1;
pub(crate) mod table;
pub(crate) mod trace;
pub(crate) mod traits;
