pub mod recommendation;
pub mod root_ids;
pub mod work;

pub use recommendation::Recommendation;
pub use root_ids::RootIds;
pub use work::{MAX_SUBJECTS, Work};
