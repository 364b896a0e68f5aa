mod model;
mod store;

pub use model::MovieRecord;
pub use store::RecordStore;
