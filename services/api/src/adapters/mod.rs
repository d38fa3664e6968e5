pub mod db;
pub mod memory;
pub mod uploads;

pub use db::DbAdapter;
pub use memory::InMemoryDb;
pub use uploads::LocalUploadStore;
