pub mod http_probe;
pub mod object_store;
pub mod secret;
pub mod vault;

pub use http_probe::{HttpProbe, ReqwestProbe};
pub use object_store::{
    select_current_archive, ArchiveObject, ObjectStore, ObjectStoreCredentials,
    ObjectStoreFactory, S3Factory,
};
pub use vault::VaultClient;
