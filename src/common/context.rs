use crate::adapters::object_storage::ObjectStorage;
use crate::repositories::messages::MessageCollection;

pub trait Context: Sync + Send {
    fn messages(&self) -> &dyn MessageCollection;
    fn storage(&self) -> &dyn ObjectStorage;
}
