use crate::adapters::object_storage::ObjectStorage;
use crate::common::context::Context;
use crate::repositories::messages::MessageCollection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub messages: Arc<dyn MessageCollection>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Context for AppState {
    fn messages(&self) -> &dyn MessageCollection {
        self.messages.as_ref()
    }

    fn storage(&self) -> &dyn ObjectStorage {
        self.storage.as_ref()
    }
}
