//! Shared, serialised access to a [`VisualisationHost`].

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::base::TextEdit;
use crate::tasks::{TaskError, TaskFailure, TaskId, TaskQueuer};
use crate::visualisation::{ExtractionReport, VisualisationModel};

use super::state::{HostError, VisualisationHost};

/// A host shared between an editor and its renderers.
///
/// Reads lock the host briefly. Every write goes through the session's
/// [`TaskQueuer`] and re-extracts the models once it has been applied, so
/// writes run one at a time in submission order.
#[derive(Clone)]
pub struct Session {
    host: Arc<Mutex<VisualisationHost>>,
    queuer: TaskQueuer,
}

impl Session {
    /// Wrap `host`, using its task configuration for the queuer.
    pub fn new(host: VisualisationHost, runtime: Handle) -> Self {
        let options = host.config().tasks.queuer_options();
        Self {
            host: Arc::new(Mutex::new(host)),
            queuer: TaskQueuer::new(runtime, options),
        }
    }

    /// A session on the runtime of the calling context, if there is one.
    pub fn current(host: VisualisationHost) -> Option<Self> {
        Handle::try_current().ok().map(|runtime| Self::new(host, runtime))
    }

    /// Run `read` against the current host state.
    pub fn read<R>(&self, read: impl FnOnce(&VisualisationHost) -> R) -> R {
        read(&self.host.lock())
    }

    pub fn models(&self) -> Vec<VisualisationModel> {
        self.read(|host| host.models().to_vec())
    }

    pub fn report(&self) -> ExtractionReport {
        self.read(|host| host.report().clone())
    }

    /// Queue a mutation of the host, followed by a model re-extraction.
    pub fn submit<F>(&self, mutate: F) -> TaskId
    where
        F: FnOnce(&mut VisualisationHost) -> Result<(), HostError> + Send + 'static,
    {
        let host = Arc::clone(&self.host);
        self.queuer.submit(async move { write(&host, mutate) })
    }

    /// Queue a write of `new_text` into the node behind model `uid`.
    pub fn submit_model_edit(&self, uid: Uuid, new_text: impl Into<String>) -> TaskId {
        let new_text = new_text.into();
        self.submit(move |host| host.apply_model_edit(uid, &new_text).map(|_| ()))
    }

    /// Queue a full content update of a file.
    pub fn submit_file_update(&self, path: impl Into<PathBuf>, text: impl Into<String>) -> TaskId {
        let path = path.into();
        let text = text.into();
        self.submit(move |host| host.set_file_content(path, text))
    }

    /// Queue an editor change to a file.
    pub fn submit_edit(&self, path: impl Into<PathBuf>, edit: TextEdit) -> TaskId {
        let path = path.into();
        self.submit(move |host| host.apply_edit(&path, &edit))
    }

    /// Resolves once every queued write has run.
    pub async fn wait_idle(&self) {
        self.queuer.wait_idle().await
    }

    pub fn queuer(&self) -> &TaskQueuer {
        &self.queuer
    }

    pub fn take_failures(&self) -> Vec<TaskFailure> {
        self.queuer.take_failures()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("queuer", &self.queuer).finish_non_exhaustive()
    }
}

/// Apply one write under the lock. Models are re-extracted even when the
/// write fails, since a failed replacement may still have changed the text.
fn write<F>(host: &Mutex<VisualisationHost>, mutate: F) -> Result<(), TaskError>
where
    F: FnOnce(&mut VisualisationHost) -> Result<(), HostError>,
{
    let mut host = host.lock();
    let result = mutate(&mut *host);
    host.extract_models_for_all_source_files();
    result.map_err(TaskError::failed)
}
