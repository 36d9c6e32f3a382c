//! Stage 2: Provisioning
//!
//! Creates one remote project per repository, named after the repository's
//! directory. Each creation is a single HTTP round trip run in the worker
//! pool, and every answer is classified into created / already exists /
//! failed. A request that never got an answer is a failure of that item
//! only.

use log::{debug, info};

use super::Stage;
use crate::classify::classify;
use crate::config::Visibility;
use crate::outcome::{Batch, Outcome, WorkItem};
use crate::pool::WorkerPool;
use crate::provider::{AccessToken, CreateRepository, HostingProvider, Namespace};
use crate::report::Reporter;

/// Everything a provisioning worker needs besides the item.
pub struct Provisioning<'a> {
    pub provider: &'a dyn HostingProvider,
    pub namespace: &'a Namespace,
    pub token: &'a AccessToken,
    pub visibility: Visibility,
}

impl Provisioning<'_> {
    /// Create the project for one repository and classify the answer.
    pub fn provision_one(&self, item: &WorkItem) -> Outcome {
        let name = item.base_name();
        let request = CreateRepository {
            name: &name,
            path: &name,
            visibility: self.visibility,
            namespace: self.namespace,
            token: self.token,
        };

        match self.provider.create_repository(&request) {
            Ok(response) => {
                let collision_location = self.provider.repository_url(self.namespace, &name);
                let classification =
                    classify(&response, self.provider.response_shape(), &collision_location);
                debug!("{} -> {:?}", item, classification.kind);
                classification.into_outcome(item.clone())
            }
            Err(e) => {
                debug!("{} -> request failed: {}", item, e);
                Outcome::failed(item.clone(), None, e.to_string())
            }
        }
    }

    /// Provision every item. The batch holds one outcome per item.
    pub fn run(&self, items: Vec<WorkItem>, pool: &WorkerPool, reporter: &dyn Reporter) -> Batch {
        let progress = reporter.progress(Stage::Provisioning, items.len() as u64);
        let pool = pool.clone().with_progress(progress.clone());

        let outcomes = pool.run(
            items,
            |item| self.provision_one(item),
            |item, message| Outcome::failed(item.clone(), None, message),
        );
        progress.finish_and_clear();

        let batch = Batch::new(outcomes);
        info!("provisioning finished: {}", batch.counts());
        batch
    }
}
