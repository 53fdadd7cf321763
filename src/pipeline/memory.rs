//! Software provisioner used when no packet-processing device is attached.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::pipeline::{FlowRule, PipelineProvisioner, PipelineSpec, ProvisionerError};

/// Hands out increasing identifiers (starting at 1) and remembers what was
/// provisioned.
#[derive(Debug)]
pub struct InMemoryProvisioner {
    next_id: AtomicU64,
    pipelines: Mutex<Vec<(u64, PipelineSpec)>>,
    rules: Mutex<Vec<(u64, FlowRule)>>,
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pipelines: Mutex::new(Vec::new()),
            rules: Mutex::new(Vec::new()),
        }
    }

    pub fn pipelines(&self) -> Vec<(u64, PipelineSpec)> {
        self.pipelines.lock().clone()
    }

    pub fn rules(&self) -> Vec<(u64, FlowRule)> {
        self.rules.lock().clone()
    }

    fn allocate(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineProvisioner for InMemoryProvisioner {
    async fn create_pipeline(&self, spec: &PipelineSpec) -> Result<Option<u64>, ProvisionerError> {
        let id = self.allocate();
        self.pipelines.lock().push((id, spec.clone()));
        tracing::debug!(pipeline_id = id, kind = %spec.kind, "Pipeline recorded in memory");
        Ok(Some(id))
    }

    async fn add_rule(&self, rule: &FlowRule) -> Result<Option<u64>, ProvisionerError> {
        let id = self.allocate();
        self.rules.lock().push((id, rule.clone()));
        tracing::debug!(rule_id = id, server_ip = %rule.server_ip, port = rule.port, "Flow rule recorded in memory");
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_unique_and_positive() {
        let provisioner = InMemoryProvisioner::new();
        let p = provisioner
            .create_pipeline(&PipelineSpec::hairpin(1))
            .await
            .unwrap()
            .unwrap();
        let r = provisioner
            .add_rule(&FlowRule { server_ip: "10.0.0.1".into(), port: 80 })
            .await
            .unwrap()
            .unwrap();

        assert!(p > 0);
        assert_ne!(p, r);
        assert_eq!(provisioner.pipelines().len(), 1);
        assert_eq!(provisioner.rules()[0].1.server_ip, "10.0.0.1");
    }
}
