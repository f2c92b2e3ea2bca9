// tests/common/mod.rs
//
// Shared fakes for integration tests.

use std::sync::Mutex;

use anyhow::Result;
use vc_lead_sourcing::{ClassifiedRecord, LeadSink};

/// Records every delivery in memory; can be told to fail.
#[derive(Default)]
pub struct MemorySink {
    calls: Mutex<Vec<Vec<ClassifiedRecord>>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Vec<ClassifiedRecord>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LeadSink for MemorySink {
    async fn deliver(&self, leads: &[ClassifiedRecord]) -> Result<()> {
        if self.fail {
            anyhow::bail!("memory sink configured to fail");
        }
        self.calls.lock().unwrap().push(leads.to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
