use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use mirrorlink_types::error::GatewayError;
use mirrorlink_types::models::{Link, Repository};

use crate::WebhookGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Register {
        repository_id: Uuid,
        link_id: Uuid,
    },
    Deregister {
        repository_id: Uuid,
        hook_ids: Vec<String>,
    },
}

/// Recording stand-in for the remote webhook API. Returns a fixed hook set on
/// registration and keeps every call for assertions.
pub struct MockGateway {
    hook_ids: Vec<String>,
    fail_register: AtomicBool,
    fail_deregister: AtomicBool,
    calls: Mutex<Vec<GatewayCall>>,
}

impl MockGateway {
    pub fn returning(hook_ids: Vec<String>) -> Self {
        Self {
            hook_ids,
            fail_register: AtomicBool::new(false),
            fail_deregister: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_register(&self) {
        self.fail_register.store(true, Ordering::SeqCst);
    }

    pub fn fail_deregister(&self) {
        self.fail_deregister.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn register_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::Register { .. }))
            .count()
    }

    pub fn deregister_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::Deregister { .. }))
            .count()
    }
}

#[async_trait]
impl WebhookGateway for MockGateway {
    async fn register_webhooks(
        &self,
        repository: &Repository,
        link: &Link,
    ) -> Result<Vec<String>, GatewayError> {
        self.calls.lock().unwrap().push(GatewayCall::Register {
            repository_id: repository.id,
            link_id: link.id,
        });
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote {
                status: 502,
                body: "register refused".into(),
            });
        }
        Ok(self.hook_ids.clone())
    }

    async fn deregister_webhooks(
        &self,
        repository: &Repository,
        hook_ids: &[String],
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(GatewayCall::Deregister {
            repository_id: repository.id,
            hook_ids: hook_ids.to_vec(),
        });
        if self.fail_deregister.load(Ordering::SeqCst) {
            return Err(GatewayError::Remote {
                status: 502,
                body: "deregister refused".into(),
            });
        }
        Ok(())
    }
}
