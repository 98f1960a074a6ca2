// In-memory `ConfigStore` double for translator tests.
//
// Replies are scripted per "<verb> <path>" line; every call is recorded in
// the same notation so tests can assert the exact remote sequence.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use vyos_api::{ConfigPath, ConfigStore, Operation, StoreReply, TreeNode};

#[derive(Debug, Clone)]
pub enum Script {
    Reply(StoreReply),
    Status(u16),
    Timeout,
    /// Never answers; only cancellation gets the caller out.
    Hang,
}

#[derive(Debug, Default)]
pub struct ScriptedStore {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

fn verb(op: Operation) -> &'static str {
    match op {
        Operation::ShowConfig => "show",
        Operation::Set => "set",
        Operation::Delete => "delete",
    }
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for `line`, e.g. `"set vrf name MGMT table 100"`.
    pub fn on(mut self, line: &str, script: Script) -> Self {
        self.scripts.insert(line.to_owned(), script);
        self
    }

    /// Answer `show <path>` with `data`.
    pub fn showing(self, path: &str, data: Value) -> Self {
        self.on(
            &format!("show {path}"),
            Script::Reply(StoreReply::ok(Some(TreeNode::from(data)))),
        )
    }

    /// Answer `line` with `success: false` and `message`.
    pub fn refusing(self, line: &str, message: &str) -> Self {
        self.on(line, Script::Reply(StoreReply::rejected(message)))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, op: Operation, path: &ConfigPath) -> Result<StoreReply, vyos_api::Error> {
        let line = format!("{} {path}", verb(op));
        self.calls.lock().unwrap().push(line.clone());
        match self.scripts.get(&line).cloned() {
            None => Ok(StoreReply::ok(None)),
            Some(Script::Reply(reply)) => Ok(reply),
            Some(Script::Status(status)) => Err(vyos_api::Error::Status {
                status,
                message: None,
            }),
            Some(Script::Timeout) => Err(vyos_api::Error::Timeout { timeout_secs: 30 }),
            Some(Script::Hang) => std::future::pending().await,
        }
    }
}

impl ConfigStore for ScriptedStore {
    async fn show_config(&self, path: &ConfigPath) -> Result<StoreReply, vyos_api::Error> {
        self.answer(Operation::ShowConfig, path).await
    }

    async fn set(&self, path: &ConfigPath) -> Result<StoreReply, vyos_api::Error> {
        self.answer(Operation::Set, path).await
    }

    async fn delete(&self, path: &ConfigPath) -> Result<StoreReply, vyos_api::Error> {
        self.answer(Operation::Delete, path).await
    }
}
