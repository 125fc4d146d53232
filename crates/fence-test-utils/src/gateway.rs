//! [`FakeGateway`]: an in-memory native engine with failure injection.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use fence_meta::{FenceCommand, FenceId};
use fence_native::{Error, NativeGateway, Platform, Result};

/// A call received by a [`FakeGateway`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Init,
    Register(FenceCommand),
    Deregister(FenceId),
}

#[derive(Default)]
struct State {
    initialized: bool,
    fail_init: bool,
    fail_all_registers: bool,
    fail_register_ids: HashSet<FenceId>,
    fail_deregister_ids: HashSet<FenceId>,
    fail_next_registers: usize,
    fail_next_deregisters: usize,
    regions: BTreeMap<FenceId, FenceCommand>,
    calls: Vec<GatewayCall>,
}

/// Scriptable [`NativeGateway`].
///
/// Clones share state, so a test can keep one clone to script failures and
/// inspect calls while a session owns the other.
///
/// # Example
///
/// ```rust
/// use fence_test_utils::FakeGateway;
///
/// let gateway = FakeGateway::new();
/// gateway.fail_next_register();
/// assert!(gateway.calls().is_empty());
/// ```
#[derive(Clone)]
pub struct FakeGateway {
    platform: Platform,
    state: Arc<Mutex<State>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    /// An Android gateway that accepts everything.
    pub fn new() -> Self {
        Self::on(Platform::Android)
    }

    pub fn on(platform: Platform) -> Self {
        Self {
            platform,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn fail_init(&self) {
        self.lock().fail_init = true;
    }

    /// Fail every register call until cleared.
    pub fn fail_all_registers(&self, fail: bool) {
        self.lock().fail_all_registers = fail;
    }

    pub fn fail_register_for(&self, id: &FenceId) {
        self.lock().fail_register_ids.insert(id.clone());
    }

    pub fn fail_deregister_for(&self, id: &FenceId) {
        self.lock().fail_deregister_ids.insert(id.clone());
    }

    /// Fail the next register call only.
    pub fn fail_next_register(&self) {
        self.lock().fail_next_registers += 1;
    }

    /// Fail the next deregister call only.
    pub fn fail_next_deregister(&self) {
        self.lock().fail_next_deregisters += 1;
    }

    /// Clear every scripted failure.
    pub fn heal(&self) {
        let mut state = self.lock();
        state.fail_init = false;
        state.fail_all_registers = false;
        state.fail_register_ids.clear();
        state.fail_deregister_ids.clear();
        state.fail_next_registers = 0;
        state.fail_next_deregisters = 0;
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Regions currently monitored, ordered by id.
    pub fn regions(&self) -> Vec<FenceCommand> {
        self.lock().regions.values().cloned().collect()
    }

    pub fn region(&self, id: &FenceId) -> Option<FenceCommand> {
        self.lock().regions.get(id).cloned()
    }

    pub fn is_registered(&self, id: &FenceId) -> bool {
        self.lock().regions.contains_key(id)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl NativeGateway for FakeGateway {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn init(&self) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(GatewayCall::Init);
        if state.fail_init {
            return Err(Error::permission("location access refused"));
        }
        state.initialized = true;
        Ok(())
    }

    async fn register(&self, command: &FenceCommand) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(GatewayCall::Register(command.clone()));
        if !state.initialized {
            return Err(Error::NotInitialized);
        }
        if state.fail_next_registers > 0 {
            state.fail_next_registers -= 1;
            return Err(Error::platform(&command.id, "scripted register failure"));
        }
        if state.fail_all_registers || state.fail_register_ids.contains(&command.id) {
            return Err(Error::platform(&command.id, "scripted register failure"));
        }
        state.regions.insert(command.id.clone(), command.clone());
        Ok(())
    }

    async fn deregister(&self, id: &FenceId) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(GatewayCall::Deregister(id.clone()));
        if !state.initialized {
            return Err(Error::NotInitialized);
        }
        if state.fail_next_deregisters > 0 {
            state.fail_next_deregisters -= 1;
            return Err(Error::platform(id, "scripted deregister failure"));
        }
        if state.fail_deregister_ids.contains(id) {
            return Err(Error::platform(id, "scripted deregister failure"));
        }
        state.regions.remove(id);
        Ok(())
    }
}
