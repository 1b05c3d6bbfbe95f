//! Nullable access control: a caller you set by hand.

use ballot_election::AccessControl;
use ballot_types::Principal;
use std::sync::Mutex;

/// Access control with a fixed administrator and a switchable caller.
///
/// The caller starts as the administrator. The current caller is shared by
/// all threads; concurrent tests that need distinct callers per thread should
/// supply their own implementation.
pub struct NullAccessControl {
    administrator: Principal,
    caller: Mutex<Principal>,
}

impl NullAccessControl {
    pub fn new(administrator: Principal) -> Self {
        Self {
            caller: Mutex::new(administrator.clone()),
            administrator,
        }
    }

    /// Make `principal` the caller of subsequent operations.
    pub fn act_as(&self, principal: &Principal) {
        *self.caller.lock().unwrap() = principal.clone();
    }

    /// Switch back to the administrator.
    pub fn act_as_admin(&self) {
        let admin = self.administrator.clone();
        self.act_as(&admin);
    }

    pub fn administrator(&self) -> &Principal {
        &self.administrator
    }
}

impl AccessControl for NullAccessControl {
    fn current_caller(&self) -> Principal {
        self.caller.lock().unwrap().clone()
    }

    fn is_administrator(&self, principal: &Principal) -> bool {
        *principal == self.administrator
    }
}
