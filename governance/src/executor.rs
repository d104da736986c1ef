//! Permission-gated execution of a proposal's calls.

use crate::binding::SchemeConfig;
use crate::proposal::{Call, CallResult, ExecutionReport, ProposalCalls};
use dxgov_abi::encode_revert;
use dxgov_permissions::PermissionCheck;
use dxgov_types::{selector_of, Address, Bytes, Selector, Timestamp, U256};

/// How a call leaves the scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallRoute {
    /// `from` calls `to` itself, paying `value` from its own balance.
    Direct,
    /// `from` asks this controller to make the avatar call `to`.
    ViaController(Address),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundCall {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub route: CallRoute,
}

/// The ledger as seen by an executing scheme.
pub trait CallDispatcher {
    fn now(&self) -> Timestamp;

    fn check_permission(
        &self,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value: U256,
    ) -> PermissionCheck;

    /// Make one call. A failed call leaves no trace on the ledger.
    fn dispatch(&mut self, call: OutboundCall) -> CallResult;
}

/// Who executes, on whose behalf, under which registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionContext {
    pub scheme: Address,
    pub avatar: Address,
    pub controller: Option<Address>,
    pub permission_registry: Option<Address>,
}

impl ExecutionContext {
    pub fn new(scheme: Address, config: &SchemeConfig) -> Self {
        Self {
            scheme,
            avatar: config.avatar,
            controller: config.controller,
            permission_registry: config.permission_registry,
        }
    }

    /// The account whose permissions gate the calls: the avatar when acting
    /// through a controller, the scheme itself otherwise.
    pub fn acting_account(&self) -> Address {
        match self.controller {
            Some(_) => self.avatar,
            None => self.scheme,
        }
    }

    /// Controller calls are made by the scheme; with a controller, every
    /// other call is made by the avatar through it.
    pub fn route(&self, call: &Call) -> OutboundCall {
        let route = match self.controller {
            Some(controller) if call.to != controller => CallRoute::ViaController(controller),
            _ => CallRoute::Direct,
        };
        OutboundCall {
            from: self.scheme,
            to: call.to,
            data: call.data.clone(),
            value: call.value,
            route,
        }
    }

    fn check(&self, dispatcher: &dyn CallDispatcher, call: &Call) -> PermissionCheck {
        match self.permission_registry {
            // A scheme can always manage its own permissions.
            Some(registry) if registry != call.to => dispatcher.check_permission(
                registry,
                self.acting_account(),
                call.to,
                selector_of(&call.data),
                call.value,
            ),
            _ => PermissionCheck::bypass(),
        }
    }
}

/// Runs the calls of one proposal in order.
#[derive(Clone, Copy, Debug)]
pub struct Executor {
    context: ExecutionContext,
}

impl Executor {
    pub fn new(context: ExecutionContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Execute every call, stopping at the first one the permission registry
    /// refuses. Calls made before the refusal keep their effects. A reverted
    /// call is recorded and execution moves on.
    pub fn run(&self, calls: &ProposalCalls, dispatcher: &mut dyn CallDispatcher) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for (index, call) in calls.iter().enumerate() {
            let check = self.context.check(dispatcher, call);
            if let Some(denied) = check.denied {
                tracing::warn!(
                    scheme = %self.context.scheme,
                    index,
                    target = %call.to,
                    reason = %denied,
                    "call denied by permission registry"
                );
                report.results.push(CallResult::reverted(encode_revert(denied.to_string())));
                report.denied = Some((index, denied));
                break;
            }

            let result = dispatcher.dispatch(self.context.route(call));
            if result.success {
                tracing::debug!(scheme = %self.context.scheme, index, target = %call.to, "call succeeded");
            } else {
                tracing::debug!(
                    scheme = %self.context.scheme,
                    index,
                    target = %call.to,
                    reason = %result.revert_reason().unwrap_or_default(),
                    "call reverted"
                );
            }
            report.results.push(result);
        }
        report
    }
}
