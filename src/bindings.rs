//! Binding adapters over [`Controller`].
//!
//! Two styles of wiring a container, both thin:
//!
//! - [`AutoAnimateDirective`]: configure once, apply to any number of
//!   containers, each application yields its own controller.
//! - [`AutoAnimateHandle`]: one explicit handle that may be configured
//!   (enabled/disabled) before its container exists and binds later.

use web_time::Instant;

use crate::engine::{Controller, TickReport};
use crate::error::AnimateResult;
use crate::host::{ElementId, LayoutHost};
use crate::options::AnimateOptions;

/// Reusable, pre-validated configuration.
#[derive(Debug, Clone, Default)]
pub struct AutoAnimateDirective {
    options: AnimateOptions,
}

impl AutoAnimateDirective {
    /// Validate `options` once up front.
    pub fn new(options: AnimateOptions) -> AnimateResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options every application uses.
    pub fn options(&self) -> &AnimateOptions {
        &self.options
    }

    /// Attach a new controller to `container`.
    pub fn apply<H: LayoutHost + ?Sized>(
        &self,
        host: &mut H,
        container: ElementId,
    ) -> AnimateResult<Controller> {
        Controller::attach(host, container, self.options.clone())
    }
}

/// Explicit handle whose container binds later.
#[derive(Debug)]
pub struct AutoAnimateHandle {
    options: AnimateOptions,
    enabled: bool,
    controller: Option<Controller>,
}

impl AutoAnimateHandle {
    /// Unbound, enabled handle.
    #[must_use]
    pub fn new(options: AnimateOptions) -> Self {
        Self {
            options,
            enabled: true,
            controller: None,
        }
    }

    /// Attach to `container`, replacing any previous binding.
    ///
    /// The enabled flag set before binding carries over.
    pub fn bind<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        container: ElementId,
    ) -> AnimateResult<()> {
        self.unbind(host);
        let mut controller =
            Controller::attach(host, container, self.options.clone())?;
        controller.set_enabled(self.enabled);
        self.controller = Some(controller);
        Ok(())
    }

    /// Tear down the current binding, if any.
    pub fn unbind<H: LayoutHost + ?Sized>(&mut self, host: &mut H) {
        if let Some(mut controller) = self.controller.take() {
            controller.teardown(host);
        }
    }

    /// Enable or disable animations, bound or not.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if let Some(controller) = self.controller.as_mut() {
            controller.set_enabled(enabled);
        }
    }

    /// Whether animations are enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a container is bound.
    pub fn is_bound(&self) -> bool {
        self.controller.as_ref().is_some_and(Controller::is_attached)
    }

    /// Tick the bound controller. Unbound handles report nothing.
    pub fn tick<H: LayoutHost + ?Sized>(
        &mut self,
        host: &mut H,
        now: Instant,
    ) -> TickReport {
        self.controller
            .as_mut()
            .map(|c| c.tick(host, now))
            .unwrap_or_default()
    }

    /// The bound controller.
    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }
}
