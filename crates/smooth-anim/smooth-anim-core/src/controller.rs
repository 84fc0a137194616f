//! Action-driven controller.
//!
//! Every action updates the persisted active set on whichever side processes
//! it. Attachment and clip effects run only when the controller's sink is a
//! presentation sink. `last` rebuilds the whole presentation from the persisted
//! bits with instant descriptors, so a reconnect or reload does not have to
//! observe every earlier `start`/`stop`.

use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::active_set::ActiveAnimationSet;
use crate::binding::BindingTable;
use crate::config::SmoothAnimationConfig;
use crate::diagnostics::{
    format_bits, Diagnostic, DiagnosticSink, DiagnosticsCfg, LogSink, Severity,
};
use crate::error::{ActionError, ConfigError};
use crate::ids::AnimIndex;
use crate::presentation::{NoPresentation, PresentationSink, Side};
use crate::registry::AnimationRegistry;
use crate::resolver::{AttachmentResolver, ProviderRegistry};
use crate::storage::AttributeStore;

/// Raw action parameters as delivered by the host's state machine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ActionParams {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            code: None,
        }
    }

    pub fn start(code: impl Into<String>) -> Self {
        Self::new("start").with_code(code)
    }

    pub fn stop(code: impl Into<String>) -> Self {
        Self::new("stop").with_code(code)
    }

    pub fn clear() -> Self {
        Self::new("clear")
    }

    pub fn last() -> Self {
        Self::new("last")
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Start(String),
    Stop(String),
    Clear,
    /// Restore presentation from the persisted set.
    Last,
}

impl Action {
    pub fn parse(params: &ActionParams) -> Result<Self, ActionError> {
        let code = || {
            params
                .code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
        };
        match params.action.as_str() {
            "start" => code()
                .map(Action::Start)
                .ok_or(ActionError::MissingCode { action: "start" }),
            "stop" => code()
                .map(Action::Stop)
                .ok_or(ActionError::MissingCode { action: "stop" }),
            "clear" => Ok(Action::Clear),
            "last" => Ok(Action::Last),
            other => Err(ActionError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Start(_) => "start",
            Action::Stop(_) => "stop",
            Action::Clear => "clear",
            Action::Last => "last",
        }
    }
}

pub struct AnimationController<A: ?Sized, P: PresentationSink = NoPresentation> {
    code: String,
    enabled: bool,
    registry: Arc<AnimationRegistry>,
    active: ActiveAnimationSet,
    resolver: AttachmentResolver<A>,
    presentation: P,
    diagnostics: Box<dyn DiagnosticSink>,
    diagnostics_cfg: DiagnosticsCfg,
}

impl<A: ?Sized, P: PresentationSink> AnimationController<A, P> {
    /// Build an enabled controller for the system instance `code`.
    ///
    /// Fails on any configuration error; there is no partially configured
    /// controller.
    pub fn new(
        code: &str,
        config: &SmoothAnimationConfig,
        providers: &ProviderRegistry<A>,
        presentation: P,
    ) -> Result<Self, ConfigError> {
        let registry = AnimationRegistry::from_entries(&config.animations)?;
        let table = BindingTable::from_entries(&registry, &config.animations)?;
        let resolver = AttachmentResolver::new(&table, providers)?;
        let registry = Arc::new(registry);

        Ok(Self {
            code: code.to_string(),
            enabled: true,
            active: ActiveAnimationSet::new(code, Arc::clone(&registry)),
            registry,
            resolver,
            presentation,
            diagnostics: Box::new(LogSink),
            diagnostics_cfg: config.diagnostics.clone(),
        })
    }

    /// Controller for an item type whose optional capability is absent.
    /// Valid actions succeed without touching any state.
    pub fn disabled(code: &str, presentation: P) -> Self {
        let registry = Arc::new(AnimationRegistry::default());
        Self {
            code: code.to_string(),
            enabled: false,
            active: ActiveAnimationSet::new(code, Arc::clone(&registry)),
            registry,
            resolver: AttachmentResolver::empty(),
            presentation,
            diagnostics: Box::new(LogSink),
            diagnostics_cfg: DiagnosticsCfg::default(),
        }
    }

    pub fn with_diagnostics<D: DiagnosticSink + 'static>(mut self, sink: D) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    pub fn with_diagnostics_cfg(mut self, cfg: DiagnosticsCfg) -> Self {
        self.diagnostics_cfg = cfg;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn side(&self) -> Side {
        self.presentation.side()
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn active_set(&self) -> &ActiveAnimationSet {
        &self.active
    }

    pub fn resolver(&self) -> &AttachmentResolver<A> {
        &self.resolver
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    /// Persisted active identifiers of `slot`, in index order.
    pub fn snapshot_active_identifiers<S: AttributeStore + ?Sized>(
        &self,
        slot: &S,
    ) -> IndexSet<String> {
        self.active.snapshot_active_identifiers(slot)
    }

    pub fn is_active<S: AttributeStore + ?Sized>(&self, slot: &S, code: &str) -> bool {
        self.registry
            .index_of(code)
            .is_some_and(|idx| self.active.is_active(slot, idx))
    }

    /// Host entry point. Errors are reported to the diagnostic sink and turned
    /// into `false`; recognised actions return `true`.
    pub fn process<S: AttributeStore + ?Sized>(
        &mut self,
        slot: &mut S,
        actor: &A,
        params: &ActionParams,
    ) -> bool {
        match self.try_process(slot, actor, params) {
            Ok(_) => true,
            Err(err) => {
                self.report(Severity::Error, format!("[process] {err}"));
                false
            }
        }
    }

    /// Typed variant of [`process`](Self::process). Returns the applied action.
    pub fn try_process<S: AttributeStore + ?Sized>(
        &mut self,
        slot: &mut S,
        actor: &A,
        params: &ActionParams,
    ) -> Result<Action, ActionError> {
        let action = Action::parse(params)?;
        if !self.enabled {
            return Ok(action);
        }

        self.report(Severity::Debug, format!("action: {}", action.name()));
        match &action {
            Action::Start(code) => {
                let index = self.lookup(code)?;
                self.write_bit(slot, index, true)?;
                if self.presentation.is_presenting() {
                    self.presentation.clear_attachments();
                    self.start_animation(index, actor, false);
                }
            }
            Action::Stop(code) => {
                let index = self.lookup(code)?;
                self.write_bit(slot, index, false)?;
                if self.presentation.is_presenting() {
                    if let Some(d) = self.registry.descriptor(index) {
                        self.presentation.stop_clip(&d.clip_id, true);
                    }
                }
            }
            Action::Clear => {
                if self.presentation.is_presenting() {
                    self.presentation.clear_attachments();
                }
            }
            Action::Last => {
                if self.presentation.is_presenting() {
                    self.restore(slot, actor);
                }
            }
        }
        Ok(action)
    }

    fn lookup(&self, code: &str) -> Result<AnimIndex, ActionError> {
        self.registry
            .index_of(code)
            .ok_or_else(|| ActionError::UnknownAnimation {
                code: code.to_string(),
            })
    }

    fn write_bit<S: AttributeStore + ?Sized>(
        &mut self,
        slot: &mut S,
        index: AnimIndex,
        active: bool,
    ) -> Result<(), ActionError> {
        self.warn_if_stale(slot);
        let bits = self.active.set_active(slot, index, active)?;
        if self.diagnostics_cfg.trace_state {
            let verb = if active { "add" } else { "remove" };
            self.report(
                Severity::Trace,
                format!("{verb}: {index} -> [{}]", format_bits(&bits)),
            );
        }
        Ok(())
    }

    /// Clear attachments, stop every clip and replay the persisted set with
    /// instant descriptors.
    fn restore<S: AttributeStore + ?Sized>(&mut self, slot: &S, actor: &A) {
        self.presentation.clear_attachments();

        let read = self.active.load(slot);
        if let Some(len) = read.discarded_len {
            self.report_stale(len);
        }
        if self.diagnostics_cfg.trace_state {
            self.report(
                Severity::Trace,
                format!("active: [{}]", format_bits(&read.bits)),
            );
        }

        for d in self.registry.iter() {
            self.presentation.stop_clip(&d.clip_id, true);
        }

        let active: Vec<AnimIndex> = read
            .bits
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .map(|(i, _)| AnimIndex(i))
            .collect();
        for index in active {
            self.start_animation(index, actor, true);
        }
    }

    fn start_animation(&mut self, index: AnimIndex, actor: &A, instant: bool) {
        for att in self.resolver.resolve_attachments(index, actor) {
            self.presentation.attach(&att.slot, att.item, &att.transform);
        }
        let descriptor = if instant {
            self.registry.instant_descriptor(index)
        } else {
            self.registry.descriptor(index)
        };
        if let Some(d) = descriptor {
            self.presentation.start_clip(d);
        }
    }

    fn warn_if_stale<S: AttributeStore + ?Sized>(&mut self, slot: &S) {
        if let Some(len) = self.active.load(slot).discarded_len {
            self.report_stale(len);
        }
    }

    fn report_stale(&mut self, stored_len: usize) {
        self.report(
            Severity::Warn,
            format!(
                "discarding stored active set of length {stored_len}; registry has {} animations",
                self.registry.len()
            ),
        );
    }

    /// Errors always reach the sink; everything else only when diagnostics
    /// are enabled.
    fn report(&mut self, severity: Severity, message: String) {
        if !self.diagnostics_cfg.enabled && severity < Severity::Error {
            return;
        }
        self.diagnostics
            .emit(Diagnostic::new(severity, self.code.as_str(), message));
    }
}

impl<A: ?Sized, P> std::fmt::Debug for AnimationController<A, P>
where
    P: PresentationSink + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("code", &self.code)
            .field("enabled", &self.enabled)
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("presentation", &self.presentation)
            .finish_non_exhaustive()
    }
}
