//! The orchestrator that ties the grammar, scaler, pipeline, cycle memory and
//! window manager together.
//!
//! [`CycleEngine`] owns the [`CycleMemory`] and reacts to [`Command`]s by
//! computing the next rectangle for a window and issuing calls to the
//! [`WindowManager`] trait.

use crate::command::{Command, CycleRequest, TriggerRequest};
use crate::config::Binding;
use crate::cycle::{CycleMemory, NoCandidatesError};
use crate::geometry::Placement;
use crate::grammar::{self, GrammarError};
use crate::pipeline::{self, InvocationContext, Stage};
use crate::scale;
use crate::traits::WindowManager;
use log::{debug, info};
use std::collections::BTreeMap;

/// Possible errors from the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The grid spec could not be parsed.
    #[error("invalid grid spec: {0}")]
    Grammar(#[from] GrammarError),

    /// The pipeline left nothing to cycle through.
    #[error(transparent)]
    NoCandidates(#[from] NoCandidatesError),

    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),

    /// A trigger named a binding that is not configured.
    #[error("unknown binding: {0}")]
    UnknownBinding(String),
}

fn wm_error(e: impl std::error::Error) -> EngineError {
    EngineError::WindowManager(e.to_string())
}

/// Cycles windows through grid positions.
///
/// The engine is generic over any [`WindowManager`] implementation, making
/// it completely independent of Hyprland or any other concrete backend.
/// Apart from the configured bindings, its only state is the injected
/// [`CycleMemory`].
///
/// # Typical usage
///
/// ```ignore
/// let mut engine = CycleEngine::new(HyprlandWm::new());
/// engine.cycle("active", "2x1 0:0, 1:0", &[], &InvocationContext::new())?;
/// ```
pub struct CycleEngine<W: WindowManager> {
    wm: W,
    memory: CycleMemory,
    bindings: BTreeMap<String, Binding>,
}

impl<W: WindowManager> CycleEngine<W> {
    /// Create an engine with an empty cycle memory and no bindings.
    pub fn new(wm: W) -> Self {
        Self::with_memory(wm, CycleMemory::new())
    }

    /// Create an engine around an existing cycle memory.
    pub fn with_memory(wm: W, memory: CycleMemory) -> Self {
        Self {
            wm,
            memory,
            bindings: BTreeMap::new(),
        }
    }

    /// Install the named bindings used by [`Command::Trigger`].
    pub fn set_bindings(&mut self, bindings: BTreeMap<String, Binding>) {
        self.bindings = bindings;
    }

    /// The cycle memory.
    pub fn memory(&self) -> &CycleMemory {
        &self.memory
    }

    /// Process a single [`Command`].
    ///
    /// Returns the placement handed to the window manager, or `None` when
    /// the command moved nothing (no matching window, or a memory reset).
    pub fn handle(&mut self, cmd: Command) -> Result<Option<Placement>, EngineError> {
        match cmd {
            Command::Cycle(CycleRequest {
                target,
                spec,
                stages,
                context,
            }) => {
                info!("cycle {:?} through {:?}", target, spec);
                self.cycle(&target, &spec, &stages, &context)
            }

            Command::Trigger(TriggerRequest { binding, context }) => {
                info!("trigger {} {:?}", binding, context.modifiers);
                let Binding {
                    target,
                    spec,
                    stages,
                } = self
                    .bindings
                    .get(&binding)
                    .cloned()
                    .ok_or(EngineError::UnknownBinding(binding))?;
                self.cycle(&target, &spec, &stages, &context)
            }

            Command::ResetCycles => {
                info!("reset all cycles ({} in progress)", self.memory.len());
                self.memory.clear();
                Ok(None)
            }

            Command::ForgetTarget(target) => {
                info!("forget cycles for {:?}", target);
                self.memory.forget(&target);
                Ok(None)
            }
        }
    }

    /// Move the window selected by `target` to its next position in `spec`.
    ///
    /// The memory is only updated after the window manager accepted the
    /// move, so any error leaves it exactly as it was.
    pub fn cycle(
        &mut self,
        target: &str,
        spec: &str,
        stages: &[Stage],
        ctx: &InvocationContext,
    ) -> Result<Option<Placement>, EngineError> {
        let Some(window) = self.wm.resolve_window(target).map_err(wm_error)? else {
            info!("no window matches {:?}, nothing to do", target);
            return Ok(None);
        };

        let geometry = self.wm.window_geometry(&window).map_err(wm_error)?;
        let area = self.wm.work_area(&window).map_err(wm_error)?;
        debug!("window {} at {:?}, work area {:?}", window, geometry, area);

        let cells = grammar::parse(spec)?;
        let candidates = pipeline::run(
            scale::scale_all(&cells, area.width, area.height),
            stages,
            ctx,
        );

        // Compare in the space the candidates were scaled into: visible
        // rectangle, relative to the work area.
        let current = (geometry.rect - geometry.chrome)
            .translate(-area.x, -area.y)
            .with_viewport(area.width.max(0), area.height.max(0));

        let step = self.memory.plan(target, &window, current, &candidates)?;
        let placement = (step.next.translate(area.x, area.y) + geometry.chrome).placement();

        debug!("moving {} to {:?}", window, placement);
        self.wm.move_resize(&window, placement).map_err(wm_error)?;
        self.memory.commit(step);

        Ok(Some(placement))
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ChromeOffset, Rectangle, WorkArea};
    use crate::traits::{WindowGeometry, WindowHandle};
    use std::cell::{Cell, RefCell};

    /// In-memory window manager that applies moves to its own window table.
    #[derive(Debug)]
    struct FakeWm {
        windows: RefCell<BTreeMap<WindowHandle, Rectangle>>,
        active: Option<WindowHandle>,
        area: WorkArea,
        chrome: ChromeOffset,
        moves: RefCell<Vec<(WindowHandle, Placement)>>,
        fail_moves: Cell<bool>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake wm error: {0}")]
    struct FakeErr(String);

    impl FakeWm {
        fn new(area: WorkArea, chrome: ChromeOffset) -> Self {
            let mut windows = BTreeMap::new();
            windows.insert(WindowHandle::new("0xa"), floating_rect());
            windows.insert(WindowHandle::new("0xb"), Rectangle::new(50, 50, 300, 200, 0, 0));
            Self {
                windows: RefCell::new(windows),
                active: Some(WindowHandle::new("0xa")),
                area,
                chrome,
                moves: RefCell::new(Vec::new()),
                fail_moves: Cell::new(false),
            }
        }

        fn rect_of(&self, id: &str) -> Rectangle {
            self.windows.borrow()[&WindowHandle::new(id)]
        }
    }

    impl WindowManager for FakeWm {
        type Error = FakeErr;

        fn resolve_window(&self, target: &str) -> Result<Option<WindowHandle>, FakeErr> {
            if target == "active" {
                return Ok(self.active.clone());
            }
            if target == "broken" {
                return Err(FakeErr("resolver exploded".into()));
            }
            let handle = target.strip_prefix("address:").map(WindowHandle::new);
            Ok(handle.filter(|h| self.windows.borrow().contains_key(h)))
        }

        fn window_geometry(&self, window: &WindowHandle) -> Result<WindowGeometry, FakeErr> {
            let rect = self
                .windows
                .borrow()
                .get(window)
                .copied()
                .ok_or_else(|| FakeErr(format!("no window {window}")))?;
            Ok(WindowGeometry {
                rect,
                chrome: self.chrome,
            })
        }

        fn work_area(&self, _window: &WindowHandle) -> Result<WorkArea, FakeErr> {
            Ok(self.area)
        }

        fn move_resize(&self, window: &WindowHandle, p: Placement) -> Result<(), FakeErr> {
            if self.fail_moves.get() {
                return Err(FakeErr("move refused".into()));
            }
            self.moves.borrow_mut().push((window.clone(), p));
            self.windows
                .borrow_mut()
                .insert(window.clone(), Rectangle::new(p.x, p.y, p.width, p.height, 0, 0));
            Ok(())
        }
    }

    fn floating_rect() -> Rectangle {
        Rectangle::new(300, 200, 800, 600, 0, 0)
    }

    fn full_hd() -> WorkArea {
        WorkArea {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        }
    }

    fn make_engine() -> CycleEngine<FakeWm> {
        CycleEngine::new(FakeWm::new(full_hd(), ChromeOffset::default()))
    }

    fn p(x: i32, y: i32, width: i32, height: i32) -> Placement {
        Placement {
            x,
            y,
            width,
            height,
        }
    }

    const HALVES: &str = "2x1 0:0, 1:0";

    fn cycle(e: &mut CycleEngine<FakeWm>, target: &str, spec: &str) -> Option<Placement> {
        e.cycle(target, spec, &[], &InvocationContext::new()).unwrap()
    }

    #[test]
    fn cycles_through_halves_and_restores() {
        let mut e = make_engine();
        assert_eq!(cycle(&mut e, "active", HALVES), Some(p(0, 0, 960, 1080)));
        assert_eq!(cycle(&mut e, "active", HALVES), Some(p(960, 0, 960, 1080)));
        assert_eq!(cycle(&mut e, "active", HALVES), Some(p(300, 200, 800, 600)));
        assert!(e.memory().is_empty());
        assert_eq!(e.wm.rect_of("0xa"), floating_rect());
        assert_eq!(e.wm.moves.borrow().len(), 3);
    }

    #[test]
    fn work_area_origin_and_chrome_are_applied() {
        let area = WorkArea {
            x: 2560,
            y: 30,
            width: 1920,
            height: 1050,
        };
        let mut e = CycleEngine::new(FakeWm::new(area, ChromeOffset::uniform(-2)));
        assert_eq!(cycle(&mut e, "active", HALVES), Some(p(2562, 32, 956, 1046)));
        // The window now sits on the left half; the next step must recognise it.
        assert_eq!(cycle(&mut e, "active", HALVES), Some(p(3522, 32, 956, 1046)));
        assert_eq!(cycle(&mut e, "active", HALVES), Some(p(300, 200, 800, 600)));
        assert!(e.memory().is_empty());
    }

    #[test]
    fn unresolved_window_is_a_noop() {
        let mut e = make_engine();
        assert_eq!(cycle(&mut e, "address:0xdead", HALVES), None);
        assert!(e.wm.moves.borrow().is_empty());
        assert!(e.memory().is_empty());
    }

    #[test]
    fn resolver_error_propagates() {
        let mut e = make_engine();
        let err = e
            .cycle("broken", HALVES, &[], &InvocationContext::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::WindowManager(ref m) if m.contains("exploded")));
    }

    #[test]
    fn grammar_error_leaves_window_and_memory_alone() {
        let mut e = make_engine();
        let err = e
            .cycle("active", "2x2 2:0", &[], &InvocationContext::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::Grammar(GrammarError::OutsideGrid { .. })));
        assert!(e.wm.moves.borrow().is_empty());
        assert!(e.memory().is_empty());
    }

    #[test]
    fn spec_without_cells_has_no_candidates() {
        let mut e = make_engine();
        let err = e
            .cycle("active", "2x1", &[], &InvocationContext::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::NoCandidates(_)));
    }

    #[test]
    fn failed_move_leaves_memory_unchanged() {
        let mut e = make_engine();
        cycle(&mut e, "active", HALVES);
        let before = e.memory().original("active", &WindowHandle::new("0xa"));
        assert_eq!(before, Some(Rectangle::new(300, 200, 800, 600, 1920, 1080)));

        e.wm.fail_moves.set(true);
        let err = e
            .cycle("active", HALVES, &[], &InvocationContext::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::WindowManager(_)));
        assert_eq!(e.memory().original("active", &WindowHandle::new("0xa")), before);

        // A first step that fails records nothing at all.
        let err = e.cycle("address:0xb", HALVES, &[], &InvocationContext::new());
        assert!(err.is_err());
        assert_eq!(e.memory().len(), 1);
    }

    #[test]
    fn modifier_stage_reverses_order() {
        let mut e = make_engine();
        let stages = [Stage::when_modifier("shift", Stage::Reverse)];
        let plain = e
            .cycle("address:0xb", HALVES, &stages, &InvocationContext::new())
            .unwrap();
        assert_eq!(plain, Some(p(0, 0, 960, 1080)));

        let shifted = e
            .cycle(
                "active",
                HALVES,
                &stages,
                &InvocationContext::with_modifiers(["shift"]),
            )
            .unwrap();
        assert_eq!(shifted, Some(p(960, 0, 960, 1080)));
    }

    #[test]
    fn minimum_width_on_narrow_candidates_keeps_them() {
        let mut e = make_engine();
        let placed = e
            .cycle(
                "active",
                "3x1 0:0, 1:0, 2:0",
                &[Stage::MinimumWidth],
                &InvocationContext::new(),
            )
            .unwrap();
        assert_eq!(placed, Some(p(0, 0, 640, 1080)));
    }

    fn bindings() -> BTreeMap<String, Binding> {
        let mut b = BTreeMap::new();
        b.insert(
            "halves".to_string(),
            Binding {
                target: "active".into(),
                spec: HALVES.into(),
                stages: vec![],
            },
        );
        b.insert(
            "thirds".to_string(),
            Binding {
                target: "active".into(),
                spec: "3x1 0:0, 1:0, 2:0".into(),
                stages: vec![],
            },
        );
        b
    }

    fn trigger(name: &str) -> Command {
        Command::Trigger(TriggerRequest {
            binding: name.into(),
            context: InvocationContext::new(),
        })
    }

    #[test]
    fn trigger_runs_named_binding() {
        let mut e = make_engine();
        e.set_bindings(bindings());
        let placed = e.handle(trigger("thirds")).unwrap();
        assert_eq!(placed, Some(p(0, 0, 640, 1080)));
    }

    #[test]
    fn trigger_unknown_binding_fails() {
        let mut e = make_engine();
        let err = e.handle(trigger("nope")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBinding(ref n) if n == "nope"));
    }

    #[test]
    fn bindings_on_same_target_share_the_original() {
        let mut e = make_engine();
        e.set_bindings(bindings());
        assert_eq!(e.handle(trigger("halves")).unwrap(), Some(p(0, 0, 960, 1080)));
        // Switching to the thirds cycle mid-way restores the first original.
        assert_eq!(e.handle(trigger("thirds")).unwrap(), Some(p(300, 200, 800, 600)));
        assert!(e.memory().is_empty());
    }

    #[test]
    fn inline_cycle_command() {
        let mut e = make_engine();
        let placed = e
            .handle(Command::Cycle(CycleRequest {
                target: "active".into(),
                spec: "1x1 0:0".into(),
                stages: vec![],
                context: InvocationContext::new(),
            }))
            .unwrap();
        assert_eq!(placed, Some(p(0, 0, 1920, 1080)));
    }

    #[test]
    fn reset_and_forget_commands() {
        let mut e = make_engine();
        cycle(&mut e, "active", HALVES);
        cycle(&mut e, "address:0xb", HALVES);
        assert_eq!(e.memory().len(), 2);

        assert_eq!(e.handle(Command::ForgetTarget("active".into())).unwrap(), None);
        assert_eq!(e.memory().len(), 1);

        assert_eq!(e.handle(Command::ResetCycles).unwrap(), None);
        assert!(e.memory().is_empty());
    }

    #[test]
    fn injected_memory_is_used() {
        let mut memory = CycleMemory::new();
        let original = Rectangle::new(1, 2, 3, 4, 1920, 1080);
        let left = Rectangle::new(0, 0, 960, 1080, 1920, 1080);
        // Pretend a cycle started earlier and the window is now on the last
        // candidate of a single-cell cycle.
        memory
            .advance("active", &WindowHandle::new("0xa"), original, &[left])
            .unwrap();
        let wm = FakeWm::new(full_hd(), ChromeOffset::default());
        wm.windows
            .borrow_mut()
            .insert(WindowHandle::new("0xa"), Rectangle::new(0, 0, 960, 1080, 0, 0));
        let mut e = CycleEngine::with_memory(wm, memory);
        assert_eq!(cycle(&mut e, "active", "2x1 0:0"), Some(p(1, 2, 3, 4)));
        assert!(e.memory().is_empty());
    }
}
