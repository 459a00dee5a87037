//! The render-loop driver.
//!
//! Frame scheduling is reified instead of hidden in a platform callback:
//! the engine asks its [`FrameScheduler`] for a [`FrameRequest`] whenever a
//! tick should run, the host fires the tick by calling [`Engine::tick`]
//! once per display refresh, and `stop` cancels the outstanding request.
//! Because the running flag gates `tick` as well, no frame can run after
//! `stop` returns even if the host's callback was already queued.
//!
//! The model is single-threaded and cooperative: all interpreter and paint
//! work happens on the caller's thread, one loop-body execution per tick.

use plotlab_graphics::surface::Surface;

use crate::context::Context;
use crate::render;
use crate::statement::{self, Statement};

// ---------------------------------------------------------------------------
// Frame scheduling
// ---------------------------------------------------------------------------

/// Opaque handle to one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Construct a request with a scheduler-chosen id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The scheduler-chosen id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The host's frame-scheduling service.
///
/// `request` registers interest in one future tick and returns a handle;
/// `cancel` guarantees that the handle's tick will not fire. A browser host
/// backs this with `requestAnimationFrame`/`cancelAnimationFrame`; headless
/// hosts use [`PollScheduler`] and drive [`Engine::tick`] themselves.
pub trait FrameScheduler {
    /// Schedule one tick.
    fn request(&mut self) -> FrameRequest;

    /// Cancel a previously scheduled tick.
    fn cancel(&mut self, request: FrameRequest);
}

/// A scheduler for hosts that poll `tick` in their own loop. Requests are
/// numbered so cancellation stays observable.
#[derive(Debug, Default)]
pub struct PollScheduler {
    next_id: u64,
    cancelled: Vec<FrameRequest>,
}

impl PollScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancelled so far (most tests only care that this grew).
    #[must_use]
    pub fn cancelled(&self) -> &[FrameRequest] {
        &self.cancelled
    }
}

impl FrameScheduler for PollScheduler {
    fn request(&mut self) -> FrameRequest {
        let request = FrameRequest::new(self.next_id);
        self.next_id += 1;
        request
    }

    fn cancel(&mut self, request: FrameRequest) {
        self.cancelled.push(request);
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The interpreter engine: context, statements, surface, and scheduler.
///
/// `execute` is the start/restart entry point; `stop` halts the loop. The
/// engine owns its context exclusively — re-running replaces it wholesale,
/// so no state leaks between runs of possibly-edited source.
pub struct Engine<S: Surface> {
    surface: S,
    scheduler: Box<dyn FrameScheduler>,
    ctx: Context,
    statements: Vec<Statement>,
    loop_statements: Vec<Statement>,
}

impl<S: Surface> Engine<S> {
    /// Create an engine painting onto `surface`, with a poll scheduler.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            scheduler: Box::new(PollScheduler::new()),
            ctx: Context::new(),
            statements: Vec::new(),
            loop_statements: Vec::new(),
        }
    }

    /// Replace the frame scheduler.
    pub fn set_scheduler(&mut self, scheduler: Box<dyn FrameScheduler>) {
        self.scheduler = scheduler;
    }

    /// The current context.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The paint target.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Whether the animation loop is live.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.ctx.running
    }

    /// Parse and run `source`, restarting any previous run first.
    ///
    /// Statements before the first `while` execute immediately; when a
    /// `while` is reached its body becomes the per-frame loop, a frame is
    /// requested, and `execute` returns — the loop is terminal, statements
    /// after it are unreachable.
    pub fn execute(&mut self, source: &str) {
        self.stop();
        self.ctx = Context::new();
        self.loop_statements.clear();
        self.statements = statement::parse(source);

        let statements = std::mem::take(&mut self.statements);
        for stmt in &statements {
            if let Statement::While(block) = stmt {
                self.loop_statements = block.body.clone();
                self.ctx.running = true;
                self.ctx.pending = Some(self.scheduler.request());
                log::debug!(
                    "animation loop started with {} body statements",
                    self.loop_statements.len()
                );
                break;
            }
            self.execute_statement(stmt);
        }
        self.statements = statements;
    }

    /// Run one frame of the animation loop.
    ///
    /// Called by the host once per display refresh. Does nothing when the
    /// loop is not running. Returns whether the loop is still live.
    pub fn tick(&mut self) -> bool {
        self.ctx.pending = None;
        if !self.ctx.running {
            return false;
        }

        let loop_statements = std::mem::take(&mut self.loop_statements);
        for stmt in &loop_statements {
            self.execute_statement(stmt);
        }
        self.loop_statements = loop_statements;

        self.ctx.time += 1.0;
        self.ctx.pending = Some(self.scheduler.request());
        true
    }

    /// Halt the animation loop and cancel the scheduled frame.
    ///
    /// Idempotent; safe to call when not running. After `stop` returns, no
    /// further tick will execute loop statements.
    pub fn stop(&mut self) {
        self.ctx.running = false;
        if let Some(request) = self.ctx.pending.take() {
            self.scheduler.cancel(request);
            log::debug!("cancelled pending frame request {}", request.id());
        }
    }

    fn execute_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Drawnow => render::render_frame(&self.ctx, &mut self.surface),
            // A while block never executes as a plain statement; the loop
            // is installed by `execute` alone.
            Statement::While(_) => {}
            other => self.ctx.apply(other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
