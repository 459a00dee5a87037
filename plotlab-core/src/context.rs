//! The mutable interpreter context.
//!
//! One [`Context`] holds everything a run mutates: the variable environment
//! and its mirror in the math engine, figure/axes configuration, the named
//! scatter handles, the running flag, and the pending frame request. It is
//! created by `execute`, owned by the driving engine, and replaced wholesale
//! on every new run — there are no module-level singletons and no state
//! carried across runs.
//!
//! Statement application never fails: anomalies are recorded on the
//! diagnostics list and the statement becomes a no-op, so one bad frame
//! cannot halt the animation.

use plotlab_graphics::types::{Color, Scalar};

use crate::driver::FrameRequest;
use crate::error::{EngineError, ErrorKind, Severity};
use crate::eval;
use crate::expr::MathEngine;
use crate::statement::{AssignmentStmt, AxesStmt, AxisStmt, FigureStmt, PropertySetStmt,
    ScatterStmt, Statement};
use crate::types::Value;
use crate::variables::Environment;

// ---------------------------------------------------------------------------
// Configuration pieces
// ---------------------------------------------------------------------------

/// Figure state: background and the parsed position rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    pub background: Color,
    pub position: [Scalar; 4],
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            position: [0.0, 0.0, 900.0, 900.0],
        }
    }
}

/// Axes state: the logical coordinate ranges the rasterizer maps through.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesConfig {
    pub x_range: [Scalar; 2],
    pub y_range: [Scalar; 2],
    pub show_axis: bool,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            x_range: [0.0, 400.0],
            y_range: [0.0, 400.0],
            show_axis: true,
        }
    }
}

/// The color of a scatter series: a symbolic token, or a per-point numeric
/// map rendered as hue = value × 360°.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerColor {
    Token(String),
    Map(Vec<Scalar>),
}

/// One named point-cloud series.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterHandle {
    pub x_data: Vec<Scalar>,
    pub y_data: Vec<Scalar>,
    pub size: Scalar,
    pub color: MarkerColor,
    pub marker_edge_color: String,
    pub marker_face_alpha: Scalar,
    pub filled: bool,
}

impl ScatterHandle {
    fn from_stmt(stmt: &ScatterStmt) -> Self {
        Self {
            x_data: Vec::new(),
            y_data: Vec::new(),
            size: stmt.size,
            color: MarkerColor::Token(stmt.color.clone()),
            marker_edge_color: stmt.marker_edge_color.clone(),
            marker_face_alpha: stmt.marker_face_alpha,
            filled: stmt.filled,
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The mutable state of one interpreter run.
#[derive(Debug, Default)]
pub struct Context {
    /// Variable environment.
    pub variables: Environment,
    /// Strict expression engine with its mirrored symbol table.
    pub engine: MathEngine,
    /// Figure configuration.
    pub figure: FigureConfig,
    /// Axes configuration.
    pub axes: AxesConfig,
    /// Named scatter handles, in creation order.
    handles: Vec<(String, ScatterHandle)>,
    /// Frame counter advanced once per tick.
    pub time: Scalar,
    /// Whether the animation loop is live.
    pub running: bool,
    /// The outstanding frame request, if a tick is scheduled.
    pub pending: Option<FrameRequest>,
    /// Recovered anomalies, for host inspection.
    pub diagnostics: Vec<EngineError>,
}

impl Context {
    /// Create a fresh context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a scatter handle by name.
    #[must_use]
    pub fn handle(&self, name: &str) -> Option<&ScatterHandle> {
        self.handles
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
    }

    fn handle_mut(&mut self, name: &str) -> Option<&mut ScatterHandle> {
        self.handles
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, h)| h)
    }

    /// Iterate handles in creation order.
    pub fn handles(&self) -> impl Iterator<Item = (&str, &ScatterHandle)> {
        self.handles.iter().map(|(n, h)| (n.as_str(), h))
    }

    /// Apply one state-mutating statement.
    ///
    /// `Drawnow` and `While` are control statements handled by the driver;
    /// they reach here only as no-ops. Failures are swallowed into the
    /// diagnostics list.
    pub fn apply(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Figure(s) => self.apply_figure(s),
            Statement::Axes(s) => self.apply_axes(s),
            Statement::Axis(s) => self.apply_axis(s),
            Statement::Assignment(s) => self.apply_assignment(s),
            Statement::Scatter(s) => self.apply_scatter(s),
            Statement::PropertySet(s) => self.apply_property_set(s),
            Statement::Drawnow | Statement::While(_) => {}
        }
    }

    fn apply_figure(&mut self, stmt: &FigureStmt) {
        if let Some(color) = Color::from_token(&stmt.color) {
            self.figure.background = color;
        }
        self.figure.position = stmt.position;
    }

    fn apply_axes(&mut self, stmt: &AxesStmt) {
        if let Some(color) = Color::from_token(&stmt.color) {
            self.figure.background = color;
        }
    }

    fn apply_axis(&mut self, stmt: &AxisStmt) {
        self.axes.x_range = [stmt.range[0], stmt.range[1]];
        self.axes.y_range = [stmt.range[2], stmt.range[3]];
        if stmt.off {
            self.axes.show_axis = false;
        }
    }

    fn apply_assignment(&mut self, stmt: &AssignmentStmt) {
        let value = eval::evaluate(&stmt.expression, &self.variables, &self.engine);
        self.variables.set(stmt.variable.clone(), value.clone());
        self.engine.set(stmt.variable.clone(), value);
    }

    fn apply_scatter(&mut self, stmt: &ScatterStmt) {
        let handle = ScatterHandle::from_stmt(stmt);
        if let Some(existing) = self.handle_mut(&stmt.handle) {
            *existing = handle;
        } else {
            self.handles.push((stmt.handle.clone(), handle));
        }
    }

    fn apply_property_set(&mut self, stmt: &PropertySetStmt) {
        if self.handle(&stmt.object).is_none() {
            self.note(
                ErrorKind::UnknownHandle,
                format!("no scatter handle `{}`", stmt.object),
            );
            return;
        }

        // Variable-name lookup first, then full expression evaluation.
        let expression = stmt.expression.trim();
        let value = self.variables.get(expression).cloned().unwrap_or_else(|| {
            eval::evaluate(expression, &self.variables, &self.engine)
        });

        let property = stmt.property.as_str();
        if !matches!(property, "XData" | "YData" | "CData") {
            self.note(
                ErrorKind::UnknownProperty,
                format!("property `{property}` is not understood"),
            );
            return;
        }

        let Some(handle) = self.handle_mut(&stmt.object) else {
            return;
        };
        match property {
            "XData" => handle.x_data = value.to_vec(),
            "YData" => handle.y_data = value.to_vec(),
            _ => handle.color = MarkerColor::Map(value.to_vec()),
        }
    }

    /// Record a recovered anomaly.
    fn note(&mut self, kind: ErrorKind, message: String) {
        log::debug!("{kind}: {message}");
        self.diagnostics
            .push(EngineError::new(kind, message).with_severity(Severity::Warning));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
