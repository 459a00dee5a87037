//! Statement parser for the plot script.
//!
//! The grammar is line-based: each source line holds at most one statement,
//! recognized by a fixed dispatch order. Parsing is deliberately permissive
//! — unrecognized lines produce no statement, malformed options fall back
//! to the construct's defaults, and nothing here ever fails. That contract
//! is what lets a live-coding host re-run a half-edited program on every
//! keystroke without interrupting the animation.
//!
//! # Dispatch order per line
//!
//! 1. `figure(...)`
//! 2. `axes(...)`
//! 3. `axis(...)` or `axis <keyword>`
//! 4. `<ident> = scatter(...)`
//! 5. `drawnow`
//! 6. `<ident>.<Property> = <expr>`
//! 7. `<ident> = <expr>` (excluding `==` comparisons)
//! 8. anything else: silently dropped
//!
//! A `while` line opens the single supported loop block: its body is
//! consumed with a depth counter (`while`/`for`/`if` increment, a bare
//! `end` decrements) and every line inside is parsed as an ordinary body
//! statement. Inner block headers and `end` lines are consumed for depth
//! only — inner blocks are flattened, not nested. The loop condition text
//! is not evaluated; the emitted block is always unconditional.

use plotlab_graphics::types::Scalar;

// ---------------------------------------------------------------------------
// Statement model
// ---------------------------------------------------------------------------

/// One parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Figure(FigureStmt),
    Axes(AxesStmt),
    Axis(AxisStmt),
    Assignment(AssignmentStmt),
    Scatter(ScatterStmt),
    PropertySet(PropertySetStmt),
    Drawnow,
    While(WhileBlock),
}

/// `figure('Position',[..], 'Color','k')`
#[derive(Debug, Clone, PartialEq)]
pub struct FigureStmt {
    pub position: [Scalar; 4],
    pub color: String,
}

/// `axes(..., 'Position',[..], 'Color','k')`
#[derive(Debug, Clone, PartialEq)]
pub struct AxesStmt {
    pub position: [Scalar; 4],
    pub color: String,
}

/// `axis([x0,x1,y0,y1])` / `axis off`
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStmt {
    pub range: [Scalar; 4],
    pub off: bool,
}

/// `name = <expression>`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentStmt {
    pub variable: String,
    pub expression: String,
}

/// `h = scatter([], [], 2, 'filled', ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterStmt {
    pub handle: String,
    pub size: Scalar,
    pub color: String,
    pub filled: bool,
    pub marker_edge_color: String,
    pub marker_face_alpha: Scalar,
}

/// `h.XData = <expression>`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySetStmt {
    pub object: String,
    pub property: String,
    pub expression: String,
}

/// The single top-level loop. The condition is a placeholder — the grammar
/// only has unconditional loops, so it is always the literal `"true"`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileBlock {
    pub condition: String,
    pub body: Vec<Statement>,
}

// -- Defaults --

impl Default for FigureStmt {
    fn default() -> Self {
        Self {
            position: [300.0, 50.0, 900.0, 900.0],
            color: "k".to_owned(),
        }
    }
}

impl Default for AxesStmt {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 1.0, 1.0],
            color: "k".to_owned(),
        }
    }
}

impl Default for AxisStmt {
    fn default() -> Self {
        Self {
            range: [0.0, 400.0, 0.0, 400.0],
            off: false,
        }
    }
}

impl ScatterStmt {
    fn with_handle(handle: String) -> Self {
        Self {
            handle,
            size: 2.0,
            color: "w".to_owned(),
            filled: false,
            marker_edge_color: "none".to_owned(),
            marker_face_alpha: 0.6,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse source text into an ordered statement sequence. Never fails.
#[must_use]
pub fn parse(source: &str) -> Vec<Statement> {
    let lines: Vec<&str> = source.lines().collect();
    let mut statements = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(clean) = clean_line(lines[i]) else {
            i += 1;
            continue;
        };

        if clean.starts_with("while") {
            let (block, end_index) = parse_while_block(&lines, i);
            statements.push(block);
            i = end_index + 1;
            continue;
        }

        if let Some(stmt) = parse_statement(clean) {
            statements.push(stmt);
        }
        i += 1;
    }

    log::debug!("parsed {} top-level statements", statements.len());
    statements
}

/// Strip whitespace and comments from a raw line. Returns `None` for lines
/// with no content (blank, or comment-only).
fn clean_line(raw: &str) -> Option<&str> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('%') {
        return None;
    }
    let clean = line.split('%').next().unwrap_or("").trim();
    if clean.is_empty() {
        None
    } else {
        Some(clean)
    }
}

/// Consume the body of a `while` opened at `lines[start_index]`.
///
/// Returns the parsed block and the index of the line that closed it (the
/// matching `end`, or the last line if the block is unterminated). The
/// depth counter is the only use made of inner block keywords; their lines
/// are otherwise parsed flat into the body.
fn parse_while_block(lines: &[&str], start_index: usize) -> (Statement, usize) {
    let mut body = Vec::new();
    let mut i = start_index + 1;
    let mut depth = 1u32;

    while i < lines.len() && depth > 0 {
        let clean = clean_line(lines[i]);

        if let Some(clean) = clean {
            if clean.starts_with("while") || clean.starts_with("for") || clean.starts_with("if") {
                depth += 1;
            } else if clean == "end" {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }

            if depth > 0 {
                if let Some(stmt) = parse_statement(clean) {
                    body.push(stmt);
                }
            }
        }
        i += 1;
    }

    (
        Statement::While(WhileBlock {
            condition: "true".to_owned(),
            body,
        }),
        i,
    )
}

/// Parse a single cleaned line. Returns `None` for unrecognized lines.
fn parse_statement(line: &str) -> Option<Statement> {
    let line = line.strip_suffix(';').unwrap_or(line).trim();

    if line.starts_with("figure(") {
        return Some(parse_figure(line));
    }
    if line.starts_with("axes(") {
        return Some(parse_axes(line));
    }
    if line.starts_with("axis(") || line.starts_with("axis ") {
        return Some(parse_axis(line));
    }
    if line.contains("= scatter(") {
        return parse_scatter(line);
    }
    if line.starts_with("drawnow") {
        return Some(Statement::Drawnow);
    }
    if let Some(stmt) = parse_property_set(line) {
        return Some(stmt);
    }
    if line.contains('=') && !line.contains("==") {
        return parse_assignment(line);
    }

    None
}

fn parse_figure(line: &str) -> Statement {
    let mut stmt = FigureStmt::default();
    if let Some(position) = named_bracket_list(line, "Position") {
        stmt.position = position;
    }
    if let Some(color) = named_quoted(line, "Color") {
        stmt.color = color;
    }
    Statement::Figure(stmt)
}

fn parse_axes(line: &str) -> Statement {
    let mut stmt = AxesStmt::default();
    if let Some(position) = named_bracket_list(line, "Position") {
        stmt.position = position;
    }
    if let Some(color) = named_quoted(line, "Color") {
        stmt.color = color;
    }
    Statement::Axes(stmt)
}

fn parse_axis(line: &str) -> Statement {
    let mut stmt = AxisStmt::default();
    if let Some(range) = first_bracket_list(line) {
        stmt.range = range;
    }
    if line.contains("off") {
        stmt.off = true;
    }
    Statement::Axis(stmt)
}

fn parse_scatter(line: &str) -> Option<Statement> {
    let (lhs, rhs) = line.split_once('=')?;
    let handle = lhs.trim();
    if handle.is_empty() || !is_identifier(handle) {
        return None;
    }

    let mut stmt = ScatterStmt::with_handle(handle.to_owned());

    if let Some(args) = call_arguments(rhs, "scatter(") {
        if args.contains("'filled'") {
            stmt.filled = true;
        }
        if let Some(size) = bare_integer_between_commas(args) {
            stmt.size = size;
        }
    }
    if let Some(edge) = named_quoted(line, "MarkerEdgeColor") {
        stmt.marker_edge_color = edge;
    }
    if let Some(alpha) = named_number(line, "MarkerFaceAlpha") {
        stmt.marker_face_alpha = alpha;
    }

    Some(Statement::Scatter(stmt))
}

fn parse_property_set(line: &str) -> Option<Statement> {
    // Pattern: `<ident>.<ident> \s* = <rest>`
    let eq = line.find('=')?;
    let (target, rest) = line.split_at(eq);
    let target = target.trim_end();
    let (object, property) = target.split_once('.')?;
    if !is_identifier(object) || !is_identifier(property) {
        return None;
    }

    Some(Statement::PropertySet(PropertySetStmt {
        object: object.to_owned(),
        property: property.to_owned(),
        expression: rest[1..].trim().to_owned(),
    }))
}

fn parse_assignment(line: &str) -> Option<Statement> {
    let (lhs, rhs) = line.split_once('=')?;
    let variable = lhs.trim();
    if variable.is_empty() || !is_identifier(variable) {
        return None;
    }
    Some(Statement::Assignment(AssignmentStmt {
        variable: variable.to_owned(),
        expression: rhs.trim().to_owned(),
    }))
}

// ---------------------------------------------------------------------------
// Option extraction
// ---------------------------------------------------------------------------

fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Extract `'Name', [a,b,c,d]`. A malformed list yields `None` so the
/// caller keeps the default.
fn named_bracket_list(line: &str, name: &str) -> Option<[Scalar; 4]> {
    let marker = format!("'{name}'");
    let after = &line[line.find(&marker)? + marker.len()..];
    let after = after.trim_start().strip_prefix(',')?;
    parse_bracket_list(after.trim_start())
}

/// Extract `'Name', 'value'`.
fn named_quoted(line: &str, name: &str) -> Option<String> {
    let marker = format!("'{name}'");
    let after = &line[line.find(&marker)? + marker.len()..];
    let after = after.trim_start().strip_prefix(',')?.trim_start();
    let after = after.strip_prefix('\'')?;
    let end = after.find('\'')?;
    Some(after[..end].to_owned())
}

/// Extract `'Name', <number>`.
fn named_number(line: &str, name: &str) -> Option<Scalar> {
    let marker = format!("'{name}'");
    let after = &line[line.find(&marker)? + marker.len()..];
    let after = after.trim_start().strip_prefix(',')?.trim_start();
    let end = after
        .bytes()
        .position(|b| !(b.is_ascii_digit() || b == b'.'))
        .unwrap_or(after.len());
    after[..end].parse().ok()
}

/// The first `[a,b,c,d]` on the line, wherever it appears.
fn first_bracket_list(line: &str) -> Option<[Scalar; 4]> {
    parse_bracket_list(&line[line.find('[')?..])
}

/// Parse `[a,b,c,d]` at the start of `text` into exactly four scalars.
fn parse_bracket_list(text: &str) -> Option<[Scalar; 4]> {
    let inner = text.strip_prefix('[')?;
    let inner = &inner[..inner.find(']')?];
    let mut out = [0.0; 4];
    let mut count = 0;
    for part in inner.split(',') {
        if count == 4 {
            return None;
        }
        out[count] = part.trim().parse().ok()?;
        count += 1;
    }
    if count == 4 {
        Some(out)
    } else {
        None
    }
}

/// The argument text of `name(...)` within `text`.
fn call_arguments<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let after = &text[text.find(opener)? + opener.len()..];
    Some(&after[..after.find(')')?])
}

/// The first bare integer enclosed by commas on both sides in an argument
/// list — the positional marker-size argument of `scatter`.
fn bare_integer_between_commas(args: &str) -> Option<Scalar> {
    let parts: Vec<&str> = args.split(',').collect();
    // Commas on both sides: neither the first nor the last argument.
    for part in parts.iter().skip(1).take(parts.len().saturating_sub(2)) {
        let trimmed = part.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed.parse().ok();
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Statement {
        let mut stmts = parse(line);
        assert_eq!(stmts.len(), 1, "expected one statement from `{line}`");
        stmts.remove(0)
    }

    // -- figure / axes --

    #[test]
    fn figure_defaults() {
        let Statement::Figure(f) = parse_one("figure();") else {
            panic!("expected figure");
        };
        assert_eq!(f.position, [300.0, 50.0, 900.0, 900.0]);
        assert_eq!(f.color, "k");
    }

    #[test]
    fn figure_with_options() {
        let Statement::Figure(f) =
            parse_one("figure('Position',[300,50,900,900], 'Color','r');")
        else {
            panic!("expected figure");
        };
        assert_eq!(f.position, [300.0, 50.0, 900.0, 900.0]);
        assert_eq!(f.color, "r");
    }

    #[test]
    fn figure_explicit_option_differs_only_in_that_option() {
        let Statement::Figure(with) = parse_one("figure('Color','r');") else {
            panic!()
        };
        let Statement::Figure(without) = parse_one("figure();") else {
            panic!()
        };
        assert_eq!(with.position, without.position);
        assert_eq!(with.color, "r");
        assert_eq!(without.color, "k");
    }

    #[test]
    fn figure_malformed_position_keeps_default() {
        let Statement::Figure(f) = parse_one("figure('Position',[30,x,90], 'Color','w');")
        else {
            panic!("expected figure");
        };
        assert_eq!(f.position, [300.0, 50.0, 900.0, 900.0], "default kept");
        assert_eq!(f.color, "w", "good option still applies");
    }

    #[test]
    fn axes_defaults_and_options() {
        let Statement::Axes(a) = parse_one("axes(gcf, 'Position',[0,0,1,1], 'Color','k');")
        else {
            panic!("expected axes");
        };
        assert_eq!(a.position, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(a.color, "k");

        let Statement::Axes(a) = parse_one("axes();") else {
            panic!("expected axes");
        };
        assert_eq!(a.position, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(a.color, "k");
    }

    // -- axis --

    #[test]
    fn axis_range() {
        let Statement::Axis(a) = parse_one("axis([0, 400, 0, 400]);") else {
            panic!("expected axis");
        };
        assert_eq!(a.range, [0.0, 400.0, 0.0, 400.0]);
        assert!(!a.off);
    }

    #[test]
    fn axis_off_keyword() {
        let Statement::Axis(a) = parse_one("axis off;") else {
            panic!("expected axis");
        };
        assert!(a.off);
        assert_eq!(a.range, [0.0, 400.0, 0.0, 400.0], "default range");
    }

    #[test]
    fn combined_axis_line_sets_range_and_off() {
        // One source line; the `off` in the second clause is still seen.
        let Statement::Axis(a) = parse_one("axis([0, 400, 0, 400]); axis off;") else {
            panic!("expected axis");
        };
        assert_eq!(a.range, [0.0, 400.0, 0.0, 400.0]);
        assert!(a.off);
    }

    // -- scatter --

    #[test]
    fn scatter_full_form() {
        let Statement::Scatter(s) = parse_one(
            "SHdl = scatter([], [], 2, 'filled','o','w', 'MarkerEdgeColor','none', 'MarkerFaceAlpha',0.6);",
        ) else {
            panic!("expected scatter");
        };
        assert_eq!(s.handle, "SHdl");
        assert_eq!(s.size, 2.0);
        assert!(s.filled);
        assert_eq!(s.color, "w", "color stays at the default token");
        assert_eq!(s.marker_edge_color, "none");
        assert!((s.marker_face_alpha - 0.6).abs() < 1e-12);
    }

    #[test]
    fn scatter_defaults() {
        let Statement::Scatter(s) = parse_one("h = scatter([], []);") else {
            panic!("expected scatter");
        };
        assert_eq!(s.handle, "h");
        assert_eq!(s.size, 2.0);
        assert!(!s.filled);
        assert_eq!(s.color, "w");
        assert_eq!(s.marker_edge_color, "none");
        assert!((s.marker_face_alpha - 0.6).abs() < 1e-12);
    }

    #[test]
    fn scatter_size_is_first_bare_integer_argument() {
        let Statement::Scatter(s) = parse_one("h = scatter(x, y, 7, 'filled');") else {
            panic!("expected scatter");
        };
        assert_eq!(s.size, 7.0);
    }

    // -- property set / assignment / drawnow --

    #[test]
    fn property_set() {
        let Statement::PropertySet(p) = parse_one("SHdl.XData = x;") else {
            panic!("expected property_set");
        };
        assert_eq!(p.object, "SHdl");
        assert_eq!(p.property, "XData");
        assert_eq!(p.expression, "x");
    }

    #[test]
    fn property_set_with_expression() {
        let Statement::PropertySet(p) = parse_one("h.CData = sin(i/1000 + t) * 0.5 + 0.5;")
        else {
            panic!("expected property_set");
        };
        assert_eq!(p.property, "CData");
        assert_eq!(p.expression, "sin(i/1000 + t) * 0.5 + 0.5");
    }

    #[test]
    fn assignment() {
        let Statement::Assignment(a) = parse_one("t = t + 0.02;") else {
            panic!("expected assignment");
        };
        assert_eq!(a.variable, "t");
        assert_eq!(a.expression, "t + 0.02");
    }

    #[test]
    fn equality_comparison_is_dropped() {
        assert!(parse("x == 5;").is_empty());
    }

    #[test]
    fn drawnow() {
        assert_eq!(parse_one("drawnow;"), Statement::Drawnow);
        assert_eq!(parse_one("drawnow limitrate;"), Statement::Drawnow);
    }

    #[test]
    fn unrecognized_lines_are_dropped() {
        assert!(parse("hold on;").is_empty());
        assert!(parse("clf").is_empty());
        assert!(parse("disp('hi')").is_empty());
    }

    // -- comments and blanks --

    #[test]
    fn comments_and_blank_lines() {
        let stmts = parse("% a comment\n\n   \nt = 1; % trailing comment\n% another");
        assert_eq!(stmts.len(), 1);
        let Statement::Assignment(a) = &stmts[0] else {
            panic!("expected assignment");
        };
        assert_eq!(a.expression, "1");
    }

    #[test]
    fn unicode_comment_lines() {
        let stmts = parse("% Khởi tạo dữ liệu\nx = 2;");
        assert_eq!(stmts.len(), 1);
    }

    // -- while blocks --

    #[test]
    fn while_block_collects_body() {
        let src = "x = 1;\nwhile true\n  t = t + 0.02;\n  drawnow;\nend\n";
        let stmts = parse(src);
        assert_eq!(stmts.len(), 2);
        let Statement::While(block) = &stmts[1] else {
            panic!("expected while");
        };
        assert_eq!(block.condition, "true");
        assert_eq!(block.body.len(), 2);
        assert_eq!(block.body[1], Statement::Drawnow);
    }

    #[test]
    fn while_condition_is_always_true_placeholder() {
        let stmts = parse("while k < 10\ndrawnow;\nend");
        let Statement::While(block) = &stmts[0] else {
            panic!("expected while");
        };
        assert_eq!(block.condition, "true", "condition text is not kept");
    }

    #[test]
    fn nested_blocks_are_flattened() {
        let src = "\
while true
  a = 1;
  if mode
    b = 2;
  end
  c = 3;
end
d = 4;";
        let stmts = parse(src);
        assert_eq!(stmts.len(), 2, "while block plus trailing assignment");
        let Statement::While(block) = &stmts[0] else {
            panic!("expected while");
        };
        // `if` and its `end` are consumed for depth only; the inner body is
        // flattened into the loop body.
        assert_eq!(block.body.len(), 3);
        let names: Vec<_> = block
            .body
            .iter()
            .map(|s| match s {
                Statement::Assignment(a) => a.variable.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn unterminated_while_consumes_rest() {
        let stmts = parse("while true\nx = 1;\n");
        assert_eq!(stmts.len(), 1);
        let Statement::While(block) = &stmts[0] else {
            panic!("expected while");
        };
        assert_eq!(block.body.len(), 1);
    }

    #[test]
    fn demo_program_parses() {
        let src = "\
figure('Position',[300,50,900,900], 'Color','k');
axes(gcf, 'NextPlot','add', 'Position',[0,0,1,1], 'Color','k');
axis([0, 400, 0, 400]); axis off;

% initial data
num_points = 1e4;
SHdl = scatter([], [], 2, 'filled','o','w', 'MarkerEdgeColor','none', 'MarkerFaceAlpha',0.6);
t = 0;
i = 1:num_points;

r_base = sqrt(i) * 1.5;
theta_base = i * (137.5 * pi / 180);

while true
    t = t + 0.02;

    r = r_base + 10 .* sin(r_base./20 - t*3);
    theta = theta_base + t/2 + 5./r_base .* sin(t);

    x = r .* cos(theta) + 200;
    y = r .* sin(theta) + 200;

    SHdl.XData = x;
    SHdl.YData = y;
    SHdl.CData = sin(i'/1000 + t) * 0.5 + 0.5;

    drawnow;
end";
        let stmts = parse(src);
        // figure, axes, axis, 5 assignments + scatter, while
        assert_eq!(stmts.len(), 10);
        assert!(matches!(stmts[0], Statement::Figure(_)));
        assert!(matches!(stmts[1], Statement::Axes(_)));
        assert!(matches!(stmts[2], Statement::Axis(_)));
        assert!(matches!(stmts[4], Statement::Scatter(_)));
        let Statement::While(block) = &stmts[9] else {
            panic!("expected trailing while");
        };
        assert_eq!(block.body.len(), 9);
        assert_eq!(block.body[8], Statement::Drawnow);
    }
}
