//! FILENAME: core/engine/src/column.rs
//! PURPOSE: Declarative column definitions and cell renderers.
//! CONTEXT: A `ColumnSpec` knows how to read its value out of a row (the
//! accessor) and how to present it (the renderer). The engine is generic over
//! the row type; only accessors know the row's shape.

use std::fmt;
use std::sync::Arc;

use crate::config::CurrencyConfig;
use crate::format::{format_currency, format_general, format_percent, format_value};
use crate::value::{DisplayValue, RawValue, Record};

pub type Accessor<R> = Arc<dyn Fn(&R) -> RawValue + Send + Sync>;
pub type PresenceCheck<R> = Arc<dyn Fn(&[R]) -> bool + Send + Sync>;
pub type CompositeFn<R> = Arc<dyn Fn(&R) -> RenderedCell + Send + Sync>;
pub type ConditionalFn<R> = Arc<dyn Fn(&R, RenderTarget) -> RenderedCell + Send + Sync>;

// ============================================================================
// RENDER OUTPUT
// ============================================================================

/// Where a cell is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// On-screen table.
    Interactive,
    /// CSV, spreadsheet and document artifacts.
    Export,
}

/// Style hint for status badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BadgeTone {
    Success,
    Warning,
    Danger,
    Info,
    #[default]
    Neutral,
}

/// The result of rendering one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedCell {
    /// Primary display text. This is what exports carry.
    pub text: String,
    /// Secondary line shown under the primary value on screen.
    pub caption: Option<String>,
    pub badge: Option<BadgeTone>,
    /// Source number when the cell shows a numeric value.
    pub numeric: Option<f64>,
}

impl RenderedCell {
    pub fn text(text: impl Into<String>) -> Self {
        RenderedCell {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn number(value: f64, text: impl Into<String>) -> Self {
        RenderedCell {
            text: text.into(),
            numeric: Some(value),
            ..Default::default()
        }
    }

    /// Runs a raw value through the shared formatter.
    pub fn formatted(raw: &RawValue) -> Self {
        let display = format_value(raw);
        RenderedCell {
            text: display.to_string(),
            numeric: display.as_f64(),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_badge(mut self, tone: BadgeTone) -> Self {
        self.badge = Some(tone);
        self
    }

    /// Text matched by column filters and the global search.
    pub fn filter_text(&self) -> String {
        match &self.caption {
            Some(caption) => format!("{} {}", self.text, caption),
            None => self.text.clone(),
        }
    }
}

// ============================================================================
// RENDERERS
// ============================================================================

/// How a column turns its value into a cell.
pub enum CellRenderer<R> {
    /// The formatted value as-is.
    Plain,
    /// Currency glyph with grouping; `None` uses the configured decimal places.
    Currency { decimal_places: Option<u8> },
    /// Ratio shown as a percentage.
    Percent { decimal_places: u8 },
    /// Enumerated status string mapped to a badge tone (case-insensitive).
    StatusBadge { badges: Vec<(String, BadgeTone)> },
    /// Custom composite display, e.g. value plus caption.
    Composite(CompositeFn<R>),
    /// Render function that can differ between screen and export.
    Conditional(ConditionalFn<R>),
}

impl<R> Clone for CellRenderer<R> {
    fn clone(&self) -> Self {
        match self {
            CellRenderer::Plain => CellRenderer::Plain,
            CellRenderer::Currency { decimal_places } => CellRenderer::Currency {
                decimal_places: *decimal_places,
            },
            CellRenderer::Percent { decimal_places } => CellRenderer::Percent {
                decimal_places: *decimal_places,
            },
            CellRenderer::StatusBadge { badges } => CellRenderer::StatusBadge {
                badges: badges.clone(),
            },
            CellRenderer::Composite(f) => CellRenderer::Composite(Arc::clone(f)),
            CellRenderer::Conditional(f) => CellRenderer::Conditional(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for CellRenderer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRenderer::Plain => f.write_str("Plain"),
            CellRenderer::Currency { decimal_places } => f
                .debug_struct("Currency")
                .field("decimal_places", decimal_places)
                .finish(),
            CellRenderer::Percent { decimal_places } => f
                .debug_struct("Percent")
                .field("decimal_places", decimal_places)
                .finish(),
            CellRenderer::StatusBadge { badges } => {
                f.debug_struct("StatusBadge").field("badges", badges).finish()
            }
            CellRenderer::Composite(_) => f.write_str("Composite(..)"),
            CellRenderer::Conditional(_) => f.write_str("Conditional(..)"),
        }
    }
}

// ============================================================================
// COLUMN SPEC
// ============================================================================

/// Visibility defaults for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityDefault {
    /// Renders, but starts switched off in the column picker.
    pub deselected: bool,
    /// Never rendered or exported.
    pub hidden: bool,
    /// Always visible; cannot be toggled off.
    pub disabled: bool,
}

/// A single column of a table schema.
pub struct ColumnSpec<R> {
    id: String,
    header: String,
    accessor: Accessor<R>,
    renderer: CellRenderer<R>,
    visibility: VisibilityDefault,
    presence: Option<PresenceCheck<R>>,
    hidden_column_refs: Vec<String>,
    sortable: bool,
    filterable: bool,
    summable: bool,
    width: Option<f64>,
}

impl<R> Clone for ColumnSpec<R> {
    fn clone(&self) -> Self {
        ColumnSpec {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            renderer: self.renderer.clone(),
            visibility: self.visibility,
            presence: self.presence.clone(),
            hidden_column_refs: self.hidden_column_refs.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            summable: self.summable,
            width: self.width,
        }
    }
}

impl<R> fmt::Debug for ColumnSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("renderer", &self.renderer)
            .field("visibility", &self.visibility)
            .field("conditional", &self.presence.is_some())
            .field("hidden_column_refs", &self.hidden_column_refs)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("summable", &self.summable)
            .finish_non_exhaustive()
    }
}

impl<R> ColumnSpec<R> {
    pub fn new<F>(id: impl Into<String>, header: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> RawValue + Send + Sync + 'static,
    {
        ColumnSpec {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            renderer: CellRenderer::Plain,
            visibility: VisibilityDefault::default(),
            presence: None,
            hidden_column_refs: Vec::new(),
            sortable: true,
            filterable: true,
            summable: false,
            width: None,
        }
    }

    // ------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------

    pub fn renderer(mut self, renderer: CellRenderer<R>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn currency(self) -> Self {
        self.renderer(CellRenderer::Currency { decimal_places: None })
    }

    pub fn percent(self, decimal_places: u8) -> Self {
        self.renderer(CellRenderer::Percent { decimal_places })
    }

    pub fn badges<S: Into<String>>(self, badges: impl IntoIterator<Item = (S, BadgeTone)>) -> Self {
        let badges = badges.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.renderer(CellRenderer::StatusBadge { badges })
    }

    pub fn composite<F>(self, f: F) -> Self
    where
        F: Fn(&R) -> RenderedCell + Send + Sync + 'static,
    {
        self.renderer(CellRenderer::Composite(Arc::new(f)))
    }

    pub fn conditional<F>(self, f: F) -> Self
    where
        F: Fn(&R, RenderTarget) -> RenderedCell + Send + Sync + 'static,
    {
        self.renderer(CellRenderer::Conditional(Arc::new(f)))
    }

    pub fn hidden(mut self) -> Self {
        self.visibility.hidden = true;
        self
    }

    pub fn deselected(mut self) -> Self {
        self.visibility.deselected = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.visibility.disabled = true;
        self
    }

    pub fn visibility(mut self, visibility: VisibilityDefault) -> Self {
        self.visibility = visibility;
        self
    }

    /// Drop the column for any dataset where `check` returns true.
    pub fn exclude_when<F>(mut self, check: F) -> Self
    where
        F: Fn(&[R]) -> bool + Send + Sync + 'static,
    {
        self.presence = Some(Arc::new(check));
        self
    }

    /// Drop the column when any row of the dataset matches `predicate`.
    pub fn exclude_when_any<F>(self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
        R: 'static,
    {
        self.exclude_when(move |rows: &[R]| rows.iter().any(&predicate))
    }

    /// Bundle other columns' values into this column's detail popover.
    pub fn bundle<S: Into<String>>(mut self, refs: impl IntoIterator<Item = S>) -> Self {
        self.hidden_column_refs = refs.into_iter().map(Into::into).collect();
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Include this column in the totals row.
    pub fn summable(mut self) -> Self {
        self.summable = true;
        self
    }

    /// Export column width hint, in characters.
    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn visibility_default(&self) -> VisibilityDefault {
        self.visibility
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility.hidden
    }

    pub fn is_disabled(&self) -> bool {
        self.visibility.disabled
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn is_summable(&self) -> bool {
        self.summable
    }

    pub fn width_hint(&self) -> Option<f64> {
        self.width
    }

    pub fn hidden_column_refs(&self) -> &[String] {
        &self.hidden_column_refs
    }

    pub fn cell_renderer(&self) -> &CellRenderer<R> {
        &self.renderer
    }

    pub fn is_numeric_renderer(&self) -> bool {
        matches!(
            self.renderer,
            CellRenderer::Currency { .. } | CellRenderer::Percent { .. }
        )
    }

    /// True when the dataset triggers this column's exclusion check.
    pub fn is_excluded_for(&self, rows: &[R]) -> bool {
        self.presence.as_ref().is_some_and(|check| check(rows))
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    pub fn raw(&self, row: &R) -> RawValue {
        (self.accessor)(row)
    }

    pub fn display(&self, row: &R) -> DisplayValue {
        format_value(&self.raw(row))
    }

    pub fn render(&self, row: &R, target: RenderTarget, currency: &CurrencyConfig) -> RenderedCell {
        match &self.renderer {
            CellRenderer::Plain => RenderedCell::formatted(&self.raw(row)),
            CellRenderer::Currency { decimal_places } => match self.display(row) {
                DisplayValue::Number(n) => RenderedCell::number(
                    n,
                    format_currency(n, decimal_places.unwrap_or(currency.decimal_places), currency),
                ),
                DisplayValue::Text(s) => RenderedCell::text(s),
            },
            CellRenderer::Percent { decimal_places } => match self.display(row) {
                DisplayValue::Number(n) => RenderedCell::number(n, format_percent(n, *decimal_places)),
                DisplayValue::Text(s) => RenderedCell::text(s),
            },
            CellRenderer::StatusBadge { badges } => {
                let cell = RenderedCell::formatted(&self.raw(row));
                let tone = badges
                    .iter()
                    .find(|(status, _)| status.eq_ignore_ascii_case(cell.text.trim()))
                    .map(|(_, tone)| *tone)
                    .unwrap_or_default();
                cell.with_badge(tone)
            }
            CellRenderer::Composite(f) => f(row),
            CellRenderer::Conditional(f) => f(row, target),
        }
    }

    /// Present a column total the way the column presents its cells.
    pub fn render_total(&self, total: f64, currency: &CurrencyConfig) -> String {
        match &self.renderer {
            CellRenderer::Currency { decimal_places } => {
                format_currency(total, decimal_places.unwrap_or(currency.decimal_places), currency)
            }
            CellRenderer::Percent { decimal_places } => format_percent(total, *decimal_places),
            _ => format_general(total),
        }
    }
}

impl ColumnSpec<Record> {
    /// Column reading the record key equal to its id.
    pub fn field(id: impl Into<String>, header: impl Into<String>) -> Self {
        let id = id.into();
        let key = id.clone();
        ColumnSpec::new(id, header, move |row: &Record| row.get(&key))
    }

    /// Column whose id differs from the record key it reads.
    pub fn keyed(id: impl Into<String>, key: impl Into<String>, header: impl Into<String>) -> Self {
        let key = key.into();
        ColumnSpec::new(id, header, move |row: &Record| row.get(&key))
    }
}
