//! Chart series data and templates
//!
//! A chart series reads its axis from column A of the embedded sheet and its
//! values from the column after it: series `i` is field `i + 1`.

use std::borrow::Cow;

use reportbind_core::{column, AccentColor, TabularResult};
use reportbind_opc::{Content, Element};

use crate::error::{ChartError, ChartResult};

/// Everything written into one `c:ser`, derived from the data alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesData {
    /// `c:idx/@val`
    pub index: u32,
    /// `c:order/@val`
    pub order: u32,
    /// Series name (the field name)
    pub name: String,
    /// Formula of the header cell holding the name
    pub name_formula: String,
    /// Axis labels (first column of every row)
    pub categories: Vec<String>,
    /// Formula of the axis column
    pub category_formula: String,
    /// Point values (this series' column of every row)
    pub values: Vec<String>,
    /// Formula of the value column
    pub value_formula: String,
    /// Fill to apply, for series cloned from a template
    pub fill: Option<AccentColor>,
}

impl SeriesData {
    /// Data of the series at zero-based `position`, reading field `position + 1`
    pub fn from_result(data: &TabularResult, sheet: &str, position: usize) -> ChartResult<Self> {
        let field = position + 1;
        let name = data.fields().get(field).ok_or_else(|| {
            ChartError::TemplateContract(format!(
                "series {} has no data column ({} fields)",
                position,
                data.column_count()
            ))
        })?;

        let rows = data.row_count();
        let value_column = column::letters_for_index(field);

        Ok(Self {
            index: position as u32,
            order: position as u32,
            name: name.clone(),
            name_formula: cell_formula(sheet, &value_column, 1),
            categories: data.column(0).map(str::to_string).collect(),
            category_formula: column_formula(sheet, "A", rows),
            values: data.column(field).map(str::to_string).collect(),
            value_formula: column_formula(sheet, &value_column, rows),
            fill: None,
        })
    }

    /// Set the fill applied by [`SeriesData::apply_identity`]
    pub fn with_fill(mut self, fill: AccentColor) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Write `c:idx`, `c:order` and, when set, the fill into a `c:ser`
    pub fn apply_identity(&self, series: &mut Element) {
        set_val(series, "c:idx", self.index, 0);
        let after_idx = series.child_position("c:idx").map_or(0, |p| p + 1);
        set_val(series, "c:order", self.order, after_idx);

        if let Some(fill) = self.fill {
            apply_fill(series, fill);
        }
    }

    /// Replace the name, category and value references of a `c:ser`.
    ///
    /// Scatter series keep their `c:xVal`/`c:yVal` element names.
    pub fn apply_data(&self, series: &mut Element) -> ChartResult<()> {
        let tx = Element::new("c:tx").with_child(string_reference(
            &self.name_formula,
            std::slice::from_ref(&self.name),
        ));
        match series.child_position("c:tx") {
            Some(position) => series.children[position] = Content::Element(tx),
            None => {
                let position = series.child_position("c:order").map_or(0, |p| p + 1);
                series.children.insert(position, Content::Element(tx));
            }
        }

        let value_name = if series.child("c:yVal").is_some() {
            "c:yVal"
        } else {
            "c:val"
        };
        let value_position = series.child_position(value_name).ok_or_else(|| {
            ChartError::TemplateContract(format!("series '{}' has no {}", self.name, value_name))
        })?;
        series.children[value_position] = Content::Element(
            Element::new(value_name)
                .with_child(number_reference(&self.value_formula, &self.values)),
        );

        let category_name = if value_name == "c:yVal" { "c:xVal" } else { "c:cat" };
        let categories = Element::new(category_name)
            .with_child(string_reference(&self.category_formula, &self.categories));
        match series.child_position(category_name) {
            Some(position) => series.children[position] = Content::Element(categories),
            None => series
                .children
                .insert(value_position, Content::Element(categories)),
        }

        Ok(())
    }
}

/// The first series of a chart, used as the prototype for added series
#[derive(Debug, Clone)]
pub struct SeriesTemplate {
    prototype: Element,
}

impl SeriesTemplate {
    /// Wrap a detached copy of a `c:ser` element
    pub fn new(prototype: Element) -> Self {
        Self { prototype }
    }

    /// A fresh series fragment with the identity and fill of `data`
    pub fn instantiate(&self, data: &SeriesData) -> Element {
        let mut series = self.prototype.clone();
        data.apply_identity(&mut series);
        series
    }
}

/// Quote a sheet name for use in a formula.
///
/// Names made only of letters, digits, `_` and `.` are used as they are,
/// unless they start with a digit or read as a cell reference (`A1`,
/// `R1C1`). Anything else is wrapped in single quotes with embedded quotes
/// doubled.
pub fn quote_sheet_name(sheet: &str) -> Cow<'_, str> {
    let plain = sheet
        .chars()
        .next()
        .map_or(false, |first| !first.is_ascii_digit())
        && sheet
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        && !looks_like_reference(sheet);
    if plain {
        Cow::Borrowed(sheet)
    } else {
        Cow::Owned(format!("'{}'", sheet.replace('\'', "''")))
    }
}

/// Whether a name would be read as an A1 or R1C1 cell reference
fn looks_like_reference(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();

    let letters = upper.chars().take_while(char::is_ascii_alphabetic).count();
    let digits = &upper[letters..];
    let a1 = (1..=3).contains(&letters)
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit());

    let r1c1 = upper
        .strip_prefix('R')
        .map(|rest| rest.trim_start_matches(|c: char| c.is_ascii_digit()))
        .map_or(false, |rest| {
            rest.is_empty()
                || rest
                    .strip_prefix('C')
                    .map_or(false, |cols| cols.chars().all(|c| c.is_ascii_digit()))
        });
    let column_only = upper
        .strip_prefix('C')
        .map_or(false, |rest| rest.chars().all(|c| c.is_ascii_digit()));

    a1 || r1c1 || column_only
}

/// Formula of a single absolute cell (`Sheet!$B$1`)
pub fn cell_formula(sheet: &str, column: &str, row: usize) -> String {
    format!("{}!${}${}", quote_sheet_name(sheet), column, row)
}

/// Formula of a data column below the header (`Sheet!$B$2:$B$25`)
pub fn column_formula(sheet: &str, column: &str, rows: usize) -> String {
    format!(
        "{}!${col}$2:${col}${}",
        quote_sheet_name(sheet),
        rows + 1,
        col = column
    )
}

/// `c:strRef` with formula and string cache
pub fn string_reference(formula: &str, values: &[String]) -> Element {
    let cache = Element::new("c:strCache")
        .with_child(point_count(values.len()))
        .with_children(points(values));
    Element::new("c:strRef")
        .with_child(Element::new("c:f").with_text(formula))
        .with_child(cache)
}

/// `c:numRef` with formula and number cache (`General` format)
pub fn number_reference(formula: &str, values: &[String]) -> Element {
    let numeric = values
        .iter()
        .enumerate()
        .filter(|(_, value)| matches!(value.trim().parse::<f64>(), Ok(n) if n.is_finite()))
        .map(|(i, value)| point(i, value.trim()));
    let cache = Element::new("c:numCache")
        .with_child(Element::new("c:formatCode").with_text("General"))
        .with_child(point_count(values.len()))
        .with_children(numeric);
    Element::new("c:numRef")
        .with_child(Element::new("c:f").with_text(formula))
        .with_child(cache)
}

/// `a:solidFill` referencing a theme accent
pub fn accent_fill(color: AccentColor) -> Element {
    let mut scheme = Element::new("a:schemeClr").with_attr("val", color.scheme_name());
    if color.tint > 0 {
        scheme.push(Element::new("a:lumMod").with_attr("val", color.lum_mod().to_string()));
        scheme.push(Element::new("a:lumOff").with_attr("val", color.lum_off().to_string()));
    }
    Element::new("a:solidFill").with_child(scheme)
}

/// Put `fill` on a series: replaces the shape fill, else the line fill,
/// else adds a shape fill.
fn apply_fill(series: &mut Element, color: AccentColor) {
    let fill = Content::Element(accent_fill(color));

    if series.child("c:spPr").is_none() {
        let position = ["c:tx", "c:order", "c:idx"]
            .iter()
            .find_map(|name| series.child_position(name))
            .map_or(0, |p| p + 1);
        let shape = Element::new("c:spPr").with_child(accent_fill(color));
        series.children.insert(position, Content::Element(shape));
        return;
    }
    let Some(shape) = series.child_mut("c:spPr") else {
        return;
    };

    if let Some(position) = shape.child_position("a:solidFill") {
        shape.children[position] = fill;
        return;
    }

    if let Some(line) = shape.child_mut("a:ln") {
        if let Some(position) = line.child_position("a:solidFill") {
            line.children[position] = fill;
            return;
        }
    }

    // Fill properties come after the transform and geometry.
    let position = ["a:custGeom", "a:prstGeom", "a:xfrm"]
        .iter()
        .find_map(|name| shape.child_position(name))
        .map_or(0, |p| p + 1);
    shape.children.insert(position, fill);
}

fn set_val(series: &mut Element, name: &str, value: u32, insert_at: usize) {
    match series.child_mut(name) {
        Some(element) => element.set_attribute("val", value.to_string()),
        None => {
            let element = Element::new(name).with_attr("val", value.to_string());
            let position = insert_at.min(series.children.len());
            series.children.insert(position, Content::Element(element));
        }
    }
}

fn point_count(count: usize) -> Element {
    Element::new("c:ptCount").with_attr("val", count.to_string())
}

fn points(values: &[String]) -> impl Iterator<Item = Element> + '_ {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| point(i, value))
}

fn point(index: usize, value: &str) -> Element {
    Element::new("c:pt")
        .with_attr("idx", index.to_string())
        .with_child(Element::new("c:v").with_text(value))
}
