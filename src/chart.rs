//! Bar geometry for simple charts, built on [`LinearScale`].

use serde::Serialize;

use crate::scale::LinearScale;

/// One positioned bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub index: usize,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Wide enough to carry a text label
    pub show_label: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    /// Bars grow along x, stacked down the y axis.
    Horizontal,
    /// Bars grow along y, placed along the x axis.
    Vertical,
}

/// Options for a single stacked proportional bar.
#[derive(Debug, Clone, Copy)]
pub struct AreabarOptions {
    pub width: f64,
    pub bar_height: f64,
    /// Space kept free at the far end of the container
    pub buffer: f64,
    /// Subtracted from every segment width to leave a visible seam
    pub gap: f64,
    /// Segments wider than this show their label
    pub label_min: f64,
}

impl Default for AreabarOptions {
    fn default() -> Self {
        Self {
            width: 400.0,
            bar_height: 20.0,
            buffer: 5.0,
            gap: 1.5,
            label_min: 50.0,
        }
    }
}

/// Split one bar into segments proportional to `values`, left to right.
pub fn areabar(values: &[f64], opts: &AreabarOptions) -> Vec<Bar> {
    let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
    let scale = LinearScale::new([0.0, total], [0.0, (opts.width - opts.buffer).max(0.0)]);

    let mut offset = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let value = value.max(0.0);
            let w = (scale.span(value) - opts.gap).max(0.0);
            let bar = Bar {
                index,
                value,
                x: scale.map(offset),
                y: 0.0,
                w,
                h: opts.bar_height,
                show_label: w > opts.label_min,
            };
            offset += value;
            bar
        })
        .collect()
}

/// Options for a bar chart.
#[derive(Debug, Clone, Copy)]
pub struct BarOptions {
    pub width: f64,
    pub height: f64,
    pub buffer: f64,
    /// Fraction of a slot a bar occupies across its thickness
    pub thickness: f64,
    pub orientation: Orientation,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            buffer: 5.0,
            thickness: 0.96,
            orientation: Orientation::Horizontal,
        }
    }
}

/// One bar per value. The value axis spans `[0, max]`, the index axis `[0, n]`.
pub fn bars(values: &[f64], opts: &BarOptions) -> Vec<Bar> {
    let max = values.iter().copied().fold(0.0, f64::max);
    let n = values.len() as f64;
    let along_w = (opts.width - opts.buffer).max(0.0);
    let along_h = (opts.height - opts.buffer).max(0.0);

    let (value_scale, index_scale) = match opts.orientation {
        Orientation::Horizontal => (
            LinearScale::new([0.0, max], [0.0, along_w]),
            LinearScale::new([0.0, n], [0.0, along_h]),
        ),
        Orientation::Vertical => (
            LinearScale::new([0.0, max], [0.0, along_h]),
            LinearScale::new([0.0, n], [0.0, along_w]),
        ),
    };
    let thickness = index_scale.span(opts.thickness);

    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let length = value_scale.span(value.max(0.0));
            let slot = index_scale.map(index as f64);
            let (x, y, w, h) = match opts.orientation {
                Orientation::Horizontal => (0.0, slot, length, thickness),
                Orientation::Vertical => (slot, 0.0, thickness, length),
            };
            Bar {
                index,
                value,
                x,
                y,
                w,
                h,
                show_label: value > 0.0,
            }
        })
        .collect()
}

/// Slot each bar moves to when the chart is sorted by descending value.
/// Ties keep their original order.
pub fn sorted_slots(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    let mut slots = vec![0; values.len()];
    for (slot, &index) in order.iter().enumerate() {
        slots[index] = slot;
    }
    slots
}
