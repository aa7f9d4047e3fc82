use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::colors::palette_color;
use crate::config::DemoConfig;
use crate::error::Result;
use crate::layout::{Layout, LayoutConfig, LayoutRect, Treemap};
use crate::tree::arena::{Cell, NodeId, NodeTree};
use crate::tree::input::{NodeSpec, ValueMode};
use crate::tree::{build_forest, revalue};

/// A rectangle moving from its previous cell to its new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    pub node: NodeId,
    pub from: Cell,
    pub to: Cell,
    /// Start offset from the beginning of the frame
    pub delay_ms: u64,
    pub duration_ms: u64,
}

impl Transition {
    pub fn is_moving(&self) -> bool {
        self.from != self.to
    }
}

/// Between 4 and 12 items with values in `[0, 100)`, coloured by position.
pub fn random_items<R: Rng>(rng: &mut R, labels: &[String]) -> Vec<NodeSpec> {
    let count = rng.random_range(4..=12);
    (0..count)
        .map(|i| {
            let mut spec = NodeSpec::leaf(&format!("item-{i}"), rng.random::<f64>() * 100.0);
            spec.color = Some(palette_color(i).into());
            if !labels.is_empty() {
                spec.label = Some(labels[i % labels.len()].as_str().into());
            }
            spec
        })
        .collect()
}

/// Random flat data re-laid out on every tick.
pub struct DemoSession<R: Rng = StdRng> {
    tree: NodeTree,
    treemap: Treemap,
    layout: Layout,
    config: DemoConfig,
    rng: R,
    frame: u64,
}

impl DemoSession<StdRng> {
    /// Session seeded from `config.seed`, or from the OS when unset.
    pub fn from_config(layout: LayoutConfig, config: DemoConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(layout, config, rng)
    }
}

impl<R: Rng> DemoSession<R> {
    pub fn new(mut layout: LayoutConfig, config: DemoConfig, mut rng: R) -> Result<Self> {
        layout.sticky = config.sticky;
        let treemap = Treemap::new(layout)?;
        let items = random_items(&mut rng, &config.labels);
        let mut tree = build_forest(&items, ValueMode::Value);
        let layout = treemap.layout(&mut tree);

        tracing::info!(
            "Demo session: {} items, sticky={}",
            items.len(),
            treemap.is_sticky()
        );

        Ok(Self {
            tree,
            treemap,
            layout,
            config,
            rng,
            frame: 0,
        })
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Current rectangles, without the synthetic root.
    pub fn frame(&self) -> &[LayoutRect] {
        self.layout.without_root()
    }

    /// Give every item a new value in `1..=100`, re-lay out, and describe the moves.
    pub fn tick(&mut self) -> Vec<Transition> {
        let previous = self.layout.clone();
        let rng = &mut self.rng;
        revalue(&mut self.tree, |_, _| rng.random_range(1..=100u32) as f64);
        self.layout = self.treemap.layout(&mut self.tree);
        self.frame += 1;

        let transitions: Vec<Transition> = self
            .layout
            .without_root()
            .iter()
            .enumerate()
            .map(|(i, rect)| Transition {
                node: rect.node,
                from: previous.get(rect.node).map(LayoutRect::cell).unwrap_or_default(),
                to: rect.cell(),
                delay_ms: i as u64 * self.config.stagger_ms,
                duration_ms: self.config.duration_ms,
            })
            .collect();

        tracing::debug!(
            "Frame {}: {} of {} rectangles moved",
            self.frame,
            transitions.iter().filter(|t| t.is_moving()).count(),
            transitions.len()
        );

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(sticky: bool) -> DemoSession<StdRng> {
        let config = DemoConfig {
            sticky,
            seed: Some(7),
            ..DemoConfig::default()
        };
        let layout = LayoutConfig {
            width: 400.0,
            height: 400.0,
            ..LayoutConfig::default()
        };
        DemoSession::from_config(layout, config).unwrap()
    }

    #[test]
    fn random_items_follow_palette_and_labels() {
        let mut rng = StdRng::seed_from_u64(1);
        let labels = vec!["x".to_string(), "y".to_string()];
        let items = random_items(&mut rng, &labels);
        assert!((4..=12).contains(&items.len()));
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.color.as_deref(), Some(palette_color(i)));
            assert_eq!(item.label.as_deref(), Some(labels[i % 2].as_str()));
            let v = item.value.unwrap();
            assert!((0.0..100.0).contains(&v));
        }
    }

    #[test]
    fn random_item_count_spans_four_to_twelve() {
        let counts: Vec<usize> = (0..300)
            .map(|seed| random_items(&mut StdRng::seed_from_u64(seed), &[]).len())
            .collect();
        assert_eq!(counts.iter().min(), Some(&4));
        assert_eq!(counts.iter().max(), Some(&12));
    }

    #[test]
    fn seeded_sessions_are_reproducible() {
        let mut a = session(true);
        let mut b = session(true);
        assert_eq!(a.frame(), b.frame());
        assert_eq!(a.tick(), b.tick());
    }

    #[test]
    fn tick_fills_the_canvas_and_staggers() {
        let mut s = session(true);
        let count = s.frame().len();
        let transitions = s.tick();
        assert_eq!(transitions.len(), count);
        assert_eq!(s.frame_index(), 1);
        let total: f64 = transitions.iter().map(|t| t.to.area()).sum();
        assert!((total - 160_000.0).abs() < 1e-6);
        assert_eq!(transitions[0].delay_ms, 0);
        assert_eq!(transitions[2].delay_ms, 10);
        assert!(transitions.iter().all(|t| t.duration_ms == 800));
    }

    #[test]
    fn sticky_ticks_keep_item_order() {
        let mut s = session(true);
        let order: Vec<_> = s.frame().iter().map(|r| r.node).collect();
        for _ in 0..5 {
            s.tick();
        }
        let after: Vec<_> = s.frame().iter().map(|r| r.node).collect();
        assert_eq!(order, after);
    }

    #[test]
    fn values_after_tick_are_whole_numbers() {
        let mut s = session(false);
        s.tick();
        for rect in s.frame() {
            assert!(rect.value >= 1.0 && rect.value <= 100.0);
            assert_eq!(rect.value.fract(), 0.0);
        }
    }
}
