/// Diagnostic tool: lay out many random trees and check the tiling invariants
use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use treemap_rs::layout::{Layout, LayoutConfig, Mode, Treemap};
use treemap_rs::tree::input::{NodeSpec, ValueMode};
use treemap_rs::tree::{build_tree, revalue};
use treemap_rs::NodeTree;

const EPS: f64 = 1e-6;

#[derive(Parser, Debug)]
#[command(name = "debug-layout", about = "Check treemap layout invariants on random trees")]
struct Cli {
    /// Number of random trees
    #[arg(long, default_value_t = 1000)]
    trees: u64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 1920.0)]
    width: f64,

    #[arg(long, default_value_t = 1080.0)]
    height: f64,

    /// Maximum nesting depth of generated trees
    #[arg(long, default_value_t = 4)]
    depth: u32,

    #[arg(long, default_value = "squarify")]
    mode: Mode,

    /// Also re-lay out each tree with changed values in sticky mode
    #[arg(long)]
    sticky: bool,
}

#[derive(Debug, Default)]
struct Report {
    trees: u64,
    rects: usize,
    gaps: usize,
    overlaps: usize,
    escapes: usize,
    disproportions: usize,
    worst_aspect: f64,
    aspect_sum: f64,
    aspect_count: usize,
}

impl Report {
    fn merge(mut self, other: Report) -> Report {
        self.trees += other.trees;
        self.rects += other.rects;
        self.gaps += other.gaps;
        self.overlaps += other.overlaps;
        self.escapes += other.escapes;
        self.disproportions += other.disproportions;
        self.worst_aspect = self.worst_aspect.max(other.worst_aspect);
        self.aspect_sum += other.aspect_sum;
        self.aspect_count += other.aspect_count;
        self
    }

    /// Sticky re-layouts may legitimately bend proportions when a recorded
    /// row no longer fits, so only tiling failures count.
    fn anomalies(&self) -> usize {
        self.gaps + self.overlaps + self.escapes
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("treemap_rs=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = LayoutConfig {
        width: cli.width,
        height: cli.height,
        mode: cli.mode,
        sticky: cli.sticky,
        ..LayoutConfig::default()
    };
    let treemap = Treemap::new(config)?;

    println!("=== DIAGNOSTIC: random tree -> layout ===");
    println!(
        "{} trees, seed {}, {}x{}, mode {:?}, sticky {}",
        cli.trees, cli.seed, cli.width, cli.height, cli.mode, cli.sticky
    );

    let report = (0..cli.trees)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(cli.seed.wrapping_add(i));
            let spec = random_spec(&mut rng, cli.depth, "t");
            let mut tree = build_tree(&spec, ValueMode::Value);
            let mut layout = treemap.layout(&mut tree);
            if cli.sticky {
                revalue(&mut tree, |_, _| rng.random_range(1..=100u32) as f64);
                layout = treemap.layout(&mut tree);
            }
            check(&tree, &layout)
        })
        .reduce(Report::default, Report::merge);

    println!("\n[1] Laid out {} trees, {} rectangles", report.trees, report.rects);
    println!("\n[2] Anomalies:");
    println!("    Gaps (children do not fill parent): {}", report.gaps);
    println!("    Overlapping siblings:               {}", report.overlaps);
    println!("    Children escaping parent:           {}", report.escapes);
    println!("    Area not proportional to value:     {}", report.disproportions);

    let mean = if report.aspect_count > 0 {
        report.aspect_sum / report.aspect_count as f64
    } else {
        0.0
    };
    println!("\n[3] Leaf aspect ratios: mean {:.3}, worst {:.3}", mean, report.worst_aspect);

    if report.anomalies() > 0 {
        anyhow::bail!("{} layout anomalies found", report.anomalies());
    }
    Ok(())
}

fn random_spec(rng: &mut StdRng, depth: u32, name: &str) -> NodeSpec {
    if depth == 0 || rng.random_bool(0.4) {
        return NodeSpec::leaf(name, rng.random_range(0.0..100.0));
    }
    let n = rng.random_range(1..10);
    let children = (0..n)
        .map(|i| random_spec(rng, depth - 1, &format!("{name}.{i}")))
        .collect();
    NodeSpec::branch(name, children)
}

fn check(tree: &NodeTree, layout: &Layout) -> Report {
    let mut report = Report {
        trees: 1,
        rects: layout.len(),
        ..Report::default()
    };
    for parent in tree.descendants(tree.root) {
        let children: Vec<_> = tree.children(parent).collect();
        if children.is_empty() {
            continue;
        }
        let outer = tree.get(parent).cell;
        let parent_value = tree.get(parent).value;
        let mut covered = 0.0;

        for (i, &a) in children.iter().enumerate() {
            let Some(ra) = layout.get(a).map(|r| r.cell()) else {
                continue;
            };
            covered += ra.area();

            if ra.x < outer.x - EPS
                || ra.y < outer.y - EPS
                || ra.right() > outer.right() + EPS
                || ra.bottom() > outer.bottom() + EPS
            {
                report.escapes += 1;
            }

            if parent_value > 0.0 {
                let expected = outer.area() * tree.get(a).value / parent_value;
                if (ra.area() - expected).abs() > 1e-6 * outer.area().max(1.0) {
                    report.disproportions += 1;
                }
            }

            for &b in &children[i + 1..] {
                let Some(rb) = layout.get(b).map(|r| r.cell()) else {
                    continue;
                };
                let ox = ra.right().min(rb.right()) - ra.x.max(rb.x);
                let oy = ra.bottom().min(rb.bottom()) - ra.y.max(rb.y);
                if ox > EPS && oy > EPS {
                    report.overlaps += 1;
                }
            }
        }

        if parent_value > 0.0 && (covered - outer.area()).abs() > 1e-6 * outer.area().max(1.0) {
            report.gaps += 1;
        }
    }

    for rect in layout.leaves().filter(|r| r.dx > 0.0 && r.dy > 0.0) {
        let aspect = (rect.dx / rect.dy).max(rect.dy / rect.dx);
        report.worst_aspect = report.worst_aspect.max(aspect);
        report.aspect_sum += aspect;
        report.aspect_count += 1;
    }

    report
}
