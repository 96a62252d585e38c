//! Guided trajectories plotted against time, next to the closed-form curves.
//!
//! Everything is integrated before the window opens; the `SimClock` only
//! controls how much of each trajectory is drawn.

use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::error::SimResult;
use crate::simulation::reference::Band;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::TrajectorySet;
use crate::visualization::packet_view::SimClock;

/// Plot area in screen pixels
const PLOT_WIDTH: f32 = 1100.0;
const PLOT_HEIGHT: f32 = 560.0;

/// Frames it takes to reveal the full time range
const REVEAL_FRAMES: f64 = 600.0;

/// Points per dash (and per gap) of dashed curves
const DASH: usize = 4;

const TRAJECTORY_COLOR: Color = Color::srgb(0.2, 0.45, 1.0);
const REFERENCE_COLOR: Color = Color::srgb(1.0, 0.6, 0.1);
const CENTROID_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
const BAND_COLOR: Color = Color::srgb(0.55, 0.55, 0.55);

/// Integrated trajectories, their closed-form references and the one-width
/// band, already mapped to screen space
#[derive(Resource, Debug, Clone)]
pub struct TrajectoryPlot {
    pub times: Vec<f64>,
    pub trajectories: Vec<Vec<Vec2>>,
    pub references: Vec<Vec<Vec2>>,
    pub centroid: Vec<Vec2>,
    pub lower: Vec<Vec2>,
    pub upper: Vec<Vec2>,
}

impl TrajectoryPlot {
    /// Fit everything into the plot area
    pub fn fit(set: &TrajectorySet, reference: &TrajectorySet, bands: &[Band]) -> Self {
        let times = set.times.points().to_vec();
        let t_end = times.last().copied().unwrap_or(0.0).max(f64::EPSILON);

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in set.positions.iter().chain(reference.positions.iter()) {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
        for b in bands {
            lo = lo.min(b.lower);
            hi = hi.max(b.upper);
        }
        let span = (hi - lo).max(f64::EPSILON);
        let mid = 0.5 * (hi + lo);

        let to_screen = |t: f64, x: f64| {
            Vec2::new(
                ((t / t_end - 0.5) as f32) * PLOT_WIDTH,
                (((x - mid) / span) as f32) * PLOT_HEIGHT,
            )
        };
        let rows = |s: &TrajectorySet| -> Vec<Vec<Vec2>> {
            (0..s.count())
                .map(|i| {
                    s.positions
                        .row(i)
                        .iter()
                        .zip(&times)
                        .map(|(&x, &t)| to_screen(t, x))
                        .collect()
                })
                .collect()
        };

        Self {
            trajectories: rows(set),
            references: rows(reference),
            centroid: bands.iter().zip(&times).map(|(b, &t)| to_screen(t, b.centroid)).collect(),
            lower: bands.iter().zip(&times).map(|(b, &t)| to_screen(t, b.lower)).collect(),
            upper: bands.iter().zip(&times).map(|(b, &t)| to_screen(t, b.upper)).collect(),
            times,
        }
    }

    /// Number of samples with time <= `t`
    pub fn visible(&self, t: f64) -> usize {
        self.times.partition_point(|&s| s <= t)
    }
}

/// Integrate the scenario, then open the viewer; integration errors surface
/// before any window is created
pub fn run_trajectory_view(scenario: Scenario) -> SimResult<()> {
    let set = scenario.integrate()?;
    let reference = scenario.reference_set();
    let bands: Vec<Band> = scenario
        .times
        .points()
        .iter()
        .map(|&t| scenario.reference.band(t))
        .collect();

    if let Some(deviation) = set.max_abs_deviation(&reference) {
        log::info!(
            "run_trajectory_view: starting Bevy 2D viewer with {} trajectories (max deviation from reference {:.3e})",
            set.count(),
            deviation
        );
    }

    let plot = TrajectoryPlot::fit(&set, &reference, &bands);
    let clock = SimClock::new(scenario.times.last() / REVEAL_FRAMES);

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)))
        .insert_resource(clock)
        .insert_resource(plot)
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_camera)
        .add_systems(Update, (draw_plot, advance_clock).chain())
        .run();

    Ok(())
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

/// Reference curves are drawn in full; integrated trajectories are revealed up to the clock
fn draw_plot(clock: Res<SimClock>, plot: Res<TrajectoryPlot>, mut gizmos: Gizmos) {
    dashed(&mut gizmos, &plot.lower, BAND_COLOR);
    dashed(&mut gizmos, &plot.upper, BAND_COLOR);
    gizmos.linestrip_2d(plot.centroid.iter().copied(), CENTROID_COLOR);

    for reference in &plot.references {
        dashed(&mut gizmos, reference, REFERENCE_COLOR);
    }

    let n = plot.visible(clock.t);
    for trajectory in &plot.trajectories {
        gizmos.linestrip_2d(trajectory[..n].iter().copied(), TRAJECTORY_COLOR);
    }
}

fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick();
}

fn dashed(gizmos: &mut Gizmos, points: &[Vec2], color: Color) {
    for (i, pair) in points.windows(2).enumerate() {
        if (i / DASH) % 2 == 0 {
            gizmos.line_2d(pair[0], pair[1], color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::Parameters;
    use crate::simulation::reference::Reference;
    use crate::simulation::states::Grid;

    #[test]
    fn plot_fits_inside_the_area_and_reveals_by_time() {
        let reference = Reference::new(Parameters::new(1.0, 1.0, 1.0, 1.0, 4.0, 0.0));
        let times = Grid::time_grid(10.0, 101).unwrap();
        let set = reference.set(&[4.0, 4.25, 4.5], &times);
        let bands: Vec<Band> = times.points().iter().map(|&t| reference.band(t)).collect();

        let plot = TrajectoryPlot::fit(&set, &set, &bands);
        assert_eq!(plot.trajectories.len(), 3);
        for p in plot.trajectories.iter().flatten().chain(&plot.lower).chain(&plot.upper) {
            assert!(p.x.abs() <= PLOT_WIDTH / 2.0 + 1e-3);
            assert!(p.y.abs() <= PLOT_HEIGHT / 2.0 + 1e-3);
        }

        assert_eq!(plot.visible(-1.0), 0);
        assert_eq!(plot.visible(0.0), 1);
        assert_eq!(plot.visible(5.0), 51);
        assert_eq!(plot.visible(100.0), 101);
    }
}
