//! Animated plot of the wave packet: real part, imaginary part and modulus.
//!
//! The animation time is an explicit `SimClock` resource. One system advances
//! it, and `PacketFrame::update` turns a given time into the three curves.

use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::simulation::scenario::Scenario;
use crate::simulation::states::Grid;
use crate::simulation::wave_packet::WavePacket;

/// Screen pixels per unit length
const X_SCALE: f32 = 50.0;
/// Screen pixels per unit amplitude
const Y_SCALE: f32 = 250.0;

const RE_COLOR: Color = Color::srgb(0.12, 0.47, 0.71);
const IM_COLOR: Color = Color::srgb(1.0, 0.5, 0.05);
const ABS_COLOR: Color = Color::srgb(1.0, 1.0, 1.0);
const AXIS_COLOR: Color = Color::srgb(0.35, 0.35, 0.35);

/// Simulation time shown on screen
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    pub t: f64,
    pub dt: f64, // advanced once per rendered frame
}

impl SimClock {
    pub fn new(dt: f64) -> Self {
        Self { t: 0.0, dt }
    }

    pub fn tick(&mut self) {
        self.t += self.dt;
    }
}

/// Screen-space curves of one animation frame
#[derive(Resource, Debug, Clone, Default)]
pub struct PacketFrame {
    pub t: f64,
    pub re: Vec<Vec2>,
    pub im: Vec<Vec2>,
    pub abs: Vec<Vec2>,
}

impl PacketFrame {
    /// Recompute the curves for simulation time `t`
    pub fn update(&mut self, packet: &WavePacket, grid: &Grid, t: f64) {
        self.t = t;
        self.re.clear();
        self.im.clear();
        self.abs.clear();

        for &x in grid.points() {
            let psi = packet.amplitude(x, t);
            let sx = x as f32 * X_SCALE;
            self.re.push(Vec2::new(sx, psi.re as f32 * Y_SCALE));
            self.im.push(Vec2::new(sx, psi.im as f32 * Y_SCALE));
            self.abs.push(Vec2::new(sx, psi.norm() as f32 * Y_SCALE));
        }
    }
}

pub fn run_packet_view(scenario: Scenario) {
    log::info!(
        "run_packet_view: starting Bevy 2D viewer over {} grid points",
        scenario.grid.len()
    );

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)))
        .insert_resource(SimClock::new(scenario.animation_dt))
        .insert_resource(PacketFrame::default())
        .insert_resource(scenario)
        // logging is owned by env_logger in main
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_systems(Startup, setup_camera)
        .add_systems(Update, (refresh_frame, draw_frame, advance_clock).chain())
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

fn refresh_frame(clock: Res<SimClock>, scenario: Res<Scenario>, mut frame: ResMut<PacketFrame>) {
    frame.update(&scenario.packet, &scenario.grid, clock.t);
}

fn draw_frame(frame: Res<PacketFrame>, scenario: Res<Scenario>, mut gizmos: Gizmos) {
    let left = scenario.grid.first() as f32 * X_SCALE;
    let right = scenario.grid.last() as f32 * X_SCALE;
    gizmos.line_2d(Vec2::new(left, 0.0), Vec2::new(right, 0.0), AXIS_COLOR);
    gizmos.line_2d(Vec2::new(0.0, -Y_SCALE), Vec2::new(0.0, Y_SCALE), AXIS_COLOR);

    gizmos.linestrip_2d(frame.re.iter().copied(), RE_COLOR);
    gizmos.linestrip_2d(frame.im.iter().copied(), IM_COLOR);
    gizmos.linestrip_2d(frame.abs.iter().copied(), ABS_COLOR);
}

fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.tick();
}
