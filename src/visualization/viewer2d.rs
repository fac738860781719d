use bevy::prelude::*;
use log::{error, info};

use crate::simulation::bounding_box::BoundingBox;
use crate::simulation::epoch::Simulation;
use crate::simulation::scenario::Scenario;
use crate::visualization::plotter::Plotter;

/// Latest frame handed over by the epoch driver
#[derive(Resource, Default)]
struct LiveFrame {
    positions: Vec<Vec2>,
    boxes: Vec<BoundingBox>,
}

/// World-to-screen mapping fixed from the initial bounding box
#[derive(Resource)]
struct ViewScale {
    center: Vec2,
    scale: f32,
}

#[derive(Resource)]
struct Driver(Box<dyn Simulation + Send + Sync>);

const HALF_VIEW: f32 = 350.0;

impl ViewScale {
    fn to_screen(&self, x: f64, y: f64) -> Vec2 {
        (Vec2::new(x as f32, y as f32) - self.center) * self.scale
    }
}

impl Plotter for LiveFrame {
    fn add_bodies_to_image(&mut self, universe: &crate::simulation::states::Universe) {
        self.positions = universe
            .positions
            .iter()
            .map(|p| Vec2::new(p.x as f32, p.y as f32))
            .collect();
    }

    fn add_bounding_boxes(&mut self, boxes: &[BoundingBox]) {
        self.boxes = boxes.to_vec();
    }

    fn write_and_clear(&mut self, _epoch: u64) -> crate::error::Result<()> {
        Ok(())
    }
}

pub fn run_2d(scenario: Scenario) {
    info!("starting 2D viewer with {} bodies", scenario.universe.num_bodies);

    let view = match scenario.universe.get_bounding_box() {
        Ok(bb) => {
            let extent = bb.width().max(bb.height()).max(f64::MIN_POSITIVE) as f32;
            let c = bb.center();
            ViewScale {
                center: Vec2::new(c.x as f32, c.y as f32),
                scale: 2.0 * HALF_VIEW / extent,
            }
        }
        Err(_) => ViewScale {
            center: Vec2::ZERO,
            scale: 1.0,
        },
    };
    let driver = Driver(scenario.simulation());

    App::new()
        .insert_resource(scenario)
        .insert_resource(driver)
        .insert_resource(view)
        .init_resource::<LiveFrame>()
        .add_plugins(DefaultPlugins)
        .add_systems(Startup, setup_camera_system)
        .add_systems(Update, (epoch_system, draw_system).chain())
        .run();
}

fn setup_camera_system(mut commands: Commands) {
    // 2D camera
    commands.spawn(Camera2dBundle::default());
}

fn epoch_system(mut scenario: ResMut<Scenario>, driver: Res<Driver>, mut frame: ResMut<LiveFrame>) {
    if scenario.universe.current_simulation_epoch >= u64::from(scenario.num_epochs) {
        return;
    }
    // plot every epoch, the frame is redrawn each update anyway
    if let Err(e) = driver.0.simulate_epoch(&mut *frame, &mut scenario.universe, true, 1) {
        error!("epoch {} failed: {e}", scenario.universe.current_simulation_epoch);
        scenario.num_epochs = 0;
    }
}

fn draw_system(frame: Res<LiveFrame>, view: Res<ViewScale>, mut gizmos: Gizmos) {
    for bb in &frame.boxes {
        let center = bb.center();
        let size = Vec2::new(bb.width() as f32, bb.height() as f32) * view.scale;
        gizmos.rect_2d(view.to_screen(center.x, center.y), 0.0, size, Color::srgb(0.3, 0.3, 0.5));
    }
    for p in &frame.positions {
        gizmos.circle_2d(view.to_screen(p.x as f64, p.y as f64), 2.0, Color::WHITE);
    }
}
