//! Headless walkthrough of a fade engine driving scene swaps with `bevy_fade_to_background`.
//!
//! - A generator produces a new patch of ground every few seconds
//! - Before each swap the engine plays its final disappear and the swap waits for it
//! - The engine appears again once the generator reports that the new patch is finished
//! - The camera drifts toward the patch edge, shrinking the fade range through the bounds cutoff
//!
//! Run with `RUST_LOG=info` (the default filter) to follow the lifecycle in the log.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_fade_to_background::prelude::*;

const FRAME_MS: u64 = 50;
const SWAP_INTERVAL_SECS: f32 = 6.0;
const PATCH_SIZE: f32 = 120.0;
const CAMERA_DRIFT_PER_SEC: f32 = 6.0;
const SWAPS_BEFORE_EXIT: u32 = 3;

fn main() {
    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(FRAME_MS))),
            LogPlugin::default(),
            FadeToBackgroundPlugin,
        ))
        .init_resource::<SwapState>()
        .add_systems(Startup, setup)
        .add_systems(PostStartup, announce_first_patch)
        .add_systems(
            Update,
            (drift_camera, request_swap, log_parameters).after(FadeToBackgroundSystems),
        )
        .add_observer(swap_scene)
        .add_observer(log_appear_finished)
        .add_observer(log_disappear_finished)
        .run();
}

#[derive(Resource)]
struct SceneEntities {
    camera:    Entity,
    generator: Entity,
    engine:    Entity,
}

#[derive(Resource)]
struct SwapState {
    timer:     Timer,
    swaps:     u32,
    swapping:  bool,
    patch_seq: u32,
}

impl Default for SwapState {
    fn default() -> Self {
        Self {
            timer:     Timer::from_seconds(SWAP_INTERVAL_SECS, TimerMode::Repeating),
            swaps:     0,
            swapping:  false,
            patch_seq: 0,
        }
    }
}

fn setup(mut commands: Commands) -> Result {
    let curve = FadeCurve::ease_in_out(0.0, 0.0, 1.5, 1.0)?;

    let camera = commands
        .spawn((
            Name::new("Camera"),
            GlobalTransform::from(Transform::from_xyz(0.0, 8.0, 0.0)),
        ))
        .id();

    let generator = commands
        .spawn((
            Name::new("Generator"),
            GeneratedBounds(Some(WorldBounds::from_center(Vec3::ZERO, PATCH_SIZE))),
        ))
        .id();

    let engine = commands
        .spawn((
            Name::new("FadeToBackground"),
            FadeToBackground::default()
                .with_camera(camera)
                .with_generator(generator)
                .with_cutoff(10.0, 1.0)
                .with_distances(20.0, 40.0)
                .with_on_enable(OnEnableBehavior::AppearAfterExternalSignal)
                .with_mode(AnimationMode::Fade)
                .with_curve(curve),
        ))
        .id();

    commands.insert_resource(SceneEntities {
        camera,
        generator,
        engine,
    });

    Ok(())
}

/// The first patch is ready as soon as the engine is listening
fn announce_first_patch(mut commands: Commands, scene: Res<SceneEntities>) {
    commands.trigger(GenerationFinished::new(scene.generator));
}

fn drift_camera(
    time: Res<Time>,
    scene: Res<SceneEntities>,
    mut camera_query: Query<&mut GlobalTransform>,
) {
    let Ok(mut transform) = camera_query.get_mut(scene.camera) else {
        return;
    };

    let offset = Vec3::X * CAMERA_DRIFT_PER_SEC * time.delta_secs();
    *transform = GlobalTransform::from_translation(transform.translation() + offset);
}

fn request_swap(
    mut commands: Commands,
    time: Res<Time>,
    scene: Res<SceneEntities>,
    mut state: ResMut<SwapState>,
) {
    if state.swapping || !state.timer.tick(time.delta()).just_finished() {
        return;
    }

    info!("Swap requested, waiting for the final disappear");
    state.swapping = true;
    commands.trigger(PlayFinalDisappear::new(scene.engine));
}

/// Replaces the patch once the engine is hidden, then reports the new patch as generated
fn swap_scene(
    finished: On<FinalDisappearFinished>,
    mut commands: Commands,
    scene: Res<SceneEntities>,
    mut state: ResMut<SwapState>,
    mut camera_query: Query<&mut GlobalTransform>,
    mut exit: MessageWriter<AppExit>,
) {
    if finished.entity != scene.engine {
        return;
    }

    state.swapping = false;
    state.swaps += 1;
    state.patch_seq += 1;

    if state.swaps >= SWAPS_BEFORE_EXIT {
        info!("Completed {} swaps, exiting", state.swaps);
        exit.write(AppExit::Success);
        return;
    }

    let center = Vec3::new(0.0, 0.0, state.patch_seq as f32 * PATCH_SIZE);
    info!("Swapping to patch {} centered at {center}", state.patch_seq);

    commands
        .entity(scene.generator)
        .insert(GeneratedBounds(Some(WorldBounds::from_center(center, PATCH_SIZE))));

    if let Ok(mut transform) = camera_query.get_mut(scene.camera) {
        *transform = GlobalTransform::from_translation(center + Vec3::Y * 8.0);
    }

    commands.trigger(GenerationFinished::new(scene.generator));
}

fn log_parameters(
    scene: Res<SceneEntities>,
    fade_query: Query<(&FadeTransition, &BoundsCutoff, Ref<FadeRenderParameters>)>,
) {
    let Ok((transition, cutoff, parameters)) = fade_query.get(scene.engine) else {
        return;
    };

    if parameters.is_changed() {
        debug!(
            "{:?} t={:.2} cutoff={:.2} opacity={:.2} range=[{:.1}, {:.1}]",
            transition.phase(),
            transition.current_second(),
            cutoff.current_ratio,
            parameters.opacity,
            parameters.opaque_distance(),
            parameters.transparent_distance()
        );
    }
}

fn log_appear_finished(event: On<AppearAnimationFinished>, time: Res<Time>) {
    info!("{:.2}s: {:?} fully visible", time.elapsed_secs(), event.entity);
}

fn log_disappear_finished(event: On<DisappearAnimationFinished>, time: Res<Time>) {
    info!("{:.2}s: {:?} fully hidden", time.elapsed_secs(), event.entity);
}
