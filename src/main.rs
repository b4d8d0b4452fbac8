use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPoolBuilder};
use bevy::window::{PresentMode, WindowResolution};
use micromegas_telemetry_sink::TelemetryGuardBuilder;
use micromegas_telemetry_sink::tracing_interop::TracingCaptureLayer;
use micromegas_tracing::dispatch::{flush_thread_buffer, init_thread_stream, unregister_thread_stream};
use micromegas_tracing::levels::LevelFilter;
use micromegas_tracing::prelude::info;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use warrior_arena::resources::ArenaConfig;
use warrior_arena::tracing_bridge::{MicromegasBridgeLayer, SCHEDULE_SPANS};

fn main() {
    // 1. Telemetry first. Spans also need MICROMEGAS_ENABLE_CPU_TRACING=true;
    //    without it they are dropped while logs and metrics still flow.
    let _telemetry_guard = TelemetryGuardBuilder::default()
        .with_install_tracing_capture(false)
        .build()
        .expect("failed to initialize telemetry");

    info!("Warrior Arena starting");

    // 2. Route Bevy's `tracing` output into Micromegas before the app starts.
    let log_layer = TracingCaptureLayer {
        max_level: LevelFilter::Info,
    };
    let subscriber = Registry::default()
        .with(MicromegasBridgeLayer::new(SCHEDULE_SPANS))
        .with(log_layer);
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    // 3. Worker threads get a Micromegas stream. Must run before App::new()
    //    so TaskPoolPlugin reuses this pool.
    ComputeTaskPool::get_or_init(|| {
        TaskPoolBuilder::new()
            .on_thread_spawn(|| {
                init_thread_stream();
            })
            .on_thread_destroy(|| {
                flush_thread_buffer();
                unregister_thread_stream();
            })
            .build()
    });

    // 4. One simulation tick per frame; vsync caps the rate.
    let arena = ArenaConfig::default();
    let window = Window {
        title: "Warrior Arena".to_string(),
        resolution: WindowResolution::new(arena.screen_width, arena.screen_height),
        resizable: false,
        present_mode: PresentMode::AutoVsync,
        ..default()
    };
    App::new()
        .add_plugins(
            DefaultPlugins
                .build()
                .disable::<LogPlugin>()
                .set(WindowPlugin {
                    primary_window: Some(window),
                    ..default()
                }),
        )
        .insert_resource(arena)
        .add_plugins(warrior_arena::WarriorArenaPlugin)
        .run();
}
