// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    window::WindowBuilder,
};

use render_lessons::app::App;
use render_lessons::engine_lib::controller::InputResponse;
use render_lessons::{LessonConfig, LessonKind, Result};

fn cli() -> Command {
    Command::new("render_lessons")
        .about("Runs one of the rendering lessons in a window")
        .arg(
            Arg::new("lesson")
                .value_name("LESSON")
                .help("shader-glsl, shader-class, load-model, frame-buffers or text-rendering")
                .required_unless_present("list"),
        )
        .arg(
            Arg::new("assets")
                .short('a')
                .long("assets")
                .value_name("DIR")
                .help("Directory that static/, shader/ and Fonts/ are resolved against"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML file with window and asset settings"),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List the available lessons and exit")
                .action(ArgAction::SetTrue),
        )
}

fn lesson_config(matches: &ArgMatches) -> Result<LessonConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => LessonConfig::load_from_file(path)?,
        None => LessonConfig::default(),
    };
    if let Some(dir) = matches.get_one::<String>("assets") {
        config.asset_dir = PathBuf::from(dir);
    }
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    Exit,
    SkipFrame,
}

fn surface_recovery(error: &wgpu::SurfaceError) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => {
            log::error!("GPU out of memory, exiting");
            SurfaceRecovery::Exit
        }
        e => {
            log::error!("Surface error: {:?}", e);
            SurfaceRecovery::SkipFrame
        }
    }
}

pub async fn run() -> Result<()> {
    let matches = cli().get_matches();

    if matches.get_flag("list") {
        for kind in LessonKind::ALL {
            println!("{:<16}{}", kind.name(), kind.description());
        }
        return Ok(());
    }

    let kind: LessonKind = match matches.get_one::<String>("lesson") {
        Some(name) => name.parse()?,
        None => return Ok(()),
    };
    let config = lesson_config(&matches)?;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .with_resizable(config.resizable)
            .build(&event_loop)?,
    );

    let mut app_state = App::new(window.clone(), kind, config).await?;
    let mut last_time = std::time::Instant::now();

    event_loop.run(move |event, target: &EventLoopWindowTarget<()>| {
        target.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, window_id } if window_id == window.id() => {
                match app_state.handle_window_event(event, &window) {
                    InputResponse::Exit => target.exit(),
                    InputResponse::Consumed => {}
                    InputResponse::Ignored => match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::Resized(physical_size) => app_state.resize(*physical_size),
                        _ => {}
                    },
                }
            }
            Event::AboutToWait => {
                let now = std::time::Instant::now();
                let dt = (now - last_time).as_secs_f32();
                last_time = now;

                app_state.update(dt);
                if let Err(e) = app_state.render(&window) {
                    match surface_recovery(&e) {
                        SurfaceRecovery::Reconfigure => app_state.resize(app_state.get_size()),
                        SurfaceRecovery::Exit => target.exit(),
                        SurfaceRecovery::SkipFrame => {}
                    }
                }

                if !target.exiting() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    })?;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
