mod platform;

use glfw::{Action, Context as _, Key, Modifiers, WindowEvent};
use lumen_demos::{Example, InputAction, LoopFeedback};
use lumen_glfw::{GlfwSurface, GlfwSurfaceError, WindowDim, WindowOpt};
use platform::{DesktopFetchError, DesktopPlatformServices};
use std::{fmt, iter, path::PathBuf, process, time::Instant};
use structopt::StructOpt;

// exit code when the window or a resource cannot be set up
const SETUP_FAILURE_EXIT_CODE: i32 = -1;

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  #[structopt(short, long)]
  /// List available steps.
  list_examples: bool,

  #[structopt(long, parse(from_os_str))]
  /// Directory where to pick shader sources from.
  shaders: Option<PathBuf>,

  #[structopt(long, parse(from_os_str))]
  /// Directory where to pick assets from.
  assets: Option<PathBuf>,

  #[structopt(long, default_value = "icosphere.norm.txt")]
  /// Mesh asset of the lit steps, relative to the assets directory.
  mesh: String,

  #[structopt(long, default_value = "1280")]
  /// Width of the window.
  width: u32,

  #[structopt(long, default_value = "720")]
  /// Height of the window.
  height: u32,

  #[structopt(long)]
  /// Do not synchronize buffer swaps with the display.
  no_vsync: bool,

  /// Step to run.
  example: Option<String>,
}

/// Options with the default directories filled in.
#[derive(Debug)]
pub struct ResolvedOpts {
  pub shaders: PathBuf,
  pub assets: PathBuf,
  pub mesh: String,
}

impl From<&CLIOpts> for ResolvedOpts {
  fn from(cli_opts: &CLIOpts) -> Self {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    ResolvedOpts {
      shaders: cli_opts
        .shaders
        .clone()
        .unwrap_or_else(|| manifest_dir.join("../common/shaders")),
      assets: cli_opts
        .assets
        .clone()
        .unwrap_or_else(|| manifest_dir.join("../../assets")),
      mesh: cli_opts.mesh.clone(),
    }
  }
}

#[derive(Debug)]
enum RunError {
  Fetch(DesktopFetchError),
  Surface(GlfwSurfaceError),
}

impl fmt::Display for RunError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      RunError::Fetch(ref e) => write!(f, "cannot fetch resources: {}", e),
      RunError::Surface(ref e) => write!(f, "cannot create the window: {}", e),
    }
  }
}

impl RunError {
  fn exit_code(&self) -> i32 {
    match self {
      RunError::Fetch(_) | RunError::Surface(_) => SETUP_FAILURE_EXIT_CODE,
    }
  }
}

impl From<DesktopFetchError> for RunError {
  fn from(e: DesktopFetchError) -> Self {
    RunError::Fetch(e)
  }
}

impl From<GlfwSurfaceError> for RunError {
  fn from(e: GlfwSurfaceError) -> Self {
    RunError::Surface(e)
  }
}

/// Macro to declaratively add steps.
macro_rules! examples {
  ($($ex_name:literal, $test_ident:ident),* $(,)?) => {
    fn show_available_examples() {
      println!("available steps:");
      $( println!("  - {}", $ex_name); )*
    }

    // create a function that will run a step based on its name
    fn pick_and_run_example(cli_opts: CLIOpts) -> Result<(), RunError> {
      let example_name = cli_opts.example.as_deref();
      match example_name {
        $(
          Some($ex_name) => {
            run_example::<lumen_demos::$test_ident::LocalExample>(&cli_opts, $ex_name)
          }
        ),*

        _ => {
          log::error!("no step found");
          show_available_examples();
          Ok(())
        }
      }
    }
  }
}

// Run a step until it exits or its window gets closed.
fn run_example<E>(cli_opts: &CLIOpts, name: &str) -> Result<(), RunError>
where
  E: Example,
{
  // Check the features so that we know what we need to load.
  let mut services = DesktopPlatformServices::new(&ResolvedOpts::from(cli_opts), &E::features())?;

  let dim = WindowDim::Windowed {
    width: cli_opts.width,
    height: cli_opts.height,
  };
  let win_opt = WindowOpt::default()
    .set_dim(dim)
    .set_vsync(!cli_opts.no_vsync);
  let surface = GlfwSurface::new_gl33(name, win_opt)?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let example = E::bootstrap(&mut services, &mut context)?;
  let start_t = Instant::now();

  // render a first frame with the actual framebuffer size; steps start with a default one
  let [width, height] = context.framebuffer_size();
  let feedback = example.render_frame(
    0.,
    iter::once(InputAction::Resized { width, height }),
    &mut context,
  );
  let mut example = match feedback {
    LoopFeedback::Exit => return Ok(()),
    LoopFeedback::Continue(example) => example,
  };
  context.window.swap_buffers();

  'app: loop {
    context.window.glfw.poll_events();
    let actions = glfw::flush_messages(&events).flat_map(|(_, event)| adapt_events(event));

    let t = start_t.elapsed().as_secs_f32();
    let feedback = example.render_frame(t, actions, &mut context);

    if let LoopFeedback::Continue(stepped) = feedback {
      example = stepped;
    } else {
      break 'app;
    }

    if context.window.should_close() {
      break 'app;
    }

    context.window.swap_buffers();
  }

  log::info!("bye");
  Ok(())
}

fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(Key::Space, _, Action::Release, mods) => {
      if mods.is_empty() {
        Some(InputAction::MainToggle)
      } else if mods == Modifiers::Shift {
        Some(InputAction::AuxiliaryToggle)
      } else {
        None
      }
    }

    WindowEvent::Key(Key::Backspace, _, Action::Release, _) => Some(InputAction::Reset),

    WindowEvent::Key(key, _, Action::Press, _) | WindowEvent::Key(key, _, Action::Repeat, _) => {
      log::debug!("key press: {:?}", key);
      match key {
        Key::A => Some(InputAction::Left),
        Key::D => Some(InputAction::Right),
        Key::W => Some(InputAction::Forward),
        Key::S => Some(InputAction::Backward),
        Key::F => Some(InputAction::Up),
        Key::R => Some(InputAction::Down),
        _ => None,
      }
    }

    WindowEvent::FramebufferSize(width, height) => Some(InputAction::Resized {
      width: width.max(0) as _,
      height: height.max(0) as _,
    }),

    WindowEvent::Scroll(_, amount) => Some(InputAction::VScroll {
      amount: amount as f32,
    }),

    _ => None,
  }
}

examples! {
  "hello-triangle", hello_triangle,
  "cube", cube,
  "phong", phong,
  "shadow", shadow,
  "post-process", post_process,
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if cli_opts.list_examples {
    show_available_examples();
  } else if let Err(e) = pick_and_run_example(cli_opts) {
    log::error!("{}", e);
    process::exit(e.exit_code());
  }
}
