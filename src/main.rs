use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use mobius::control::{Controller, DEFAULT_SOCKET_PATH};
use mobius::mqtt::{MqttClient, DEFAULT_PORT, DEFAULT_TOPIC};
use mobius::terminal::{self, TerminalInput, TerminalSession};
use mobius::util::FrameClock;
use mobius::{ColorMode, Command, DriverState, RenderConfig, Renderer};
use std::io::{self, BufWriter, Write};
use std::thread;

const DENSE_STEPS: (f64, f64) = (0.009, 0.006);
const FPS_LOG_INTERVAL: u64 = 300;

/// Command line options
struct Options {
    width: Option<usize>,
    height: Option<usize>,
    color: Option<ColorMode>,
    config_path: Option<String>,
    frames: Option<u64>,
    fps: u32,
    dense: bool,
    socket: Option<String>,
    mqtt_host: Option<String>,
    mqtt_port: u16,
    topic: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            color: None,
            config_path: None,
            frames: None,
            fps: 60,
            dense: false,
            socket: None,
            mqtt_host: None,
            mqtt_port: DEFAULT_PORT,
            topic: DEFAULT_TOPIC.to_string(),
        }
    }
}

fn print_help() {
    println!("Usage: mobius [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --width W, -w W        Grid width in cells (default: terminal width or 80)");
    println!("  --height H, -h H       Grid height in cells (default: terminal height - 1 or 24)");
    println!("  --size WxH, -s WxH     Grid size (e.g., 120x40)");
    println!("  --color MODE, -c MODE  green, rainbow, synthwave, depth or white");
    println!("  --config FILE          Load render settings from a JSON file");
    println!("  --dense                Sample the surface finely (slower, smoother)");
    println!("  --fps N                Frame rate cap, 0 for uncapped (default: 60)");
    println!("  --frames N             Render N frames and exit");
    println!("  --socket [PATH]        Accept commands on a Unix socket (default: {})", DEFAULT_SOCKET_PATH);
    println!("  --mqtt HOST            Accept commands from an MQTT broker");
    println!("  --mqtt-port PORT       MQTT broker port (default: {})", DEFAULT_PORT);
    println!("  --topic TOPIC          MQTT topic (default: {})", DEFAULT_TOPIC);
    println!("  --help                 Show this help message");
    println!();
    println!("Keys:");
    println!("  space pause, 1-5 color mode, + / = faster, - slower, q / Esc quit");
    println!();
    println!("Commands (socket lines or MQTT payloads):");
    println!("  pause | 1-5 | color MODE | + | - | light X Y | grab | drag DX DY | release | quit");
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

/// Parse command line arguments
fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        let next = args.get(i + 1);
        match args[i].as_str() {
            "--width" | "-w" => {
                options.width = Some(parse_value(&args[i], next)?);
                i += 1;
            },
            "--height" | "-h" => {
                options.height = Some(parse_value(&args[i], next)?);
                i += 1;
            },
            "--size" | "-s" => {
                // Parse WxH format (e.g., 120x40)
                let size = next.ok_or("--size needs a value")?;
                let (w, h) = size
                    .split_once('x')
                    .ok_or_else(|| format!("Invalid size: {}", size))?;
                options.width = Some(parse_value("--size", Some(&w.to_string()))?);
                options.height = Some(parse_value("--size", Some(&h.to_string()))?);
                i += 1;
            },
            "--color" | "-c" => {
                let name = next.ok_or("--color needs a value")?;
                options.color = Some(name.parse().map_err(|e| format!("{}", e))?);
                i += 1;
            },
            "--config" => {
                options.config_path = Some(next.ok_or("--config needs a value")?.clone());
                i += 1;
            },
            "--frames" => {
                options.frames = Some(parse_value(&args[i], next)?);
                i += 1;
            },
            "--fps" => {
                options.fps = parse_value(&args[i], next)?;
                i += 1;
            },
            "--dense" => options.dense = true,
            "--socket" => match next.filter(|p| !p.starts_with('-')) {
                Some(path) => {
                    options.socket = Some(path.clone());
                    i += 1;
                },
                None => options.socket = Some(DEFAULT_SOCKET_PATH.to_string()),
            },
            "--mqtt" => {
                options.mqtt_host = Some(next.ok_or("--mqtt needs a host")?.clone());
                i += 1;
            },
            "--mqtt-port" => {
                options.mqtt_port = parse_value(&args[i], next)?;
                i += 1;
            },
            "--topic" => {
                options.topic = next.ok_or("--topic needs a value")?.clone();
                i += 1;
            },
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => log::warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    Ok(options)
}

/// Base render settings: config file, then terminal size, then flags
fn base_config(options: &Options) -> Result<RenderConfig, String> {
    let mut config = match &options.config_path {
        Some(path) => RenderConfig::load(path).map_err(|e| format!("{}: {}", path, e))?,
        None => {
            let mut config = RenderConfig::default();
            if let Some((width, height)) = terminal::current_grid_size() {
                config.width = width;
                config.height = height;
            }
            config
        },
    };

    if let Some(width) = options.width {
        config.width = width;
    }
    if let Some(height) = options.height {
        config.height = height;
    }
    if let Some(color) = options.color {
        config.color_mode = color;
    }
    if options.dense {
        config = config.with_steps(DENSE_STEPS.0, DENSE_STEPS.1);
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Follow a terminal resize unless the grid size was pinned on the command line.
/// Returns true when the grid changed.
fn apply_resize(base: &mut RenderConfig, options: &Options, width: usize, height: usize) -> bool {
    let width = options.width.unwrap_or(width);
    let height = options.height.unwrap_or(height);
    if (width, height) == (base.width, base.height) {
        return false;
    }
    base.width = width;
    base.height = height;
    true
}

fn frame_limit_reached(limit: Option<u64>, frames_rendered: u64) -> bool {
    limit.is_some_and(|limit| frames_rendered >= limit)
}

fn main() -> Result<(), String> {
    env_logger::init();

    let options = parse_args()?;
    let mut base = base_config(&options)?;

    let controller = options.socket.as_deref().map(Controller::new).transpose()?;
    let mqtt = options
        .mqtt_host
        .as_deref()
        .map(|host| MqttClient::new(host, options.mqtt_port, &options.topic))
        .transpose()?;

    log::info!(
        "Grid {}x{}, color {}, steps u={} v={}",
        base.width,
        base.height,
        base.color_mode,
        base.u_step,
        base.v_step
    );

    let mut state = DriverState::new(base.color_mode);
    let mut renderer = Renderer::new();
    let mut clock = FrameClock::new(options.fps, 60);
    let mut frame = String::new();
    let mut frames_rendered: u64 = 0;

    // Declared before the writer so it is dropped after it on every return
    let session = if terminal::is_interactive() {
        Some(TerminalSession::enter().map_err(|e| format!("Failed to set up terminal: {}", e))?)
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if session.is_none() {
        queue!(out, Clear(ClearType::All)).map_err(|e| e.to_string())?;
    }

    'main: loop {
        if frame_limit_reached(options.frames, frames_rendered) {
            break;
        }

        let wait = clock.time_until_due();
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        let (dt, _avg_fps) = clock.tick();

        let mut commands = Vec::new();
        if let Some(session) = &session {
            let inputs = session
                .poll_inputs()
                .map_err(|e| format!("Failed to read terminal input: {}", e))?;
            for input in inputs {
                match input {
                    TerminalInput::Command(command) => commands.push(command),
                    TerminalInput::Resize { width, height } => {
                        if apply_resize(&mut base, &options, width, height) {
                            log::info!("Grid resized to {}x{}", base.width, base.height);
                            queue!(out, Clear(ClearType::All)).map_err(|e| e.to_string())?;
                        }
                    },
                }
            }
        }
        commands.extend(controller.iter().flat_map(Controller::poll));
        commands.extend(mqtt.iter().flat_map(MqttClient::poll));

        for command in commands {
            if let Command::SelectColor { mode } = command {
                log::info!("Color mode: {}", mode);
            }
            state.apply(command);
            if state.should_quit() {
                break 'main;
            }
        }

        state.advance(dt);
        let (config, angles) = state.frame_inputs(&base);
        renderer.render_into(&config, &angles, &mut frame);

        out.write_all(frame.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| format!("Failed to write frame: {}", e))?;

        frames_rendered += 1;
        if frames_rendered % FPS_LOG_INTERVAL == 0 {
            let (min_fps, max_fps) = clock.min_max_fps();
            log::debug!(
                "FPS {:.0} avg  {:.0} min  {:.0} max  {:.1}ms",
                clock.avg_fps(),
                min_fps,
                max_fps,
                clock.avg_frame_time_ms()
            );
        }
    }

    if session.is_none() {
        // Frames end with a reset already; move below the grid
        out.write_all(b"\r\n")
            .and_then(|()| out.flush())
            .map_err(|e| e.to_string())?;
    }
    drop(out);
    drop(session);

    log::info!("Rendered {} frames", frames_rendered);
    Ok(())
}
