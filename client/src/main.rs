use clap::Parser;
use client::movement::MoveProtocol;
use client::net::{self, ChannelEvent};
use client::session::Session;
use client::{assets, render};
use log::{info, warn};
use macroquad::prelude::*;
use shared::Direction;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Display name for the local player
    #[arg(short = 'n', long, default_value = shared::DEFAULT_NAME)]
    name: String,

    /// Path or URL of the world map image
    #[arg(short = 'm', long, default_value = "assets/map.png")]
    map: String,

    /// Movement intent wire variant; must match the server deployment
    #[arg(long, value_enum, default_value = "discrete")]
    protocol: MoveProtocol,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: i32,
}

static ARGS: OnceLock<Args> = OnceLock::new();

fn window_conf() -> Conf {
    let args = ARGS.get_or_init(Args::parse);
    Conf {
        window_title: "World Viewer".to_string(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

const BINDINGS: [(KeyCode, KeyCode, Direction); 4] = [
    (KeyCode::W, KeyCode::Up, Direction::Up),
    (KeyCode::S, KeyCode::Down, Direction::Down),
    (KeyCode::A, KeyCode::Left, Direction::Left),
    (KeyCode::D, KeyCode::Right, Direction::Right),
];

/// Feeds key transitions to the session. WASD and arrows are aliases; a
/// direction only releases once both of its keys are up.
fn handle_movement_keys(session: &mut Session) {
    for (primary, alternate, direction) in BINDINGS {
        if is_key_pressed(primary) || is_key_pressed(alternate) {
            session.key_down(direction);
        }
        let released = (is_key_released(primary) && !is_key_down(alternate))
            || (is_key_released(alternate) && !is_key_down(primary));
        if released {
            session.key_up(direction);
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = ARGS.get_or_init(Args::parse);

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: WASD or arrow keys to move");

    let world = assets::load_world(&args.map).await;

    let mut channel = match net::connect(&args.server) {
        Ok(channel) => Some(channel),
        Err(e) => {
            warn!("Could not open channel to {}: {}", args.server, e);
            None
        }
    };

    let outbound = channel.as_ref().map(|c| c.outbound());
    let mut session = Session::new(world, args.protocol, &args.name, outbound);
    if channel.is_some() {
        session.join();
    } else {
        session.go_offline();
    }

    let started = Instant::now();
    loop {
        // apply completed network deliveries before this tick reads state
        if let Some(channel) = channel.as_mut() {
            while let Some(event) = channel.poll() {
                match event {
                    ChannelEvent::Frame(raw) => session.on_inbound(&raw),
                    ChannelEvent::Closed => session.go_offline(),
                }
            }
        }

        if !session.joined && !session.offline && started.elapsed() > JOIN_TIMEOUT {
            warn!("No join acknowledgement after {:?}", JOIN_TIMEOUT);
            session.go_offline();
        }

        for (id, def) in session.take_pending_atlases() {
            let atlas = assets::load_atlas(&id, &def).await;
            session.atlases.insert(id, atlas);
        }

        handle_movement_keys(&mut session);
        render::draw_frame(&mut session);

        next_frame().await;
    }
}
