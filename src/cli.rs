use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use pico_args::Arguments;
use std::{
    env, fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use gesturectl::config::{self, ProfileStore};
use gesturectl::input::{self, DeviceSource};
use gesturectl::script::{self, Step};
use gesturectl::{Binding, GestureEngine, GestureParam, Profile, SurfaceId};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("replay") => {
            let profile = resolve_profile(&mut pargs)?;
            let path: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: gesturectl replay <script> [--profile NAME]"))?;
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let steps = script::parse_script(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            replay(&profile, steps)
        }

        Some("watch") => {
            let devices: Vec<String> = pargs.values_from_str("--device")?;
            let profile = resolve_profile(&mut pargs)?;
            watch(&profile, &devices)
        }

        Some("list") => {
            let store = ProfileStore::open_default()?;
            let active = store.active_name()?;
            for name in store.list_profiles() {
                let mark = if name == active { "*" } else { " " };
                println!("{mark} {name}");
            }
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: gesturectl use <profile_name>"))?;
            let store = ProfileStore::open_default()?;
            store.load(Some(&name))?;
            store.set_active(&name)?;
            println!("ok: active profile is now {name}");
            Ok(())
        }

        Some("check") => {
            let config: Option<PathBuf> = pargs.opt_value_from_str("--config")?;
            let name: Option<String> = pargs.free_from_str().ok();
            let profile = match config {
                Some(path) => config::load_profile_file(&path)?,
                None => ProfileStore::open_default()?.load(name.as_deref())?,
            };
            let report = serde_json::json!({
                "name": profile.meta.name,
                "options": profile.options,
                "bindings": profile.bindings,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Some("devices") => {
            for d in input::discover_pointers() {
                println!("{:<6} {}  {}", format!("{:?}", d.kind), d.path, d.name);
            }
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn resolve_profile(pargs: &mut Arguments) -> Result<Profile> {
    let config: Option<PathBuf> = pargs.opt_value_from_str("--config")?;
    let name: Option<String> = pargs.opt_value_from_str("--profile")?;
    match config {
        Some(path) => config::load_profile_file(&path),
        None => ProfileStore::open_default()?.load(name.as_deref()),
    }
}

/// One surface covering the whole input, with every profile binding
/// printing a JSON line when it fires.
fn build_session(profile: &Profile) -> Result<(GestureEngine, SurfaceId)> {
    let mut engine = GestureEngine::new();
    engine.set_class_hook(|id, class, add| {
        debug!("{id}: {} class '{class}'", if add { "add" } else { "remove" });
    });
    let surface = engine.attach(profile.options.clone())?;

    for (binding, label) in profile.subscriptions()? {
        for target in &binding.targets {
            let single = Binding::new(*target).with_modifiers(binding.modifiers);
            let name = target.name();
            let label = label.clone();
            engine.subscribe(surface, &single, move |param, ev| {
                let param = match param {
                    GestureParam::None => serde_json::Value::Null,
                    GestureParam::Direction(d) => serde_json::json!(d.as_str()),
                    GestureParam::Factor(f) => serde_json::json!(f),
                };
                println!(
                    "{}",
                    serde_json::json!({
                        "t": ev.timestamp,
                        "gesture": name,
                        "param": param,
                        "label": label,
                    })
                );
            })?;
        }
    }
    Ok((engine, surface))
}

fn replay(profile: &Profile, steps: Vec<Step>) -> Result<()> {
    let (mut engine, surface) = build_session(profile)?;
    let mut last_t = 0.0;
    for step in steps {
        match step {
            Step::Event(mut ev) => {
                last_t = ev.timestamp;
                engine.handle(surface, &mut ev)?;
            }
            Step::Advance(t) => {
                last_t = t;
                engine.advance(t);
            }
        }
    }
    // let a trailing hold timer run out
    if let Some(deadline) = engine.next_deadline() {
        engine.advance(deadline.max(last_t));
    }
    Ok(())
}

fn watch(profile: &Profile, devices: &[String]) -> Result<()> {
    let mut source = DeviceSource::open(devices)?;
    let (mut engine, surface) = build_session(profile)?;

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&term))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&term))?;

    info!("watching for gestures, Ctrl-C to stop");
    while !term.load(Ordering::Relaxed) {
        let events = source.poll();
        let idle = events.is_empty();
        for mut ev in events {
            engine.handle(surface, &mut ev)?;
        }
        engine.advance(source.now_ms());

        if source.device_count() == 0 {
            return Err(anyhow!("all input devices went away"));
        }
        if idle {
            thread::sleep(Duration::from_millis(4));
        }
    }
    info!("stopped");
    Ok(())
}

fn print_help() {
    println!(
        r#"gesturectl — pointer gesture classifier

USAGE:
  gesturectl help [command]                  Show general or command-specific help
  gesturectl replay <script> [--profile NAME] [--config PATH]
                                             Classify a recorded JSON-lines session
  gesturectl watch [--device PATH]... [--profile NAME] [--config PATH]
                                             Classify live evdev input
  gesturectl list                            List profiles
  gesturectl use <name>                      Switch active profile
  gesturectl check [name] [--config PATH]    Validate a profile and print it
  gesturectl devices                         List detected pointer devices

TIPS:
  - Profiles: ~/.config/gesturectl/profiles
  - Active profile pointer: ~/.config/gesturectl/active
  - Log level: GESTURECTL_LOG=debug
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "replay" => println!(
            "usage: gesturectl replay <script> [--profile NAME] [--config PATH]\nFeeds a JSON-lines event script through one surface and prints fired gestures."
        ),
        "watch" => println!(
            "usage: gesturectl watch [--device PATH]... [--profile NAME] [--config PATH]\nReads multitouch panels and mice; all devices are discovered when none is given."
        ),
        "list" => {
            println!("usage: gesturectl list\nLists available profiles; marks active with '*'.")
        }
        "use" => {
            println!("usage: gesturectl use <name>\nValidates <name> and makes it the active profile.")
        }
        "check" => println!(
            "usage: gesturectl check [name] [--config PATH]\nParses and validates a profile, then prints the resolved options and bindings."
        ),
        "devices" => println!("usage: gesturectl devices\nLists touch panels and mice under /dev/input."),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}
