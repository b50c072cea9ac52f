#[macro_use]
extern crate log;

use std::io::Read;
use std::time::Duration;

use env_logger::Env;
use pro_osd::config::{self, Standard};
use simulator::{flight_state, NtscSimulator, PalSimulator, Simulator};

fn init(matches: &clap::ArgMatches) -> Result<(), String> {
    if let Some(config_path) = matches.value_of("config") {
        let mut file = std::fs::File::open(config_path)
            .map_err(|e| format!("Read config file {} failed: {}", config_path, e))?;
        let mut buffer = String::new();
        file.read_to_string(&mut buffer).map_err(|_| "Unable to read config-file")?;
        let config: config::Config =
            serde_json::from_str(&buffer).map_err(|e| format!("Invalid config: {}", e))?;
        config::replace(&config);
    }
    for setting in matches.values_of("set").into_iter().flatten() {
        let (path, value) = match setting.split_once('=') {
            Some((path, value)) => (path, Some(value)),
            None => (setting, None),
        };
        config::set(path, value).map_err(|e| format!("Set {} failed: {}", path, e))?;
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str, default: T) -> Result<T, String> {
    match matches.value_of(name) {
        Some(value) => value.parse().map_err(|_| format!("{} not a number", name)),
        None => Ok(default),
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), String> {
    init(matches)?;
    let frames: u64 = parse_arg(matches, "frames", 10)?;
    let interval: u64 = parse_arg(matches, "interval", 500)?;
    let scale: usize = parse_arg(matches, "scale", 3)?;

    let osd = config::get().osd;
    info!("Rendering {} frames of {:?} overlay", frames, osd.standard);
    match osd.standard {
        Standard::PAL => simulate(PalSimulator::new(&osd)?, frames, interval, scale),
        Standard::NTSC => simulate(NtscSimulator::new(&osd)?, frames, interval, scale),
    }
    Ok(())
}

fn simulate<const W: usize, const H: usize>(
    mut simulator: Simulator<W, H>,
    frames: u64,
    interval: u64,
    scale: usize,
) {
    for frame in 0..frames {
        let now = Duration::from_millis(frame * interval);
        let state = flight_state(now.as_secs_f32());
        simulator.render(&state, now);
        println!("frame {} at {:?}: {:?}", frame, now, state);
        print!("{}", simulator.ascii(scale, scale * 2));
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let matches = clap::App::new("simulator")
        .version("0.1")
        .author("qiuchengxuan")
        .about("Pro-osd overlay simulator")
        .arg(clap::Arg::with_name("config").long("config").help("Config file").takes_value(true))
        .arg(
            clap::Arg::with_name("set")
                .long("set")
                .help("Override a config path, e.g. osd.vario.rows=3")
                .takes_value(true)
                .multiple(true),
        )
        .arg(clap::Arg::with_name("frames").long("frames").help("Frames").takes_value(true))
        .arg(clap::Arg::with_name("interval").long("interval").help("Milliseconds").takes_value(true))
        .arg(clap::Arg::with_name("scale").long("scale").help("Pixels per text column").takes_value(true))
        .get_matches();
    if let Some(error) = run(&matches).err() {
        println!("{}", error);
    }
}
