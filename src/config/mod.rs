pub mod osd;
pub mod pathset;

use spin::RwLock;

pub use osd::{Horizon, Layout, Standard, Vario, OSD};
pub use pathset::{Error, Path, PathSet, Value};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub osd: OSD,
}

impl Config {
    pub const DEFAULT: Self = Self { osd: OSD::DEFAULT };
}

impl PathSet for Config {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "osd" => self.osd.set(path, value),
            _ => Err(Error::UnknownPath),
        }
    }
}

static CONFIG: RwLock<Config> = RwLock::new(Config::DEFAULT);

pub fn get() -> Config {
    *CONFIG.read()
}

pub fn replace(config: &Config) {
    *CONFIG.write() = *config;
}

/// Applies a single `path = value` update to the global configuration
pub fn set(path: &str, value: Option<&str>) -> Result<(), Error> {
    let mut config = CONFIG.write();
    let result = config.set(Path::new(path), Value(value));
    if let Err(e) = result {
        warn!("Set {} failed: {}", path, e);
    }
    result
}

pub fn reset() {
    replace(&Config::DEFAULT)
}

mod test {
    #[test]
    fn test_deserialize_config() {
        use indoc::indoc;

        use super::{Config, Standard};
        use crate::osd::point::DrawPoint;

        let json = indoc! {r#"
            {
                "osd": {
                    "standard": "NTSC",
                    "horizon": {
                        "width": 13,
                        "height": 7,
                        "refresh-interval": 500,
                        "threshold": 20
                    },
                    "vario": {
                        "cm-s-per-arrow": 100,
                        "rows": 3
                    },
                    "layout": {
                        "horizon": { "Grid": { "x": 14, "y": 6 } },
                        "vario": { "Pixel": { "x": 280, "y": 100 } },
                        "heading": { "Grid": { "x": 10, "y": 1 } },
                        "home": { "Grid": { "x": 14, "y": 3 } }
                    }
                }
            }
        "#};
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.osd.standard, Standard::NTSC);
        assert_eq!(config.osd.horizon.width, 13);
        assert_eq!(config.osd.horizon.refresh_interval, 500);
        assert_eq!(config.osd.vario.cm_s_per_arrow, 100);
        assert_eq!(config.osd.layout.vario, DrawPoint::Pixel { x: 280, y: 100 });
        assert_eq!(config.osd.layout.horizon, Some(DrawPoint::Grid { x: 14, y: 6 }));
    }

    #[test]
    fn test_missing_osd_section() {
        use super::Config;

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::DEFAULT);
    }

    #[test]
    fn test_path_set() {
        use super::{Config, Error, Path, PathSet, Value};
        use crate::osd::point::DrawPoint;

        let mut config = Config::default();
        config.set(Path::new("osd.vario.rows"), Value::of("7")).unwrap();
        assert_eq!(config.osd.vario.rows, 7);
        config.set(Path::new("osd.vario.rows"), Value(None)).unwrap();
        assert_eq!(config.osd.vario.rows, 5);
        config.set(Path::new("osd.layout.home"), Value::of("100,40px")).unwrap();
        assert_eq!(config.osd.layout.home, DrawPoint::Pixel { x: 100, y: 40 });
        config.set(Path::new("osd.layout.horizon"), Value::of("15,8")).unwrap();
        assert_eq!(config.osd.layout.horizon, Some(DrawPoint::Grid { x: 15, y: 8 }));
        config.set(Path::new("osd.layout.horizon"), Value::of("center")).unwrap();
        assert_eq!(config.osd.layout.horizon, None);

        for path in ["osd.vario.cm-s-per-arrow", "osd.vario.rows", "osd.horizon.width", "osd.horizon.height"] {
            assert_eq!(config.set(Path::new(path), Value::of("0")), Err(Error::InvalidValue));
        }
        assert_eq!(config.osd.vario.rows, 5);
        assert_eq!(config.osd.horizon.width, 11);
        let result = config.set(Path::new("osd.horizon.depth"), Value::of("1"));
        assert_eq!(result, Err(Error::UnknownPath));
        let result = config.set(Path::new("osd.layout.vario"), Value(None));
        assert_eq!(result, Err(Error::ExpectValue));
    }

    #[test]
    #[serial_test::serial]
    fn test_global_config() {
        use super::{get, replace, reset, set, Config};

        reset();
        assert_eq!(get(), Config::DEFAULT);
        let mut config = get();
        config.osd.horizon.threshold = 42;
        replace(&config);
        assert_eq!(get().osd.horizon.threshold, 42);
        set("osd.horizon.threshold", Some("12")).unwrap();
        assert_eq!(get().osd.horizon.threshold, 12);
        assert!(set("osd.horizon", Some("1")).is_err());
        reset();
    }
}
