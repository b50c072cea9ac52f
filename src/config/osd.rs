use core::fmt::{Display, Formatter};
use core::str::FromStr;

use super::pathset::{Error, Path, PathSet, Value};
use crate::hal::canvas::Metrics;
use crate::hal::font::{GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::osd::point::DrawPoint;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Standard {
    PAL,
    NTSC,
}

impl Default for Standard {
    fn default() -> Self {
        Self::PAL
    }
}

impl FromStr for Standard {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, ()> {
        match string {
            "PAL" => Ok(Self::PAL),
            "NTSC" => Ok(Self::NTSC),
            _ => Err(()),
        }
    }
}

impl Display for Standard {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        let string = match self {
            Self::PAL => "PAL",
            Self::NTSC => "NTSC",
        };
        f.write_str(string)
    }
}

impl Standard {
    pub const COLUMNS: u16 = 30;

    pub fn rows(self) -> u16 {
        match self {
            Self::PAL => 16,
            Self::NTSC => 13,
        }
    }

    pub fn metrics(self) -> Metrics {
        Metrics {
            width: Self::COLUMNS * GLYPH_WIDTH as u16,
            height: self.rows() * GLYPH_HEIGHT as u16,
            grid_element_width: GLYPH_WIDTH,
            grid_element_height: GLYPH_HEIGHT,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Horizon {
    /// Grid cells
    pub width: u8,
    pub height: u8,
    /// Milliseconds between forced redraws
    pub refresh_interval: u16,
    /// Milliradians of pitch or roll change that trigger an immediate redraw
    pub threshold: u16,
}

impl Horizon {
    pub const DEFAULT: Self = Self { width: 11, height: 9, refresh_interval: 1000, threshold: 10 };
}

impl Default for Horizon {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn nonzero<T: Default + PartialEq>(value: T) -> Result<T, Error> {
    match value == T::default() {
        true => Err(Error::InvalidValue),
        false => Ok(value),
    }
}

impl PathSet for Horizon {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "width" => self.width = nonzero(value.parse_or(Self::DEFAULT.width)?)?,
            "height" => self.height = nonzero(value.parse_or(Self::DEFAULT.height)?)?,
            "refresh-interval" => {
                self.refresh_interval = value.parse_or(Self::DEFAULT.refresh_interval)?
            }
            "threshold" => self.threshold = value.parse_or(Self::DEFAULT.threshold)?,
            _ => return Err(Error::UnknownPath),
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Vario {
    pub cm_s_per_arrow: u16,
    pub rows: u8,
}

impl Vario {
    pub const DEFAULT: Self = Self { cm_s_per_arrow: 50, rows: 5 };
}

impl Default for Vario {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PathSet for Vario {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "cm-s-per-arrow" => {
                self.cm_s_per_arrow = nonzero(value.parse_or(Self::DEFAULT.cm_s_per_arrow)?)?
            }
            "rows" => self.rows = nonzero(value.parse_or(Self::DEFAULT.rows)?)?,
            _ => return Err(Error::UnknownPath),
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Centre of the artificial horizon, centre of the canvas when absent
    pub horizon: Option<DrawPoint>,
    pub vario: DrawPoint,
    pub heading: DrawPoint,
    pub home: DrawPoint,
}

impl Layout {
    pub const DEFAULT: Self = Self {
        horizon: None,
        vario: DrawPoint::Grid { x: 23, y: 6 },
        heading: DrawPoint::Grid { x: 10, y: 1 },
        home: DrawPoint::Grid { x: 14, y: 2 },
    };
}

impl Default for Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PathSet for Layout {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        let point = match path.str()? {
            "horizon" => {
                self.horizon = match value.str()? {
                    "center" => None,
                    _ => Some(value.parse()?),
                };
                return Ok(());
            }
            "vario" => &mut self.vario,
            "heading" => &mut self.heading,
            "home" => &mut self.home,
            _ => return Err(Error::UnknownPath),
        };
        *point = value.parse()?;
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OSD {
    pub standard: Standard,
    pub horizon: Horizon,
    pub vario: Vario,
    pub layout: Layout,
}

impl OSD {
    pub const DEFAULT: Self = Self {
        standard: Standard::PAL,
        horizon: Horizon::DEFAULT,
        vario: Vario::DEFAULT,
        layout: Layout::DEFAULT,
    };
}

impl PathSet for OSD {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "standard" => self.standard = value.parse_or(Standard::default())?,
            "horizon" => return self.horizon.set(path, value),
            "vario" => return self.vario.set(path, value),
            "layout" => return self.layout.set(path, value),
            _ => return Err(Error::UnknownPath),
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_standard_metrics() {
        use super::Standard;

        let pal = Standard::PAL.metrics();
        assert_eq!((pal.width, pal.height), (360, 288));
        let ntsc = Standard::NTSC.metrics();
        assert_eq!((ntsc.width, ntsc.height), (360, 234));
        assert_eq!("NTSC".parse::<Standard>(), Ok(Standard::NTSC));
    }
}
