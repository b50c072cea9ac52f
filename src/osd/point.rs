use core::str::FromStr;

use crate::hal::canvas::Metrics;

/// Where an instrument is anchored, either on the character grid or at an
/// absolute pixel position
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawPoint {
    Grid { x: u8, y: u8 },
    Pixel { x: i16, y: i16 },
}

impl Default for DrawPoint {
    fn default() -> Self {
        Self::Grid { x: 0, y: 0 }
    }
}

impl DrawPoint {
    /// Grid cell containing the point
    pub fn grid(&self, metrics: &Metrics) -> (u8, u8) {
        match *self {
            Self::Grid { x, y } => (x, y),
            Self::Pixel { x, y } => {
                let gx = (x.max(0) as i32 / metrics.gw().max(1)) as u8;
                let gy = (y.max(0) as i32 / metrics.gh().max(1)) as u8;
                (gx, gy)
            }
        }
    }

    pub fn pixels(&self, metrics: &Metrics) -> (i32, i32) {
        match *self {
            Self::Grid { x, y } => (x as i32 * metrics.gw(), y as i32 * metrics.gh()),
            Self::Pixel { x, y } => (x as i32, y as i32),
        }
    }
}

/// `"x,y"` is a grid cell, `"x,ypx"` a pixel position
impl FromStr for DrawPoint {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, ()> {
        let (x, y) = string.split_once(',').ok_or(())?;
        let (x, y) = (x.trim(), y.trim());
        match y.strip_suffix("px") {
            Some(y) => Ok(Self::Pixel {
                x: x.parse().map_err(|_| ())?,
                y: y.parse().map_err(|_| ())?,
            }),
            None => Ok(Self::Grid { x: x.parse().map_err(|_| ())?, y: y.parse().map_err(|_| ())? }),
        }
    }
}

mod test {
    #[test]
    fn test_draw_point() {
        use super::DrawPoint;
        use crate::hal::canvas::Metrics;

        let metrics =
            Metrics { width: 360, height: 288, grid_element_width: 12, grid_element_height: 18 };
        let grid = DrawPoint::Grid { x: 2, y: 3 };
        assert_eq!(grid.pixels(&metrics), (24, 54));
        assert_eq!(grid.grid(&metrics), (2, 3));
        let pixel = DrawPoint::Pixel { x: 30, y: 40 };
        assert_eq!(pixel.pixels(&metrics), (30, 40));
        assert_eq!(pixel.grid(&metrics), (2, 2));
        assert_eq!(DrawPoint::Pixel { x: -5, y: 4 }.grid(&metrics), (0, 0));
    }

    #[test]
    fn test_parse_draw_point() {
        use super::DrawPoint;

        assert_eq!("3,4".parse::<DrawPoint>(), Ok(DrawPoint::Grid { x: 3, y: 4 }));
        assert_eq!("30, 40px".parse::<DrawPoint>(), Ok(DrawPoint::Pixel { x: 30, y: 40 }));
        assert_eq!("-3,4px".parse::<DrawPoint>(), Ok(DrawPoint::Pixel { x: -3, y: 4 }));
        assert_eq!("3".parse::<DrawPoint>(), Err(()));
        assert_eq!("-3,4".parse::<DrawPoint>(), Err(()));
    }
}
